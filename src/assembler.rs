//! Report assembly: pure composition of the transport verdict, the ranked
//! tool list, and accumulated notes into one immutable `AnalysisReport`,
//! plus JSON persistence under a unique name.

use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::models::{
    AnalysisReport, ReportMetadata, RunTemplate, SchemaDescriptor, ToolCandidate, ToolEntry,
    TransportVerdict,
};

/// Transport weight in the aggregate confidence score; the remainder comes
/// from the parsed-file fraction.
const TRANSPORT_WEIGHT: f32 = 0.5;

/// Inputs gathered by the analysis stages.
pub struct ReportParts {
    pub repo: String,
    pub file_count: usize,
    pub eligible_file_count: usize,
    pub parsed_file_count: usize,
    pub transport: TransportVerdict,
    pub tools: Vec<(ToolCandidate, SchemaDescriptor)>,
    pub run_template: RunTemplate,
    pub notes: Vec<String>,
}

/// Combine stage outputs into the final report. No decision logic beyond
/// the aggregate score.
pub fn assemble(parts: ReportParts) -> AnalysisReport {
    let parsed_fraction = if parts.eligible_file_count == 0 {
        1.0
    } else {
        parts.parsed_file_count as f32 / parts.eligible_file_count as f32
    };
    let confidence_score = (TRANSPORT_WEIGHT * parts.transport.confidence
        + (1.0 - TRANSPORT_WEIGHT) * parsed_fraction)
        .clamp(0.0, 1.0);

    let tools = parts
        .tools
        .into_iter()
        .map(|(candidate, schema)| ToolEntry {
            name: candidate.name,
            file: candidate.file,
            line_range: [candidate.line_start, candidate.line_end],
            parameters: schema.parameters,
            docstring: candidate.docstring,
            description: schema.description,
            possible_syscalls: candidate.syscall_hints,
            merged: candidate.merged,
        })
        .collect();

    AnalysisReport {
        metadata: ReportMetadata {
            repo: parts.repo,
            file_count: parts.file_count,
            eligible_file_count: parts.eligible_file_count,
            parsed_file_count: parts.parsed_file_count,
            generated_at: Utc::now(),
        },
        transport: parts.transport,
        tools,
        run_template: parts.run_template,
        confidence_score,
        notes: parts.notes,
    }
}

/// Persist a report as pretty JSON under a unique name. Returns the path.
pub fn save_report(report: &AnalysisReport, out_dir: &Path) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(out_dir)?;
    let name = format!(
        "ferret_report_{}.json",
        &uuid::Uuid::new_v4().simple().to_string()[..8]
    );
    let path = out_dir.join(name);
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(&path, json)?;
    tracing::info!("Saved report to {}", path.display());
    Ok(path)
}

// =============================================================================
// Unit Tests
// =============================================================================
