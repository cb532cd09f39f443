use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::evidence::TransportVerdict;
use super::tool::{ParamSchema, SyscallHint};

/// Run metadata attached to every report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Repository identifier: URL, archive name, or local path.
    pub repo: String,
    pub file_count: usize,
    /// Files eligible for signature extraction.
    pub eligible_file_count: usize,
    /// Eligible files that parsed successfully.
    pub parsed_file_count: usize,
    pub generated_at: DateTime<Utc>,
}

/// One discovered tool with its inferred schema, as it appears in the report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolEntry {
    pub name: String,
    pub file: String,
    #[serde(rename = "lineRange")]
    pub line_range: [u32; 2],
    pub parameters: Vec<ParamSchema>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docstring: Option<String>,
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub possible_syscalls: Vec<SyscallHint>,
    /// Candidates folded into this entry by semantic deduplication.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub merged: Vec<String>,
}

/// Heuristic launch-command inference.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunTemplate {
    pub cmd: Option<String>,
    pub confidence: f32,
    pub evidence: Vec<String>,
}

/// The single immutable output of an analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub metadata: ReportMetadata,
    pub transport: TransportVerdict,
    pub tools: Vec<ToolEntry>,
    pub run_template: RunTemplate,
    /// Aggregate confidence in [0, 1].
    pub confidence_score: f32,
    /// Diagnostics: parse failures, provider failures, truncation.
    pub notes: Vec<String>,
}

// =============================================================================
// Unit Tests
// =============================================================================
