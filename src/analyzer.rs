//! Analysis orchestration: fan out per-file scanning and extraction across
//! CPU workers, infer schemas, rank with whatever deadline budget remains,
//! and assemble the report. The entry point never fails; every stage error
//! degrades into a note.

use std::sync::Arc;
use std::time::Duration;

use rayon::prelude::*;
use tokio::time::Instant;

use crate::assembler::{assemble, ReportParts};
use crate::config::FerretConfig;
use crate::extractor::SignatureExtractor;
use crate::models::{AnalysisReport, EvidenceHit, FileRecord, SchemaDescriptor, ToolCandidate};
use crate::ranker::{EmbeddingProvider, SemanticRanker};
use crate::run_template::infer_run_template;
use crate::scanner::PatternEvidenceScanner;
use crate::schema::infer_schema;

pub struct Analyzer {
    scanner: PatternEvidenceScanner,
    extractor: Arc<SignatureExtractor>,
    ranker: SemanticRanker,
}

impl Analyzer {
    pub fn new(config: &FerretConfig, provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            scanner: PatternEvidenceScanner::new(&config.scanner),
            extractor: Arc::new(SignatureExtractor::new(config.extractor.clone())),
            ranker: SemanticRanker::new(provider, &config.ranker, config.embedding.batch_size),
        }
    }

    /// Analyze an indexed corpus. With a deadline, the CPU stages run to
    /// completion and ranking gets the remaining budget; on expiry the
    /// report still carries everything gathered so far plus a truncation
    /// note.
    pub async fn analyze(
        &self,
        repo_ref: &str,
        files: Vec<FileRecord>,
        deadline: Option<Duration>,
    ) -> AnalysisReport {
        let started = Instant::now();
        let file_count = files.len();
        let files = Arc::new(files);
        let mut notes = Vec::new();

        for file in files.iter() {
            if let crate::models::FileContent::Unreadable(reason) = &file.content {
                notes.push(format!("unreadable file: {}: {}", file.path, reason));
            }
        }

        // Fan-out: per-file scanning and per-file extraction are independent,
        // order-insensitive, and share no mutable state. Deterministic
        // ordering is restored at merge time.
        let scan_files = files.clone();
        let scan_task = tokio::task::spawn_blocking(move || {
            scan_files
                .par_iter()
                .map(PatternEvidenceScanner::scan_file)
                .reduce(Vec::new, |mut acc, hits| {
                    acc.extend(hits);
                    acc
                })
        });

        let extract_files = files.clone();
        let extractor = self.extractor.clone();
        let extract_task = tokio::task::spawn_blocking(move || {
            let mut results: Vec<(String, crate::extractor::Result<Vec<ToolCandidate>>)> =
                extract_files
                    .par_iter()
                    .filter(|f| f.extractable())
                    .map(|f| (f.path.clone(), extractor.extract_file(f)))
                    .collect();
            results.sort_by(|a, b| a.0.cmp(&b.0));
            results
        });

        let (scan_result, extract_result) = tokio::join!(scan_task, extract_task);

        let hits: Vec<EvidenceHit> = match scan_result {
            Ok(hits) => hits,
            Err(e) => {
                tracing::error!("Scan stage panicked: {}", e);
                notes.push(format!("pattern scan failed: {}", e));
                Vec::new()
            }
        };
        let transport = self.scanner.verdict(hits);

        let mut candidates: Vec<ToolCandidate> = Vec::new();
        let mut eligible_file_count = 0;
        let mut parsed_file_count = 0;
        match extract_result {
            Ok(per_file) => {
                for (path, result) in per_file {
                    eligible_file_count += 1;
                    match result {
                        Ok(found) => {
                            parsed_file_count += 1;
                            candidates.extend(found);
                        }
                        Err(e) => notes.push(format!("parse failed: {}: {}", path, e)),
                    }
                }
            }
            Err(e) => {
                tracing::error!("Extraction stage panicked: {}", e);
                notes.push(format!("extraction failed: {}", e));
            }
        }
        candidates
            .sort_by(|a, b| (a.file.as_str(), a.line_start).cmp(&(b.file.as_str(), b.line_start)));

        let items: Vec<(ToolCandidate, SchemaDescriptor)> = candidates
            .into_iter()
            .map(|c| {
                let schema = infer_schema(&c);
                (c, schema)
            })
            .collect();

        let tools = self
            .rank_with_deadline(items, deadline, started, &mut notes)
            .await;

        let run_template = infer_run_template(&files);

        assemble(ReportParts {
            repo: repo_ref.to_string(),
            file_count,
            eligible_file_count,
            parsed_file_count,
            transport,
            tools,
            run_template,
            notes,
        })
    }

    /// Run semantic deduplication inside whatever deadline budget remains.
    /// On expiry the unclustered list is returned with a truncation note.
    async fn rank_with_deadline(
        &self,
        items: Vec<(ToolCandidate, SchemaDescriptor)>,
        deadline: Option<Duration>,
        started: Instant,
        notes: &mut Vec<String>,
    ) -> Vec<(ToolCandidate, SchemaDescriptor)> {
        let Some(total) = deadline else {
            return self.ranker.dedup(items, notes).await;
        };

        let remaining = total.saturating_sub(started.elapsed());
        if remaining.is_zero() {
            notes.push("operation timeout: semantic deduplication skipped".to_string());
            return items;
        }

        let fallback = items.clone();
        let mut ranker_notes = Vec::new();
        match tokio::time::timeout(remaining, self.ranker.dedup(items, &mut ranker_notes)).await {
            Ok(ranked) => {
                notes.append(&mut ranker_notes);
                ranked
            }
            Err(_) => {
                tracing::warn!("Ranking timed out after {:?}", remaining);
                notes.push(
                    "operation timeout: tool list truncated to unclustered candidates".to_string(),
                );
                fallback
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
