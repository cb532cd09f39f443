//! Table-driven transport evidence scanner. A pure function of file
//! contents: no I/O, unreadable content contributes zero evidence.

pub mod rules;

use std::collections::HashMap;

use crate::config::ScannerConfig;
use crate::models::{EvidenceHit, FileRecord, Transport, TransportVerdict};

use rules::{Matcher, PatternRule, COMPILED, RULES};

/// Denominator constant for the confidence curve: one full-weight hit yields
/// ~0.33, saturating towards 1 as evidence accumulates.
const CONFIDENCE_HALFWAY: f32 = 2.0;

pub struct PatternEvidenceScanner {
    activation_threshold: f32,
}

impl PatternEvidenceScanner {
    pub fn new(config: &ScannerConfig) -> Self {
        Self {
            activation_threshold: config.activation_threshold,
        }
    }

    /// Scan one file against the rule table. At most one hit per (rule, line);
    /// import+call rules report at the first call line.
    pub fn scan_file(file: &FileRecord) -> Vec<EvidenceHit> {
        let Some(text) = file.content.as_text() else {
            return Vec::new();
        };
        let lower = text.to_lowercase();

        let mut hits = Vec::new();
        for (idx, rule) in RULES.iter().enumerate() {
            match rule.matcher {
                Matcher::Substring(needle) => {
                    for (line_idx, line) in lower.lines().enumerate() {
                        if line.contains(needle) {
                            hits.push(hit(rule, file, line_idx as u32 + 1));
                        }
                    }
                }
                Matcher::Regex(_) => {
                    let re = COMPILED[idx].as_ref().expect("compiled regex");
                    for (line_idx, line) in text.lines().enumerate() {
                        if re.is_match(line) {
                            hits.push(hit(rule, file, line_idx as u32 + 1));
                        }
                    }
                }
                Matcher::ImportCall { import, call } => {
                    if !lower.contains(import) {
                        continue;
                    }
                    if let Some(line_idx) =
                        lower.lines().position(|line| line.contains(call))
                    {
                        hits.push(hit(rule, file, line_idx as u32 + 1));
                    }
                }
            }
        }
        hits
    }

    /// Aggregate hits into a verdict: per-category score = sum of hit
    /// weights, winner = maximal score, ties broken by the fixed precedence
    /// order, sub-threshold maxima yield UNKNOWN.
    pub fn verdict(&self, mut hits: Vec<EvidenceHit>) -> TransportVerdict {
        hits.sort_by(|a, b| {
            (a.file.as_str(), a.line, a.pattern.as_str())
                .cmp(&(b.file.as_str(), b.line, b.pattern.as_str()))
        });

        let mut scores: HashMap<Transport, f32> = HashMap::new();
        for h in &hits {
            *scores.entry(h.category).or_default() += h.weight;
        }

        let winner = Transport::CLASSIFIABLE
            .iter()
            .map(|t| (*t, scores.get(t).copied().unwrap_or(0.0)))
            // CLASSIFIABLE is in precedence order; the fold keeps the earlier
            // category on a tie because a later equal score is not strictly
            // greater.
            .fold((Transport::Unknown, 0.0_f32), |best, (t, s)| {
                if s > best.1 {
                    (t, s)
                } else {
                    best
                }
            });

        let (category, score) = winner;
        if category == Transport::Unknown || score < self.activation_threshold {
            return TransportVerdict {
                category: Transport::Unknown,
                confidence: 0.0,
                evidence: hits,
            };
        }

        TransportVerdict {
            category,
            confidence: confidence_from_score(score),
            evidence: hits,
        }
    }

    /// Scan a whole corpus. Files are independent; the hit set is the
    /// concatenation of per-file scans in any order (the verdict re-sorts).
    pub fn scan(&self, files: &[FileRecord]) -> TransportVerdict {
        let hits = files.iter().flat_map(Self::scan_file).collect();
        self.verdict(hits)
    }
}

/// Deterministic confidence curve: 0 with no evidence, monotonic in the
/// aggregate weight, bounded below 1.
pub fn confidence_from_score(score: f32) -> f32 {
    if score <= 0.0 {
        return 0.0;
    }
    score / (score + CONFIDENCE_HALFWAY)
}

fn hit(rule: &PatternRule, file: &FileRecord, line: u32) -> EvidenceHit {
    EvidenceHit {
        file: file.path.clone(),
        line,
        pattern: rule.id.to_string(),
        category: rule.category,
        weight: rule.weight,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
