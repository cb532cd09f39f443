//! Signature extraction: parse supported-language files into tool
//! candidates. Per-file failures are isolated: a broken file contributes
//! zero candidates and one note while every other file is still processed.

pub mod ast;
pub mod python;
pub mod syscalls;
pub mod typescript;

pub use ast::{ExtractError, FunctionDef, LanguageFrontend, ParamNode, Result};

use std::collections::HashSet;

use crate::config::ExtractorConfig;
use crate::models::{FileRecord, ParamInfo, SourceLanguage, ToolCandidate};

use python::PythonFrontend;
use typescript::TypeScriptFrontend;

/// Result of extracting a whole corpus.
#[derive(Debug, Default)]
pub struct Extraction {
    /// Candidates ordered by (file path, start line).
    pub candidates: Vec<ToolCandidate>,
    pub notes: Vec<String>,
    pub eligible_files: usize,
    pub parsed_files: usize,
}

pub struct SignatureExtractor {
    config: ExtractorConfig,
    python: PythonFrontend,
    typescript: TypeScriptFrontend,
}

impl SignatureExtractor {
    pub fn new(config: ExtractorConfig) -> Self {
        Self {
            config,
            python: PythonFrontend,
            typescript: TypeScriptFrontend,
        }
    }

    fn frontend_for(&self, language: SourceLanguage) -> Option<&dyn LanguageFrontend> {
        match language {
            SourceLanguage::Python => Some(&self.python),
            SourceLanguage::TypeScript | SourceLanguage::JavaScript => Some(&self.typescript),
            _ => None,
        }
    }

    /// Extract candidates from one file.
    pub fn extract_file(&self, file: &FileRecord) -> Result<Vec<ToolCandidate>> {
        let language = file
            .language
            .ok_or_else(|| ExtractError::UnsupportedLanguage(file.path.clone()))?;
        let frontend = self
            .frontend_for(language)
            .ok_or_else(|| ExtractError::UnsupportedLanguage(language.to_string()))?;
        let source = file
            .content
            .as_text()
            .ok_or(ExtractError::ParseError)?;

        let defs = frontend.parse_functions(source)?;

        let mut seen = HashSet::new();
        let mut candidates = Vec::new();
        for def in defs {
            if self.config.is_private(&def.name) {
                continue;
            }
            // Names are unique within a file's scope: the earliest wins.
            if !seen.insert(def.name.clone()) {
                continue;
            }
            candidates.push(to_candidate(def, &file.path));
        }
        Ok(candidates)
    }

    /// Extract the whole corpus. Files are independent of each other; the
    /// merge restores deterministic (path, line) ordering.
    pub fn extract(&self, files: &[FileRecord]) -> Extraction {
        let mut out = Extraction::default();

        for file in files.iter().filter(|f| f.extractable()) {
            out.eligible_files += 1;
            match self.extract_file(file) {
                Ok(candidates) => {
                    out.parsed_files += 1;
                    out.candidates.extend(candidates);
                }
                Err(e) => {
                    tracing::debug!("Extraction failed for {}: {}", file.path, e);
                    out.notes.push(format!("parse failed: {}: {}", file.path, e));
                }
            }
        }

        out.candidates
            .sort_by(|a, b| (a.file.as_str(), a.line_start).cmp(&(b.file.as_str(), b.line_start)));
        out
    }
}

fn to_candidate(def: FunctionDef, path: &str) -> ToolCandidate {
    let syscall_hints = syscalls::detect_syscall_hints(&def.text);
    let signature = def.signature();
    ToolCandidate {
        name: def.name,
        file: path.to_string(),
        line_start: def.line_start,
        line_end: def.line_end,
        signature,
        params: def
            .params
            .into_iter()
            .map(|p| ParamInfo {
                name: p.name,
                annotation: p.annotation,
                default: p.default,
            })
            .collect(),
        docstring: def.docstring,
        syscall_hints,
        merged: Vec::new(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
