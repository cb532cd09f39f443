//! Minimal language-neutral AST for signature extraction: function,
//! parameter, and default-literal nodes only. Each language front-end lowers
//! its native parse tree into this shape, isolating the extractor from any
//! single parser's object model.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),
    #[error("Parse error")]
    ParseError,
    #[error("Query error: {0}")]
    QueryError(String),
}

pub type Result<T> = std::result::Result<T, ExtractError>;

/// One declared parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamNode {
    pub name: String,
    /// Declared annotation text, verbatim.
    pub annotation: Option<String>,
    /// Default literal text, verbatim.
    pub default: Option<String>,
}

/// One function or method definition, nested definitions included.
#[derive(Debug, Clone)]
pub struct FunctionDef {
    pub name: String,
    pub params: Vec<ParamNode>,
    pub docstring: Option<String>,
    /// 1-based inclusive line range.
    pub line_start: u32,
    pub line_end: u32,
    /// Full definition text (used for signature and syscall hints).
    pub text: String,
}

impl FunctionDef {
    /// First line of the definition text.
    pub fn signature(&self) -> String {
        self.text.lines().next().unwrap_or("").trim_end().to_string()
    }

    /// First line of the docstring, or empty.
    pub fn doc_summary(&self) -> String {
        self.docstring
            .as_deref()
            .and_then(|d| d.lines().next())
            .map(|l| l.trim().to_string())
            .unwrap_or_default()
    }
}

/// A pluggable per-language extraction front-end.
pub trait LanguageFrontend: Send + Sync {
    /// Front-end identifier (e.g. "python").
    #[allow(dead_code)]
    fn name(&self) -> &'static str;

    /// Parse source text into function definitions. A failure poisons only
    /// this file; callers isolate it as a note.
    fn parse_functions(&self, source: &str) -> Result<Vec<FunctionDef>>;
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_is_first_line() {
        let def = FunctionDef {
            name: "add".to_string(),
            params: Vec::new(),
            docstring: None,
            line_start: 1,
            line_end: 2,
            text: "def add(a, b):  \n    return a + b\n".to_string(),
        };
        assert_eq!(def.signature(), "def add(a, b):");
    }

    #[test]
    fn test_doc_summary_takes_first_line() {
        let def = FunctionDef {
            name: "f".to_string(),
            params: Vec::new(),
            docstring: Some("first line\nsecond line".to_string()),
            line_start: 1,
            line_end: 1,
            text: String::new(),
        };
        assert_eq!(def.doc_summary(), "first line");

        let none = FunctionDef {
            docstring: None,
            ..def
        };
        assert_eq!(none.doc_summary(), "");
    }
}
