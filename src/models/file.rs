use std::path::Path;

use serde::{Deserialize, Serialize};

/// Source language tag derived from a file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceLanguage {
    Python,
    TypeScript,
    JavaScript,
    Rust,
    Go,
    Java,
    Shell,
    Yaml,
    Json,
    Html,
    Markdown,
}

impl SourceLanguage {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "py" => Some(Self::Python),
            "ts" | "tsx" => Some(Self::TypeScript),
            "js" | "jsx" | "mjs" => Some(Self::JavaScript),
            "rs" => Some(Self::Rust),
            "go" => Some(Self::Go),
            "java" => Some(Self::Java),
            "sh" | "bash" => Some(Self::Shell),
            "yaml" | "yml" => Some(Self::Yaml),
            "json" => Some(Self::Json),
            "html" | "htm" => Some(Self::Html),
            "md" => Some(Self::Markdown),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Python => "python",
            Self::TypeScript => "typescript",
            Self::JavaScript => "javascript",
            Self::Rust => "rust",
            Self::Go => "go",
            Self::Java => "java",
            Self::Shell => "shell",
            Self::Yaml => "yaml",
            Self::Json => "json",
            Self::Html => "html",
            Self::Markdown => "markdown",
        }
    }

    /// Whether the signature extractor has a front-end for this language.
    pub fn extractable(&self) -> bool {
        matches!(self, Self::Python | Self::TypeScript | Self::JavaScript)
    }
}

impl std::fmt::Display for SourceLanguage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// File content, or an explicit marker for why it could not be read.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileContent {
    Text(String),
    Unreadable(String),
}

impl FileContent {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(t) => Some(t.as_str()),
            Self::Unreadable(_) => None,
        }
    }
}

/// One indexed repository file. Read-only input to the analyzer core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    /// Path relative to the repository root, `/`-separated.
    pub path: String,
    pub language: Option<SourceLanguage>,
    pub content: FileContent,
    pub size: u64,
    pub content_hash: String,
}

impl FileRecord {
    /// Whether this file is eligible for signature extraction.
    pub fn extractable(&self) -> bool {
        self.language.map(|l| l.extractable()).unwrap_or(false)
            && matches!(self.content, FileContent::Text(_))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_from_extension() {
        assert_eq!(
            SourceLanguage::from_extension("py"),
            Some(SourceLanguage::Python)
        );
        assert_eq!(
            SourceLanguage::from_extension("tsx"),
            Some(SourceLanguage::TypeScript)
        );
        assert_eq!(
            SourceLanguage::from_extension("mjs"),
            Some(SourceLanguage::JavaScript)
        );
        assert_eq!(SourceLanguage::from_extension("exe"), None);
        assert_eq!(SourceLanguage::from_extension(""), None);
    }

    #[test]
    fn test_extractable_languages() {
        assert!(SourceLanguage::Python.extractable());
        assert!(SourceLanguage::TypeScript.extractable());
        assert!(SourceLanguage::JavaScript.extractable());
        assert!(!SourceLanguage::Rust.extractable());
        assert!(!SourceLanguage::Markdown.extractable());
    }

    #[test]
    fn test_unreadable_record_not_extractable() {
        let rec = FileRecord {
            path: "app.py".to_string(),
            language: Some(SourceLanguage::Python),
            content: FileContent::Unreadable("binary content".to_string()),
            size: 10,
            content_hash: String::new(),
        };
        assert!(!rec.extractable());
        assert!(rec.content.as_text().is_none());
    }
}
