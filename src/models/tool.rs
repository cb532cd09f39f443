use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One declared parameter as the front-end saw it: raw annotation and default
/// literal text, before schema inference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamInfo {
    pub name: String,
    pub annotation: Option<String>,
    pub default: Option<String>,
}

impl ParamInfo {
    /// A parameter is required iff it carries no default.
    pub fn required(&self) -> bool {
        self.default.is_none()
    }
}

/// Syscall-surface hint derived from a candidate's source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyscallHint {
    pub syscall: String,
    pub reason: String,
}

/// A discovered function considered a plausible remotely-invokable unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCandidate {
    pub name: String,
    pub file: String,
    /// 1-based inclusive line range of the definition.
    pub line_start: u32,
    pub line_end: u32,
    /// First line of the definition text.
    pub signature: String,
    pub params: Vec<ParamInfo>,
    pub docstring: Option<String>,
    pub syscall_hints: Vec<SyscallHint>,
    /// `file:name` keys of candidates merged into this one by the ranker.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub merged: Vec<String>,
}

impl ToolCandidate {
    /// Stable key: candidate names are unique within their file's scope.
    pub fn key(&self) -> String {
        format!("{}:{}", self.file, self.name)
    }

    /// Text embedded for similarity ranking: name, docstring, signature.
    pub fn embedding_text(&self) -> String {
        let mut text = self.name.clone();
        if let Some(doc) = &self.docstring {
            text.push('\n');
            text.push_str(doc);
        }
        text.push('\n');
        text.push_str(&self.signature);
        text
    }
}

/// Inferred schema for one parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamSchema {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

/// Structured description of a tool's parameters, in declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaDescriptor {
    pub parameters: Vec<ParamSchema>,
    /// First docstring line, or empty.
    pub description: String,
}

impl SchemaDescriptor {
    #[allow(dead_code)]
    pub fn required_names(&self) -> Vec<&str> {
        self.parameters
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
            .collect()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate() -> ToolCandidate {
        ToolCandidate {
            name: "add".to_string(),
            file: "app.py".to_string(),
            line_start: 1,
            line_end: 3,
            signature: "def add(a: int, b: int = 2):".to_string(),
            params: vec![
                ParamInfo {
                    name: "a".to_string(),
                    annotation: Some("int".to_string()),
                    default: None,
                },
                ParamInfo {
                    name: "b".to_string(),
                    annotation: Some("int".to_string()),
                    default: Some("2".to_string()),
                },
            ],
            docstring: Some("add two numbers".to_string()),
            syscall_hints: Vec::new(),
            merged: Vec::new(),
        }
    }

    #[test]
    fn test_required_follows_default() {
        let c = candidate();
        assert!(c.params[0].required());
        assert!(!c.params[1].required());
    }

    #[test]
    fn test_candidate_key() {
        assert_eq!(candidate().key(), "app.py:add");
    }

    #[test]
    fn test_embedding_text_contains_all_parts() {
        let text = candidate().embedding_text();
        assert!(text.contains("add"));
        assert!(text.contains("add two numbers"));
        assert!(text.contains("def add(a: int, b: int = 2):"));
    }

    #[test]
    fn test_schema_required_names() {
        let schema = SchemaDescriptor {
            parameters: vec![
                ParamSchema {
                    name: "a".to_string(),
                    type_name: "integer".to_string(),
                    required: true,
                    default: None,
                    description: String::new(),
                },
                ParamSchema {
                    name: "b".to_string(),
                    type_name: "integer".to_string(),
                    required: false,
                    default: Some(serde_json::json!(2)),
                    description: String::new(),
                },
            ],
            description: "add two numbers".to_string(),
        };
        assert_eq!(schema.required_names(), vec!["a"]);
    }
}
