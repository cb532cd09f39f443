//! Schema inference: a total, declarative mapping from declared annotation
//! text to canonical schema types, plus default-literal conversion. Never
//! errors: anything unrecognized maps to "any".

use serde_json::Value;

use crate::models::{ParamSchema, SchemaDescriptor, ToolCandidate};

/// Canonical type for an unrecognized or absent annotation.
pub const FALLBACK_TYPE: &str = "any";

/// Annotation fragment → canonical type, first match wins. Container entries
/// come before scalars so `list[int]` maps to "array", not "integer".
const TYPE_TABLE: &[(&str, &str)] = &[
    ("list", "array"),
    ("sequence", "array"),
    ("tuple", "array"),
    ("array", "array"),
    ("set", "array"),
    ("dict", "object"),
    ("mapping", "object"),
    ("record", "object"),
    ("object", "object"),
    ("str", "string"),
    ("string", "string"),
    ("text", "string"),
    ("int", "integer"),
    ("float", "number"),
    ("double", "number"),
    ("number", "number"),
    ("bool", "boolean"),
];

/// Map declared annotation text to a canonical schema type. Total: absent or
/// unrecognized annotations fall back to "any".
pub fn canonical_type(annotation: Option<&str>) -> &'static str {
    let Some(ann) = annotation else {
        return FALLBACK_TYPE;
    };
    let lower = ann.to_lowercase();
    for (needle, canonical) in TYPE_TABLE {
        if lower.contains(needle) {
            return canonical;
        }
    }
    FALLBACK_TYPE
}

/// Convert a default literal's source text into a JSON value. Literals that
/// are not obviously scalar/collection literals are carried as their raw
/// text, so the information is never dropped.
pub fn default_value(literal: &str) -> Value {
    let trimmed = literal.trim();
    match trimmed {
        "None" | "null" | "undefined" => return Value::Null,
        "True" | "true" => return Value::Bool(true),
        "False" | "false" => return Value::Bool(false),
        "[]" => return Value::Array(Vec::new()),
        "{}" => return Value::Object(serde_json::Map::new()),
        _ => {}
    }
    if let Ok(i) = trimmed.parse::<i64>() {
        return Value::from(i);
    }
    if let Ok(f) = trimmed.parse::<f64>() {
        if f.is_finite() {
            return Value::from(f);
        }
    }
    for quote in ["\"", "'"] {
        if let Some(stripped) = trimmed
            .strip_prefix(quote)
            .and_then(|s| s.strip_suffix(quote))
        {
            return Value::String(stripped.to_string());
        }
    }
    Value::String(trimmed.to_string())
}

/// Infer the schema for one candidate. Pure and side-effect-free; required
/// is fully determined by the presence of a default.
pub fn infer_schema(candidate: &ToolCandidate) -> SchemaDescriptor {
    let parameters = candidate
        .params
        .iter()
        .map(|p| ParamSchema {
            name: p.name.clone(),
            type_name: canonical_type(p.annotation.as_deref()).to_string(),
            required: p.required(),
            default: p.default.as_deref().map(default_value),
            description: String::new(),
        })
        .collect();

    SchemaDescriptor {
        parameters,
        description: candidate
            .docstring
            .as_deref()
            .and_then(|d| d.lines().next())
            .map(|l| l.trim().to_string())
            .unwrap_or_default(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ParamInfo;

    #[test]
    fn test_canonical_type_table() {
        assert_eq!(canonical_type(Some("str")), "string");
        assert_eq!(canonical_type(Some("int")), "integer");
        assert_eq!(canonical_type(Some("float")), "number");
        assert_eq!(canonical_type(Some("bool")), "boolean");
        assert_eq!(canonical_type(Some("list")), "array");
        assert_eq!(canonical_type(Some("dict")), "object");
        assert_eq!(canonical_type(Some("string")), "string");
        assert_eq!(canonical_type(Some("number")), "number");
        assert_eq!(canonical_type(Some("boolean")), "boolean");
    }

    #[test]
    fn test_container_wins_over_element_type() {
        assert_eq!(canonical_type(Some("list[int]")), "array");
        assert_eq!(canonical_type(Some("List[str]")), "array");
        assert_eq!(canonical_type(Some("dict[str, int]")), "object");
        assert_eq!(canonical_type(Some("Optional[int]")), "integer");
    }

    #[test]
    fn test_fallback_is_any_never_error() {
        assert_eq!(canonical_type(None), "any");
        assert_eq!(canonical_type(Some("")), "any");
        assert_eq!(canonical_type(Some("MyCustomThing")), "any");
        assert_eq!(canonical_type(Some("???")), "any");
    }

    #[test]
    fn test_default_value_conversion() {
        assert_eq!(default_value("2"), serde_json::json!(2));
        assert_eq!(default_value("2.5"), serde_json::json!(2.5));
        assert_eq!(default_value("True"), serde_json::json!(true));
        assert_eq!(default_value("false"), serde_json::json!(false));
        assert_eq!(default_value("None"), Value::Null);
        assert_eq!(default_value("'bob'"), serde_json::json!("bob"));
        assert_eq!(default_value("\"x\""), serde_json::json!("x"));
        assert_eq!(default_value("[]"), serde_json::json!([]));
        assert_eq!(default_value("{}"), serde_json::json!({}));
        // Non-literal expressions keep their source text.
        assert_eq!(default_value("os.getcwd()"), serde_json::json!("os.getcwd()"));
    }

    #[test]
    fn test_infer_schema_required_and_defaults() {
        let candidate = ToolCandidate {
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
        };

        let schema = infer_schema(&candidate);
        assert_eq!(schema.description, "add two numbers");
        assert_eq!(schema.parameters.len(), 2);

        let a = &schema.parameters[0];
        assert_eq!(a.type_name, "integer");
        assert!(a.required);
        assert!(a.default.is_none());

        let b = &schema.parameters[1];
        assert_eq!(b.type_name, "integer");
        assert!(!b.required);
        assert_eq!(b.default, Some(serde_json::json!(2)));

        assert_eq!(schema.required_names(), vec!["a"]);
    }

    #[test]
    fn test_empty_docstring_gives_empty_description() {
        let candidate = ToolCandidate {
            name: "f".to_string(),
            file: "a.py".to_string(),
            line_start: 1,
            line_end: 1,
            signature: "def f():".to_string(),
            params: Vec::new(),
            docstring: None,
            syscall_hints: Vec::new(),
            merged: Vec::new(),
        };
        assert_eq!(infer_schema(&candidate).description, "");
    }

    #[test]
    fn test_unannotated_param_is_any() {
        let candidate = ToolCandidate {
            name: "f".to_string(),
            file: "a.py".to_string(),
            line_start: 1,
            line_end: 1,
            signature: "def f(x):".to_string(),
            params: vec![ParamInfo {
                name: "x".to_string(),
                annotation: None,
                default: None,
            }],
            docstring: None,
            syscall_hints: Vec::new(),
            merged: Vec::new(),
        };
        let schema = infer_schema(&candidate);
        assert_eq!(schema.parameters[0].type_name, "any");
        assert!(schema.parameters[0].required);
    }
}
