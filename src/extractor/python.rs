//! Python extraction front-end (tree-sitter-python). Walks every
//! `function_definition`, nested ones included, and lowers each into the
//! language-neutral `FunctionDef` shape.

use streaming_iterator::StreamingIterator;
use tree_sitter::{Node, Parser, Query, QueryCursor};

use super::ast::{ExtractError, FunctionDef, LanguageFrontend, ParamNode, Result};

// Matches at any nesting depth, decorated definitions included.
const PYTHON_QUERY: &str = r#"
(function_definition
  name: (identifier) @name
) @function
"#;

pub struct PythonFrontend;

impl LanguageFrontend for PythonFrontend {
    fn name(&self) -> &'static str {
        "python"
    }

    fn parse_functions(&self, source: &str) -> Result<Vec<FunctionDef>> {
        let language: tree_sitter::Language = tree_sitter_python::LANGUAGE.into();
        let mut parser = Parser::new();
        parser
            .set_language(&language)
            .map_err(|_| ExtractError::UnsupportedLanguage("python".to_string()))?;

        let tree = parser
            .parse(source, None)
            .ok_or(ExtractError::ParseError)?;

        // tree-sitter recovers from syntax errors with ERROR nodes; treat any
        // of those as a failed parse so broken files yield zero candidates
        // instead of half-read signatures.
        if tree.root_node().has_error() {
            return Err(ExtractError::ParseError);
        }

        let query = Query::new(&language, PYTHON_QUERY)
            .map_err(|e| ExtractError::QueryError(e.message.to_string()))?;

        let mut cursor = QueryCursor::new();
        let mut defs = Vec::new();
        let capture_names = query.capture_names();

        let mut matches = cursor.matches(&query, tree.root_node(), source.as_bytes());
        while let Some(match_) = matches.next() {
            let mut name = String::new();
            let mut func_node = None;

            for capture in match_.captures {
                match capture_names[capture.index as usize] {
                    "name" => name = source[capture.node.byte_range()].to_string(),
                    "function" => func_node = Some(capture.node),
                    _ => {}
                }
            }

            let Some(node) = func_node else { continue };
            if name.is_empty() {
                continue;
            }

            defs.push(FunctionDef {
                name,
                params: collect_params(node, source),
                docstring: extract_docstring(node, source),
                line_start: node.start_position().row as u32 + 1,
                line_end: node.end_position().row as u32 + 1,
                text: source[node.byte_range()].to_string(),
            });
        }

        Ok(defs)
    }
}

/// Lower the `parameters` subtree. `self`/`cls` receivers and splat
/// parameters (`*args`, `**kwargs`) carry no schema and are skipped.
fn collect_params(func: Node<'_>, source: &str) -> Vec<ParamNode> {
    let mut params = Vec::new();
    let Some(list) = func.child_by_field_name("parameters") else {
        return params;
    };

    for i in 0..list.named_child_count() {
        let Some(child) = list.named_child(i) else {
            continue;
        };
        let param = match child.kind() {
            "identifier" => Some(ParamNode {
                name: text_of(child, source),
                annotation: None,
                default: None,
            }),
            "typed_parameter" => {
                let name = child
                    .named_child(0)
                    .filter(|n| n.kind() == "identifier")
                    .map(|n| text_of(n, source));
                name.map(|name| ParamNode {
                    name,
                    annotation: child
                        .child_by_field_name("type")
                        .map(|n| text_of(n, source)),
                    default: None,
                })
            }
            "default_parameter" => child.child_by_field_name("name").map(|n| ParamNode {
                name: text_of(n, source),
                annotation: None,
                default: child
                    .child_by_field_name("value")
                    .map(|v| text_of(v, source)),
            }),
            "typed_default_parameter" => child.child_by_field_name("name").map(|n| ParamNode {
                name: text_of(n, source),
                annotation: child
                    .child_by_field_name("type")
                    .map(|t| text_of(t, source)),
                default: child
                    .child_by_field_name("value")
                    .map(|v| text_of(v, source)),
            }),
            // *args / **kwargs / bare * and / separators
            _ => None,
        };

        if let Some(p) = param {
            if p.name == "self" || p.name == "cls" {
                continue;
            }
            params.push(p);
        }
    }

    params
}

/// Python convention: the docstring is a string expression as the first
/// statement of the body.
fn extract_docstring(func: Node<'_>, source: &str) -> Option<String> {
    let body = func.child_by_field_name("body")?;
    let first = body.named_child(0)?;
    if first.kind() != "expression_statement" {
        return None;
    }
    let inner = first.named_child(0)?;
    if inner.kind() != "string" {
        return None;
    }
    let raw = text_of(inner, source);
    Some(strip_string_quotes(&raw))
}

fn strip_string_quotes(raw: &str) -> String {
    let no_prefix = raw
        .trim_start_matches(|c| matches!(c, 'r' | 'R' | 'b' | 'B' | 'u' | 'U' | 'f' | 'F'));
    for quote in ["\"\"\"", "'''", "\"", "'"] {
        if let Some(stripped) = no_prefix
            .strip_prefix(quote)
            .and_then(|s| s.strip_suffix(quote))
        {
            return stripped.trim().to_string();
        }
    }
    no_prefix.trim().to_string()
}

fn text_of(node: Node<'_>, source: &str) -> String {
    source[node.byte_range()].to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Vec<FunctionDef> {
        PythonFrontend.parse_functions(source).unwrap()
    }

    #[test]
    fn test_simple_function_with_defaults() {
        let defs = parse("def add(a: int, b: int = 2):\n    \"add two numbers\"\n    return a + b\n");
        assert_eq!(defs.len(), 1);
        let def = &defs[0];
        assert_eq!(def.name, "add");
        assert_eq!(def.line_start, 1);
        assert_eq!(def.docstring.as_deref(), Some("add two numbers"));
        assert_eq!(
            def.params,
            vec![
                ParamNode {
                    name: "a".to_string(),
                    annotation: Some("int".to_string()),
                    default: None,
                },
                ParamNode {
                    name: "b".to_string(),
                    annotation: Some("int".to_string()),
                    default: Some("2".to_string()),
                },
            ]
        );
        assert_eq!(def.signature(), "def add(a: int, b: int = 2):");
    }

    #[test]
    fn test_untyped_and_default_only_params() {
        let defs = parse("def f(x, y=3, name='bob'):\n    pass\n");
        let params = &defs[0].params;
        assert_eq!(params[0], ParamNode {
            name: "x".to_string(),
            annotation: None,
            default: None,
        });
        assert_eq!(params[1].default.as_deref(), Some("3"));
        assert_eq!(params[2].default.as_deref(), Some("'bob'"));
    }

    #[test]
    fn test_nested_functions_are_walked() {
        let source = "def outer():\n    def inner(q: str):\n        return q\n    return inner\n";
        let defs = parse(source);
        let names: Vec<&str> = defs.iter().map(|d| d.name.as_str()).collect();
        assert!(names.contains(&"outer"));
        assert!(names.contains(&"inner"));
    }

    #[test]
    fn test_method_skips_self_and_decorated() {
        let source = "class Svc:\n    @staticmethod\n    def ping():\n        pass\n\n    def call(self, payload: dict):\n        return payload\n";
        let defs = parse(source);
        let call = defs.iter().find(|d| d.name == "call").unwrap();
        assert_eq!(call.params.len(), 1);
        assert_eq!(call.params[0].name, "payload");
        assert!(defs.iter().any(|d| d.name == "ping"));
    }

    #[test]
    fn test_splat_params_skipped() {
        let defs = parse("def f(a, *args, **kwargs):\n    pass\n");
        assert_eq!(defs[0].params.len(), 1);
        assert_eq!(defs[0].params[0].name, "a");
    }

    #[test]
    fn test_triple_quoted_docstring_first_line() {
        let source = "def f():\n    \"\"\"summary line\n\n    details\n    \"\"\"\n    pass\n";
        let defs = parse(source);
        assert_eq!(defs[0].doc_summary(), "summary line");
    }

    #[test]
    fn test_no_docstring() {
        let defs = parse("def f():\n    return 1\n");
        assert!(defs[0].docstring.is_none());
    }

    #[test]
    fn test_async_function_extracted() {
        let defs = parse("async def fetch(url: str):\n    return url\n");
        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0].name, "fetch");
        assert_eq!(defs[0].params[0].annotation.as_deref(), Some("str"));
    }

    #[test]
    fn test_generic_annotation_text_is_verbatim() {
        let defs = parse("def f(items: list[int], opts: dict[str, str] = {}):\n    pass\n");
        let params = &defs[0].params;
        assert_eq!(params[0].annotation.as_deref(), Some("list[int]"));
        assert_eq!(params[1].annotation.as_deref(), Some("dict[str, str]"));
        assert_eq!(params[1].default.as_deref(), Some("{}"));
    }
}
