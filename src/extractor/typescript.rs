//! TypeScript/JavaScript extraction front-end (tree-sitter-typescript).
//! Captures function declarations and named arrow-function bindings; a doc
//! comment immediately above a definition is carried as its docstring.

use streaming_iterator::StreamingIterator;
use tree_sitter::{Node, Parser, Query, QueryCursor};

use super::ast::{ExtractError, FunctionDef, LanguageFrontend, ParamNode, Result};

const TYPESCRIPT_QUERY: &str = r#"
(function_declaration
  name: (identifier) @name
) @function

(lexical_declaration
  (variable_declarator
    name: (identifier) @name
    value: (arrow_function) @arrow
  )
) @arrow_decl
"#;

pub struct TypeScriptFrontend;

impl LanguageFrontend for TypeScriptFrontend {
    fn name(&self) -> &'static str {
        "typescript"
    }

    fn parse_functions(&self, source: &str) -> Result<Vec<FunctionDef>> {
        let language: tree_sitter::Language =
            tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into();
        let mut parser = Parser::new();
        parser
            .set_language(&language)
            .map_err(|_| ExtractError::UnsupportedLanguage("typescript".to_string()))?;

        let tree = parser
            .parse(source, None)
            .ok_or(ExtractError::ParseError)?;

        if tree.root_node().has_error() {
            return Err(ExtractError::ParseError);
        }

        let query = Query::new(&language, TYPESCRIPT_QUERY)
            .map_err(|e| ExtractError::QueryError(e.message.to_string()))?;

        let mut cursor = QueryCursor::new();
        let mut defs = Vec::new();
        let capture_names = query.capture_names();

        let mut matches = cursor.matches(&query, tree.root_node(), source.as_bytes());
        while let Some(match_) = matches.next() {
            let mut name = String::new();
            let mut decl_node = None;
            let mut params_owner = None;

            for capture in match_.captures {
                match capture_names[capture.index as usize] {
                    "name" => name = source[capture.node.byte_range()].to_string(),
                    "function" => {
                        decl_node = Some(capture.node);
                        params_owner = Some(capture.node);
                    }
                    "arrow" => params_owner = Some(capture.node),
                    "arrow_decl" => decl_node = Some(capture.node),
                    _ => {}
                }
            }

            let (Some(decl), Some(owner)) = (decl_node, params_owner) else {
                continue;
            };
            if name.is_empty() {
                continue;
            }

            defs.push(FunctionDef {
                name,
                params: collect_params(owner, source),
                docstring: leading_comment(decl, source),
                line_start: decl.start_position().row as u32 + 1,
                line_end: decl.end_position().row as u32 + 1,
                text: source[decl.byte_range()].to_string(),
            });
        }

        Ok(defs)
    }
}

/// Lower `formal_parameters`: identifier, `?` optional marker, type
/// annotation, default initializer. Destructuring patterns carry no single
/// name and are skipped.
fn collect_params(func: Node<'_>, source: &str) -> Vec<ParamNode> {
    let mut params = Vec::new();
    let Some(list) = func.child_by_field_name("parameters") else {
        return params;
    };

    for i in 0..list.named_child_count() {
        let Some(child) = list.named_child(i) else {
            continue;
        };
        if !matches!(child.kind(), "required_parameter" | "optional_parameter") {
            continue;
        }

        let Some(name_node) = child
            .child_by_field_name("pattern")
            .filter(|n| n.kind() == "identifier")
        else {
            continue;
        };

        let annotation = child
            .child_by_field_name("type")
            .map(|n| text_of(n, source).trim_start_matches(':').trim().to_string());
        let default = child
            .child_by_field_name("value")
            .map(|n| text_of(n, source));

        params.push(ParamNode {
            name: text_of(name_node, source),
            annotation,
            default,
        });
    }

    params
}

/// A comment ending on the line directly above the definition (or its export
/// wrapper) becomes the docstring.
fn leading_comment(decl: Node<'_>, source: &str) -> Option<String> {
    let mut anchor = decl;
    if let Some(parent) = decl.parent() {
        if parent.kind() == "export_statement" {
            anchor = parent;
        }
    }

    let prev = anchor.prev_named_sibling()?;
    if prev.kind() != "comment" {
        return None;
    }
    if prev.end_position().row + 1 < anchor.start_position().row {
        return None;
    }
    Some(clean_comment(&text_of(prev, source)))
}

fn clean_comment(raw: &str) -> String {
    raw.lines()
        .map(|line| {
            line.trim()
                .trim_start_matches("/**")
                .trim_start_matches("/*")
                .trim_end_matches("*/")
                .trim_start_matches("//")
                .trim_start_matches('*')
                .trim()
        })
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn text_of(node: Node<'_>, source: &str) -> String {
    source[node.byte_range()].to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================
