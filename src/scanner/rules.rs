//! Declarative transport evidence rules: (pattern, category, weight) entries
//! loaded once. The scanner stays a pure table-driven function; precedence
//! and thresholds live elsewhere and are tested independently.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::Transport;

/// How a rule matches file text. Substring patterns are matched against
/// lowercased lines and must be written in lowercase.
#[derive(Debug, Clone, Copy)]
pub enum Matcher {
    Substring(&'static str),
    Regex(&'static str),
    /// Module import anywhere in the file plus a call site: the hit is
    /// reported at the call line.
    ImportCall {
        import: &'static str,
        call: &'static str,
    },
}

#[derive(Debug, Clone, Copy)]
pub struct PatternRule {
    pub id: &'static str,
    pub category: Transport,
    pub weight: f32,
    pub matcher: Matcher,
}

pub static RULES: &[PatternRule] = &[
    // --- HTTP ---------------------------------------------------------------
    PatternRule {
        id: "http.flask-import",
        category: Transport::Http,
        weight: 1.0,
        matcher: Matcher::Regex(r"(?i)from\s+flask\s+import|^\s*import\s+flask\b"),
    },
    PatternRule {
        id: "http.app-run",
        category: Transport::Http,
        weight: 1.0,
        matcher: Matcher::Regex(r"(?i)\bapp\.run\s*\("),
    },
    PatternRule {
        id: "http.fastapi-import",
        category: Transport::Http,
        weight: 1.0,
        matcher: Matcher::Regex(r"(?i)from\s+fastapi\s+import|^\s*import\s+fastapi\b"),
    },
    PatternRule {
        id: "http.uvicorn",
        category: Transport::Http,
        weight: 1.0,
        matcher: Matcher::Substring("uvicorn"),
    },
    PatternRule {
        id: "http.route-decorator",
        category: Transport::Http,
        weight: 1.0,
        matcher: Matcher::Regex(r"(?i)@(?:app|router|bp)\.(?:get|post|put|delete|patch|route)\s*\("),
    },
    PatternRule {
        id: "http.express-listen",
        category: Transport::Http,
        weight: 1.0,
        matcher: Matcher::ImportCall {
            import: "express",
            call: ".listen(",
        },
    },
    PatternRule {
        id: "http.create-server",
        category: Transport::Http,
        weight: 1.0,
        matcher: Matcher::Regex(r"(?i)http\.createserver|httpserver\s*\("),
    },
    // --- WS -----------------------------------------------------------------
    PatternRule {
        id: "ws.websocket",
        category: Transport::Ws,
        weight: 1.0,
        matcher: Matcher::Substring("websocket"),
    },
    PatternRule {
        id: "ws.socket-io",
        category: Transport::Ws,
        weight: 1.0,
        matcher: Matcher::Substring("socket.io"),
    },
    PatternRule {
        id: "ws.scheme",
        category: Transport::Ws,
        weight: 0.5,
        matcher: Matcher::Substring("ws://"),
    },
    // --- SSE ----------------------------------------------------------------
    PatternRule {
        id: "sse.eventsource",
        category: Transport::Sse,
        weight: 1.0,
        matcher: Matcher::Substring("eventsource"),
    },
    PatternRule {
        id: "sse.content-type",
        category: Transport::Sse,
        weight: 1.0,
        matcher: Matcher::Substring("text/event-stream"),
    },
    PatternRule {
        id: "sse.starlette",
        category: Transport::Sse,
        weight: 1.0,
        matcher: Matcher::Substring("sse_starlette"),
    },
    // --- STDIO --------------------------------------------------------------
    PatternRule {
        id: "stdio.sys-stdin",
        category: Transport::Stdio,
        weight: 1.0,
        matcher: Matcher::Substring("sys.stdin"),
    },
    PatternRule {
        id: "stdio.process-stdin",
        category: Transport::Stdio,
        weight: 1.0,
        matcher: Matcher::Substring("process.stdin"),
    },
    PatternRule {
        id: "stdio.argparse",
        category: Transport::Stdio,
        weight: 0.5,
        matcher: Matcher::Regex(r"(?i)^\s*import\s+argparse\b|argparse\.argumentparser"),
    },
    PatternRule {
        id: "stdio.click",
        category: Transport::Stdio,
        weight: 0.5,
        matcher: Matcher::Regex(r"(?i)^\s*import\s+click\b|@click\.(?:command|group)"),
    },
    // --- TCP ----------------------------------------------------------------
    PatternRule {
        id: "tcp.socket-bind",
        category: Transport::Tcp,
        weight: 1.0,
        matcher: Matcher::ImportCall {
            import: "import socket",
            call: ".bind((",
        },
    },
    PatternRule {
        id: "tcp.af-inet",
        category: Transport::Tcp,
        weight: 1.0,
        matcher: Matcher::Substring("af_inet"),
    },
    PatternRule {
        id: "tcp.net-create-server",
        category: Transport::Tcp,
        weight: 1.0,
        matcher: Matcher::Substring("net.createserver"),
    },
    PatternRule {
        id: "tcp.tcp-listener",
        category: Transport::Tcp,
        weight: 1.0,
        matcher: Matcher::Substring("tcplistener::bind"),
    },
];

/// Compiled regexes, index-aligned with `RULES`. `None` for non-regex rules.
pub static COMPILED: Lazy<Vec<Option<Regex>>> = Lazy::new(|| {
    RULES
        .iter()
        .map(|rule| match rule.matcher {
            Matcher::Regex(pattern) => Some(
                Regex::new(pattern).unwrap_or_else(|e| panic!("bad rule {}: {}", rule.id, e)),
            ),
            _ => None,
        })
        .collect()
});

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_ids_unique() {
        let mut ids: Vec<&str> = RULES.iter().map(|r| r.id).collect();
        ids.sort_unstable();
        let before = ids.len();
        ids.dedup();
        assert_eq!(before, ids.len());
    }

    #[test]
    fn test_all_regexes_compile() {
        assert_eq!(COMPILED.len(), RULES.len());
        for (rule, compiled) in RULES.iter().zip(COMPILED.iter()) {
            if matches!(rule.matcher, Matcher::Regex(_)) {
                assert!(compiled.is_some(), "rule {} missing compiled regex", rule.id);
            }
        }
    }

    #[test]
    fn test_substring_patterns_are_lowercase() {
        for rule in RULES {
            if let Matcher::Substring(s) = rule.matcher {
                assert_eq!(s, s.to_lowercase(), "rule {} not lowercase", rule.id);
            }
        }
    }

    #[test]
    fn test_every_classifiable_category_has_rules() {
        for category in Transport::CLASSIFIABLE {
            assert!(
                RULES.iter().any(|r| r.category == category),
                "no rules for {}",
                category
            );
        }
    }

    #[test]
    fn test_weights_positive() {
        for rule in RULES {
            assert!(rule.weight > 0.0, "rule {} has non-positive weight", rule.id);
        }
    }
}
