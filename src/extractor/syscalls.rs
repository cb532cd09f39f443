//! Syscall-surface hints: regex heuristics over a candidate's source text,
//! grouped by the kernel interface the code would plausibly touch.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::SyscallHint;

struct HintRule {
    syscall: &'static str,
    reason: &'static str,
    pattern: &'static str,
}

const HINT_RULES: &[HintRule] = &[
    HintRule {
        syscall: "execve/system",
        reason: "calls to subprocess or os.system",
        pattern: r"\bos\.system\b|\bsubprocess\.(?:run|Popen|call)\b|\bchild_process\b",
    },
    HintRule {
        syscall: "open/read/write",
        reason: "file open calls found",
        pattern: r"\bopen\s*\(|\bfopen\s*\(|\breadFileSync\b|\bwriteFileSync\b",
    },
    HintRule {
        syscall: "socket",
        reason: "socket operations found",
        pattern: r"\bsocket\s*\(|\blisten\s*\(|\baccept\s*\(",
    },
    HintRule {
        syscall: "network",
        reason: "HTTP requests to external services",
        pattern: r"\brequests\.(?:get|post|put|delete)\b|\burllib\b|\bfetch\s*\(|\baxios\b",
    },
];

static COMPILED: Lazy<Vec<Regex>> = Lazy::new(|| {
    HINT_RULES
        .iter()
        .map(|r| Regex::new(r.pattern).expect("valid hint pattern"))
        .collect()
});

/// Scan candidate source text for syscall-surface hints. At most one hint
/// per group, in table order.
pub fn detect_syscall_hints(code: &str) -> Vec<SyscallHint> {
    HINT_RULES
        .iter()
        .zip(COMPILED.iter())
        .filter(|(_, re)| re.is_match(code))
        .map(|(rule, _)| SyscallHint {
            syscall: rule.syscall.to_string(),
            reason: rule.reason.to_string(),
        })
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================
