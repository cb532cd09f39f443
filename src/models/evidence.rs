use serde::{Deserialize, Serialize};

/// Transport category implied by a repository's server code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Transport {
    Http,
    Ws,
    Sse,
    Stdio,
    Tcp,
    Unknown,
}

impl Transport {
    /// All classifiable categories, in tie-break precedence order.
    pub const CLASSIFIABLE: [Transport; 5] = [
        Transport::Http,
        Transport::Ws,
        Transport::Sse,
        Transport::Stdio,
        Transport::Tcp,
    ];

    /// Tie-break rank: lower wins on equal scores. Fixed independently of the
    /// rule table so repeated runs agree.
    pub fn precedence(&self) -> u8 {
        match self {
            Self::Http => 0,
            Self::Ws => 1,
            Self::Sse => 2,
            Self::Stdio => 3,
            Self::Tcp => 4,
            Self::Unknown => u8::MAX,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Http => "HTTP",
            Self::Ws => "WS",
            Self::Sse => "SSE",
            Self::Stdio => "STDIO",
            Self::Tcp => "TCP",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One located textual pattern supporting a transport classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceHit {
    pub file: String,
    /// 1-based line number of the match.
    pub line: u32,
    /// Identifier of the rule that matched.
    pub pattern: String,
    pub category: Transport,
    pub weight: f32,
}

/// Classification verdict: a pure function of the evidence set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportVerdict {
    pub category: Transport,
    pub confidence: f32,
    pub evidence: Vec<EvidenceHit>,
}

impl TransportVerdict {
    #[allow(dead_code)]
    pub fn unknown() -> Self {
        Self {
            category: Transport::Unknown,
            confidence: 0.0,
            evidence: Vec::new(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
