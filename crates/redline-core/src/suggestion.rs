//! Suggestion types and content hashing.
//!
//! Two suggestions with the same `(suggestion_text, quote)` pair hash
//! identically regardless of which chunk or review run produced them; the
//! hash is the deduplication key and travels with the suggestion from parse
//! time onward.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Hex length the content digest is truncated to.
const HASH_LEN: usize = 16;

/// How strongly the model flagged the issue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Stylistic nit.
    Low,
    /// Worth fixing.
    Medium,
    /// Likely an error.
    High,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

/// A single model-produced review suggestion.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    /// Short issue label (may be empty).
    pub issue: String,
    /// The suggested fix or comment text.
    pub suggestion_text: String,
    /// Model-reported severity.
    pub severity: Severity,
    /// Exact text the suggestion refers to.
    pub quote: String,
    /// First paragraph index of the quoted span.
    pub start_para_idx: usize,
    /// Last paragraph index of the quoted span, inclusive.
    pub end_para_idx: usize,
    /// Content hash of `(quote, suggestion_text)`; the deduplication key.
    pub hash: String,
}

impl Suggestion {
    /// Comment body to post for this suggestion.
    #[must_use]
    pub fn comment_body(&self) -> String {
        if self.issue.is_empty() {
            self.suggestion_text.clone()
        } else {
            format!("{}: {}", self.issue, self.suggestion_text)
        }
    }
}

/// Deterministic content digest of a suggestion.
///
/// SHA-256 over `suggestion_text + "|" + quote`, lowercase hex, truncated to
/// sixteen characters. Stable across chunks, runs, and processes.
#[must_use]
pub fn suggestion_hash(suggestion_text: &str, quote: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(suggestion_text.as_bytes());
    hasher.update(b"|");
    hasher.update(quote.as_bytes());
    let digest = hasher.finalize();
    let mut hex = String::with_capacity(HASH_LEN);
    for byte in digest.iter().take(HASH_LEN / 2) {
        hex.push_str(&format!("{byte:02x}"));
    }
    hex
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
