//! Offset anchor mapper — locates a suggestion's quote in the document.
//!
//! The model reports a quote and a paragraph span; anchoring finds that quote
//! by exact substring search across the span's concatenated text and converts
//! the match into absolute character offsets. Anchoring correctness is a hard
//! invariant: zero matches or more than one match is a failure and the caller
//! skips the suggestion rather than posting at a guessed location.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::document::Paragraph;
use crate::suggestion::Suggestion;

/// A suggestion resolved to absolute document offsets, ready for posting.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnchoredComment {
    /// Absolute byte offset of the quote start, inclusive.
    pub start_offset: usize,
    /// Absolute byte offset past the quote end, exclusive.
    pub end_offset: usize,
    /// Comment text to post.
    pub body: String,
    /// Content hash of the originating suggestion.
    pub hash: String,
}

/// Why a suggestion could not be anchored.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum AnchorError {
    /// The quote no longer appears in the paragraph span (the document
    /// likely changed between review and posting).
    #[error("quote not found in paragraphs {start_para_idx}..={end_para_idx}")]
    QuoteNotFound {
        /// First paragraph of the searched span.
        start_para_idx: usize,
        /// Last paragraph of the searched span.
        end_para_idx: usize,
    },

    /// The quote appears more than once; the true target is ambiguous.
    #[error("quote matches {matches} locations in paragraphs {start_para_idx}..={end_para_idx}")]
    AmbiguousQuote {
        /// Number of occurrences found.
        matches: usize,
        /// First paragraph of the searched span.
        start_para_idx: usize,
        /// Last paragraph of the searched span.
        end_para_idx: usize,
    },

    /// The reported paragraph span does not exist in the snapshot.
    #[error("paragraph span {start_para_idx}..={end_para_idx} is out of bounds ({len} paragraphs)")]
    SpanOutOfBounds {
        /// First paragraph of the reported span.
        start_para_idx: usize,
        /// Last paragraph of the reported span.
        end_para_idx: usize,
        /// Paragraph count of the snapshot.
        len: usize,
    },

    /// An empty quote can never be located uniquely.
    #[error("empty quote cannot be anchored")]
    EmptyQuote,
}

/// Map a suggestion's quote to absolute offsets within `paragraphs`.
///
/// Searches the concatenated text of paragraphs
/// `[start_para_idx, end_para_idx]` for the exact quote. A unique match
/// yields an [`AnchoredComment`] whose offsets index into the document text;
/// anything else is an [`AnchorError`].
pub fn anchor_suggestion(
    suggestion: &Suggestion,
    paragraphs: &[Paragraph],
) -> Result<AnchoredComment, AnchorError> {
    let start = suggestion.start_para_idx;
    let end = suggestion.end_para_idx;

    if suggestion.quote.is_empty() {
        return Err(AnchorError::EmptyQuote);
    }
    if start > end || end >= paragraphs.len() {
        return Err(AnchorError::SpanOutOfBounds {
            start_para_idx: start,
            end_para_idx: end,
            len: paragraphs.len(),
        });
    }

    let span = &paragraphs[start..=end];
    let combined: String = span.iter().map(|p| p.text.as_str()).collect();

    let mut matches = combined.match_indices(&suggestion.quote);
    let Some((local, _)) = matches.next() else {
        return Err(AnchorError::QuoteNotFound {
            start_para_idx: start,
            end_para_idx: end,
        });
    };
    let extra = matches.count();
    if extra > 0 {
        return Err(AnchorError::AmbiguousQuote {
            matches: extra + 1,
            start_para_idx: start,
            end_para_idx: end,
        });
    }

    Ok(AnchoredComment {
        start_offset: to_absolute(span, local),
        end_offset: to_absolute(span, local + suggestion.quote.len()),
        body: suggestion.comment_body(),
        hash: suggestion.hash.clone(),
    })
}

/// Convert an offset into the span's concatenated text to an absolute offset.
///
/// Walks the span paragraphs, carrying each one's own `start_offset`, so the
/// mapping holds even if the document has gaps between paragraphs.
fn to_absolute(span: &[Paragraph], local: usize) -> usize {
    let mut consumed = 0;
    for para in span {
        let len = para.text.len();
        if local < consumed + len {
            return para.start_offset + (local - consumed);
        }
        consumed += len;
    }
    // Offset one past the final character maps to the last paragraph's end.
    span.last().map_or(local, |p| p.end_offset)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
