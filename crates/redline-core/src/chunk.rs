//! Chunker — groups changed paragraphs into byte-bounded request units.
//!
//! Paragraphs are taken in ascending index order and accumulated greedily
//! while the running byte total stays within `max_bytes`. A paragraph that is
//! larger than the bound on its own still gets a chunk of its own; nothing is
//! ever dropped or truncated. Chunking is deterministic: identical inputs
//! always produce identical boundaries.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::document::Paragraph;
use crate::errors::ConfigError;

/// A byte-bounded group of changed paragraphs sent in one model request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chunk {
    /// Paragraph indices in ascending order; each appears in exactly one chunk.
    pub paragraph_indices: Vec<usize>,
    /// Total byte size of the member paragraphs' text.
    pub byte_size: usize,
}

impl Chunk {
    /// First paragraph index in the chunk.
    #[must_use]
    pub fn first_index(&self) -> usize {
        self.paragraph_indices.first().copied().unwrap_or(0)
    }

    /// Last paragraph index in the chunk.
    #[must_use]
    pub fn last_index(&self) -> usize {
        self.paragraph_indices.last().copied().unwrap_or(0)
    }

    /// Concatenated text of the chunk's paragraphs, in index order.
    #[must_use]
    pub fn text_from(&self, paragraphs: &[Paragraph]) -> String {
        self.paragraph_indices
            .iter()
            .filter_map(|&i| paragraphs.get(i))
            .map(|p| p.text.as_str())
            .collect()
    }
}

/// Group the changed paragraphs into chunks of at most `max_bytes` each.
///
/// Only paragraphs whose index appears in `changed` are considered. Closes
/// the current chunk whenever adding the next paragraph would push it past
/// the bound; an oversized paragraph is emitted alone.
///
/// # Errors
///
/// [`ConfigError::InvalidChunkSize`] when `max_bytes` is zero.
pub fn chunk_paragraphs(
    paragraphs: &[Paragraph],
    changed: &BTreeSet<usize>,
    max_bytes: usize,
) -> Result<Vec<Chunk>, ConfigError> {
    if max_bytes == 0 {
        return Err(ConfigError::InvalidChunkSize(max_bytes));
    }

    let mut chunks = Vec::new();
    let mut indices: Vec<usize> = Vec::new();
    let mut bytes = 0usize;

    for para in paragraphs.iter().filter(|p| changed.contains(&p.index)) {
        let size = para.byte_size();
        if !indices.is_empty() && bytes + size > max_bytes {
            chunks.push(Chunk {
                paragraph_indices: std::mem::take(&mut indices),
                byte_size: bytes,
            });
            bytes = 0;
        }
        indices.push(para.index);
        bytes += size;
    }

    if !indices.is_empty() {
        chunks.push(Chunk {
            paragraph_indices: indices,
            byte_size: bytes,
        });
    }

    Ok(chunks)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
