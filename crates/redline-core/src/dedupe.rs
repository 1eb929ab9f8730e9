//! Deduplicator — suppresses previously-emitted suggestions by content hash.
//!
//! Pure filtering only: the caller owns persistence of the returned hashes,
//! and writes them back only after the corresponding comments actually
//! posted. Marking a never-delivered suggestion as seen would silence it
//! forever.

use std::collections::BTreeSet;

use crate::suggestion::Suggestion;

/// Drop suggestions whose hash was already seen.
///
/// A suggestion survives iff its hash is absent from `seen` and from every
/// suggestion kept earlier in this batch; within-batch duplicates collapse
/// to the first occurrence. Order is preserved.
///
/// Returns the kept suggestions and the set of their hashes.
#[must_use]
pub fn filter_suggestions(
    suggestions: Vec<Suggestion>,
    seen: &BTreeSet<String>,
) -> (Vec<Suggestion>, BTreeSet<String>) {
    let mut kept = Vec::new();
    let mut new_hashes = BTreeSet::new();

    for suggestion in suggestions {
        if seen.contains(&suggestion.hash) || new_hashes.contains(&suggestion.hash) {
            continue;
        }
        let _ = new_hashes.insert(suggestion.hash.clone());
        kept.push(suggestion);
    }

    (kept, new_hashes)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
