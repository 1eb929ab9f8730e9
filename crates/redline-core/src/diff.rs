//! Revision diff detector — which paragraphs changed between two snapshots.
//!
//! Comparison is positional: paragraph `i` of the current revision is compared
//! against paragraph `i` of the previous one by text equality. When the two
//! revisions disagree on paragraph count, every index from the first point of
//! divergence onward is marked changed. That is a deliberate conservative
//! approximation, not a structural diff: an insertion near the top re-reviews
//! the tail instead of realigning it. Deduplication downstream keeps the
//! re-review from producing repeat comments.

use std::collections::BTreeSet;

use crate::document::DocumentSnapshot;

/// Compute the set of changed paragraph indices in `current`.
///
/// - `previous == None` (first-ever review): every index is changed.
/// - Equal `revision_id`s short-circuit to the empty set without comparing
///   paragraph text.
/// - Equal paragraph counts: an index is changed iff its text differs.
/// - Differing counts: all indices from the first divergence to the end of
///   `current` are changed.
///
/// Pure function of its inputs.
#[must_use]
pub fn detect_changes(
    previous: Option<&DocumentSnapshot>,
    current: &DocumentSnapshot,
) -> BTreeSet<usize> {
    let Some(previous) = previous else {
        return (0..current.paragraphs.len()).collect();
    };

    if previous.revision_id == current.revision_id {
        return BTreeSet::new();
    }

    let prev = &previous.paragraphs;
    let cur = &current.paragraphs;

    if prev.len() == cur.len() {
        return cur
            .iter()
            .zip(prev.iter())
            .filter(|(c, p)| c.text != p.text)
            .map(|(c, _)| c.index)
            .collect();
    }

    // Count mismatch: mark everything from the first divergence onward.
    let common = prev.len().min(cur.len());
    let divergence = (0..common)
        .find(|&i| prev[i].text != cur[i].text)
        .unwrap_or(common);
    (divergence..cur.len()).collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
