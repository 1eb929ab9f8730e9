//! Persisted per-document review state, plus an in-memory store.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::errors::StoreError;
use crate::traits::ReviewStateStore;

/// The externally persisted record for one document.
///
/// `revision_id` is the last revision reviewed without a chunk or posting
/// failure; `seen_hashes` holds the content hashes of every suggestion whose
/// comment was confirmed posted. The engine only ever adds hashes — eviction,
/// if any, belongs to the store implementation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewState {
    /// Last cleanly reviewed revision, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision_id: Option<String>,
    /// Hashes of suggestions already delivered as comments.
    #[serde(default)]
    pub seen_hashes: BTreeSet<String>,
}

impl ReviewState {
    /// Merge the hashes of confirmed-posted comments into the seen set.
    pub fn record_posted(&mut self, hashes: impl IntoIterator<Item = String>) {
        self.seen_hashes.extend(hashes);
    }
}

/// In-memory [`ReviewStateStore`] for tests and embedded use.
///
/// State lives for the lifetime of the process; nothing is ever evicted.
#[derive(Default)]
pub struct MemoryStateStore {
    states: Mutex<HashMap<String, ReviewState>>,
}

impl MemoryStateStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Peek at the stored state for a document, if any.
    #[must_use]
    pub fn stored(&self, document_id: &str) -> Option<ReviewState> {
        self.states.lock().get(document_id).cloned()
    }
}

#[async_trait]
impl ReviewStateStore for MemoryStateStore {
    async fn get(&self, document_id: &str) -> Result<ReviewState, StoreError> {
        Ok(self
            .states
            .lock()
            .get(document_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn put(&self, document_id: &str, state: ReviewState) -> Result<(), StoreError> {
        let _ = self.states.lock().insert(document_id.to_string(), state);
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
