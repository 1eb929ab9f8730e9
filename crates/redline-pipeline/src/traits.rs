//! Collaborator traits — the narrow seams to the outside world.
//!
//! The engine reaches document storage, persisted review state, and the
//! comment transport only through these traits. Implementations own all
//! protocol detail (API clients, auth, storage technology); the pipeline
//! never assumes any of it. All three are object-safe so callers can wire
//! the engine with `Arc<dyn ...>` collaborators.

use async_trait::async_trait;

use redline_core::{AnchoredComment, DocumentSnapshot};

use crate::errors::{SinkError, SourceError, StoreError};
use crate::state::ReviewState;

/// Supplies document snapshots and prior revisions.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Fetch the current snapshot of a document.
    async fn fetch_snapshot(&self, document_id: &str) -> Result<DocumentSnapshot, SourceError>;

    /// Fetch a specific prior revision, or `None` when the source no longer
    /// has it (the diff then treats the document as first-reviewed).
    async fn fetch_revision(
        &self,
        document_id: &str,
        revision_id: &str,
    ) -> Result<Option<DocumentSnapshot>, SourceError>;
}

/// Persists per-document review state across cycles.
#[async_trait]
pub trait ReviewStateStore: Send + Sync {
    /// Load the state for a document; a document never seen before yields
    /// [`ReviewState::default`].
    async fn get(&self, document_id: &str) -> Result<ReviewState, StoreError>;

    /// Persist the state for a document, replacing any prior value.
    async fn put(&self, document_id: &str, state: ReviewState) -> Result<(), StoreError>;
}

/// Accepts anchored comments for delivery.
#[async_trait]
pub trait CommentSink: Send + Sync {
    /// Post one comment. Posting is per-comment; the engine never assumes
    /// multi-comment atomicity.
    async fn post(&self, document_id: &str, comment: &AnchoredComment) -> Result<(), SinkError>;
}
