//! Pipeline error types — collaborator failures carrying document context.

use thiserror::Error;

use redline_core::ConfigError;

/// The document source could not produce a snapshot or prior revision.
#[derive(Debug, Error)]
#[error("document source failed for {document_id}: {message}")]
pub struct SourceError {
    /// Document the fetch was for.
    pub document_id: String,
    /// Failure description.
    pub message: String,
}

impl SourceError {
    /// Build a source failure for a document.
    #[must_use]
    pub fn new(document_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            document_id: document_id.into(),
            message: message.into(),
        }
    }
}

/// The review-state store failed a get or put.
#[derive(Debug, Error)]
#[error("state store {operation} failed for {document_id}: {message}")]
pub struct StoreError {
    /// Document whose state was being read or written.
    pub document_id: String,
    /// Which store operation failed (`"get"` or `"put"`).
    pub operation: &'static str,
    /// Failure description.
    pub message: String,
}

impl StoreError {
    /// Build a store failure for a document.
    #[must_use]
    pub fn new(
        document_id: impl Into<String>,
        operation: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            document_id: document_id.into(),
            operation,
            message: message.into(),
        }
    }
}

/// The comment sink rejected a single comment.
///
/// Posting is per-comment; a sink failure skips that comment only and the
/// cycle keeps going with the rest.
#[derive(Debug, Error)]
#[error("comment sink failed for {document_id}: {message}")]
pub struct SinkError {
    /// Document the comment was destined for.
    pub document_id: String,
    /// Failure description.
    pub message: String,
}

impl SinkError {
    /// Build a sink failure for a document.
    #[must_use]
    pub fn new(document_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            document_id: document_id.into(),
            message: message.into(),
        }
    }
}

/// A document's review cycle could not run to completion.
///
/// Chunk and anchor failures are absorbed inside the cycle (logged, counted,
/// skipped); only collaborator failures that leave the cycle without a
/// snapshot or persisted state, invalid tunables, and cancellation surface
/// here. One document's [`EngineError`] never blocks other documents.
#[derive(Debug, Error)]
pub enum EngineError {
    /// An invalid tunable reached the engine.
    #[error("{0}")]
    Config(#[from] ConfigError),

    /// The document source failed.
    #[error("{0}")]
    Source(#[from] SourceError),

    /// The review-state store failed.
    #[error("{0}")]
    Store(#[from] StoreError),

    /// The caller cancelled the cycle at a suspension point.
    #[error("review cycle cancelled")]
    Cancelled,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_error_display_names_document() {
        let err = SourceError::new("doc-1", "snapshot fetch timed out");
        assert_eq!(
            err.to_string(),
            "document source failed for doc-1: snapshot fetch timed out"
        );
    }

    #[test]
    fn store_error_display_names_operation() {
        let err = StoreError::new("doc-1", "put", "backend unavailable");
        assert!(err.to_string().contains("put"));
        assert!(err.to_string().contains("doc-1"));
    }

    #[test]
    fn engine_error_wraps_collaborator_failures() {
        let err: EngineError = SourceError::new("doc-1", "gone").into();
        assert!(matches!(err, EngineError::Source(_)));

        let err: EngineError = ConfigError::InvalidChunkSize(0).into();
        assert!(matches!(err, EngineError::Config(_)));
    }

    #[test]
    fn cancelled_display() {
        assert_eq!(EngineError::Cancelled.to_string(), "review cycle cancelled");
    }
}
