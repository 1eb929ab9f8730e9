//! # redline-pipeline
//!
//! The review-cycle engine for Redline.
//!
//! [`ReviewEngine`] drives one document at a time through the change-aware
//! pipeline — diff, chunk, rate-limited model review, dedupe, anchor, post —
//! over collaborators injected through three narrow traits:
//!
//! - [`DocumentSource`] supplies snapshots and prior revisions
//! - [`ReviewStateStore`] persists the revision id and seen-hash set
//! - [`CommentSink`] delivers anchored comments
//!
//! [`MemoryStateStore`] ships as an in-process store for tests and embedded
//! use. Failure isolation is the crate's contract: chunks, suggestions, and
//! documents each fail alone, and persisted state is never corrupted by a
//! partial failure.

#![deny(unsafe_code)]

pub mod engine;
pub mod errors;
pub mod state;
pub mod traits;

pub use engine::{CycleReport, DocumentOutcome, EngineConfig, ReviewEngine};
pub use errors::{EngineError, SinkError, SourceError, StoreError};
pub use state::{MemoryStateStore, ReviewState};
pub use traits::{CommentSink, DocumentSource, ReviewStateStore};
