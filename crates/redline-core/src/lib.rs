//! # redline-core
//!
//! Foundation types and pure algorithms for the Redline review pipeline.
//!
//! This crate holds everything that needs no I/O and no async runtime:
//!
//! - **Paragraph model**: [`Paragraph`] and [`DocumentSnapshot`] with byte offsets
//! - **Revision diffing**: [`detect_changes`] between two snapshots
//! - **Chunking**: [`chunk_paragraphs`] groups changed paragraphs into byte-bounded requests
//! - **Suggestions**: [`Suggestion`] with content hashing, [`Severity`]
//! - **Deduplication**: [`filter_suggestions`] against a seen-hash set
//! - **Anchoring**: [`anchor_suggestion`] maps quotes back to absolute offsets
//! - **Errors**: [`ConfigError`] for invalid tunables, [`AnchorError`] for failed anchors

#![deny(unsafe_code)]

pub mod anchor;
pub mod chunk;
pub mod dedupe;
pub mod diff;
pub mod document;
pub mod errors;
pub mod suggestion;

pub use anchor::{AnchorError, AnchoredComment, anchor_suggestion};
pub use chunk::{Chunk, chunk_paragraphs};
pub use dedupe::filter_suggestions;
pub use diff::detect_changes;
pub use document::{DocumentSnapshot, Paragraph};
pub use errors::ConfigError;
pub use suggestion::{Severity, Suggestion, suggestion_hash};
