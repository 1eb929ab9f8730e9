//! Configuration error type shared across the workspace.

use thiserror::Error;

/// An invalid tunable was supplied at construction time.
///
/// Configuration errors are fatal at startup and never retried: a pipeline
/// built on a zero chunk size or a zero request rate cannot make progress,
/// so the constructors reject it up front.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// `max_chunk_bytes` must be positive.
    #[error("max chunk bytes must be positive (got {0})")]
    InvalidChunkSize(usize),

    /// `requests_per_minute` must be positive.
    #[error("requests per minute must be positive (got {0})")]
    InvalidRequestRate(u32),

    /// `max_retry_attempts` must be positive.
    #[error("max retry attempts must be positive (got {0})")]
    InvalidRetryAttempts(u32),

    /// Backoff delays must be positive and ordered.
    #[error("invalid backoff delays: base {base_ms}ms, max {max_ms}ms")]
    InvalidBackoffDelays {
        /// Configured base delay in milliseconds.
        base_ms: u64,
        /// Configured maximum delay in milliseconds.
        max_ms: u64,
    },

    /// A required configuration value was empty.
    #[error("configuration value {0} must not be empty")]
    MissingValue(&'static str),
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
