//! Client error types and transient/permanent classification.

use std::time::Duration;

use redline_core::Chunk;
use thiserror::Error;

/// Errors from a single model-service request attempt.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport-level failure (connect, timeout, protocol).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service rejected the request with 429.
    #[error("rate limited: {message}")]
    RateLimited {
        /// Delay requested by the service via `Retry-After`, if present.
        retry_after: Option<Duration>,
        /// Error description.
        message: String,
    },

    /// The service returned a non-2xx status other than 429.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error description.
        message: String,
        /// Whether this status is worth retrying (5xx).
        retryable: bool,
    },

    /// The response body did not parse as a suggestion array.
    ///
    /// Malformed bodies are a permanent failure for the chunk: retrying the
    /// same request would most likely reproduce the same body.
    #[error("malformed model response: {message}")]
    MalformedResponse {
        /// Parse error description.
        message: String,
    },

    /// The caller cancelled the request at a suspension point.
    #[error("request cancelled")]
    Cancelled,
}

impl ClientError {
    /// Whether this failure is transient and worth retrying.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(e) => {
                e.is_timeout()
                    || e.is_connect()
                    || e.status().is_some_and(|s| {
                        s == reqwest::StatusCode::TOO_MANY_REQUESTS || s.is_server_error()
                    })
            }
            Self::RateLimited { .. } => true,
            Self::Api { retryable, .. } => *retryable,
            Self::MalformedResponse { .. } | Self::Cancelled => false,
        }
    }

    /// Service-requested retry delay, if one was supplied.
    #[must_use]
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after, .. } => *retry_after,
            _ => None,
        }
    }

    /// Error category string for log fields.
    #[must_use]
    pub fn category(&self) -> &'static str {
        match self {
            Self::Http(_) => "network",
            Self::RateLimited { .. } => "rate_limit",
            Self::Api { .. } => "api",
            Self::MalformedResponse { .. } => "parse",
            Self::Cancelled => "cancelled",
        }
    }
}

/// A chunk's review exhausted its retries or failed permanently.
///
/// Identifies the chunk by its paragraph range so the caller can log and
/// skip it; one failed chunk never aborts the rest of the document.
#[derive(Debug, Error)]
#[error(
    "review failed for paragraphs {first_para_idx}..={last_para_idx} after {attempts} attempt(s): {source}"
)]
pub struct ChunkReviewError {
    /// First paragraph index of the failed chunk.
    pub first_para_idx: usize,
    /// Last paragraph index of the failed chunk.
    pub last_para_idx: usize,
    /// Number of attempts made before giving up.
    pub attempts: u32,
    /// The final attempt's error.
    #[source]
    pub source: ClientError,
}

impl ChunkReviewError {
    /// Build a chunk failure from the chunk being reviewed.
    #[must_use]
    pub fn for_chunk(chunk: &Chunk, attempts: u32, source: ClientError) -> Self {
        Self {
            first_para_idx: chunk.first_index(),
            last_para_idx: chunk.last_index(),
            attempts,
            source,
        }
    }

    /// Whether the failure was a cancellation rather than a service error.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self.source, ClientError::Cancelled)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limited_is_retryable() {
        let err = ClientError::RateLimited {
            retry_after: Some(Duration::from_secs(2)),
            message: "too many requests".into(),
        };
        assert!(err.is_retryable());
        assert_eq!(err.retry_after(), Some(Duration::from_secs(2)));
        assert_eq!(err.category(), "rate_limit");
    }

    #[test]
    fn server_error_is_retryable() {
        let err = ClientError::Api {
            status: 503,
            message: "unavailable".into(),
            retryable: true,
        };
        assert!(err.is_retryable());
        assert_eq!(err.category(), "api");
    }

    #[test]
    fn client_error_status_is_permanent() {
        let err = ClientError::Api {
            status: 400,
            message: "bad request".into(),
            retryable: false,
        };
        assert!(!err.is_retryable());
        assert_eq!(err.retry_after(), None);
    }

    #[test]
    fn malformed_response_is_permanent() {
        let err = ClientError::MalformedResponse {
            message: "expected array".into(),
        };
        assert!(!err.is_retryable());
        assert_eq!(err.category(), "parse");
    }

    #[test]
    fn cancelled_is_permanent() {
        assert!(!ClientError::Cancelled.is_retryable());
        assert_eq!(ClientError::Cancelled.category(), "cancelled");
    }

    #[test]
    fn display_includes_status() {
        let err = ClientError::Api {
            status: 429,
            message: "slow down".into(),
            retryable: true,
        };
        assert_eq!(err.to_string(), "API error (429): slow down");
    }

    #[test]
    fn chunk_error_carries_paragraph_range() {
        let chunk = Chunk {
            paragraph_indices: vec![2, 3, 4],
            byte_size: 42,
        };
        let err = ChunkReviewError::for_chunk(
            &chunk,
            3,
            ClientError::Api {
                status: 500,
                message: "boom".into(),
                retryable: true,
            },
        );
        assert_eq!(err.first_para_idx, 2);
        assert_eq!(err.last_para_idx, 4);
        assert_eq!(err.attempts, 3);
        assert!(err.to_string().contains("2..=4"));
        assert!(err.to_string().contains("3 attempt"));
    }

    #[test]
    fn chunk_error_cancellation_flag() {
        let chunk = Chunk {
            paragraph_indices: vec![0],
            byte_size: 1,
        };
        let err = ChunkReviewError::for_chunk(&chunk, 1, ClientError::Cancelled);
        assert!(err.is_cancelled());
    }
}
