//! # redline-llm
//!
//! The rate-limited, retry-capable model client for Redline.
//!
//! One review request is issued per [`Chunk`](redline_core::Chunk):
//!
//! - [`SlidingWindowLimiter`] admits at most N requests per trailing
//!   60-second window, atomically, across every caller in the process
//! - [`RetryPolicy`] computes exponential backoff with additive jitter;
//!   a server-supplied `Retry-After` takes precedence
//! - [`ReviewClient`] sends the chunk, classifies failures as transient or
//!   permanent, retries transient ones up to the cap, and parses successful
//!   responses into [`Suggestion`](redline_core::Suggestion)s

#![deny(unsafe_code)]

pub mod backoff;
pub mod client;
pub mod error;
pub mod limiter;
pub mod wire;

pub use backoff::{RetryPolicy, parse_retry_after};
pub use client::{DEFAULT_SYSTEM_PROMPT, PersonaConfig, ReviewClient, ReviewClientConfig};
pub use error::{ChunkReviewError, ClientError};
pub use limiter::SlidingWindowLimiter;
pub use wire::{ChatMessage, ReviewRequest, parse_suggestions};
