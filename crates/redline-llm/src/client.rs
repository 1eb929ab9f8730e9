//! Review client — one rate-limited, retry-capable model call per chunk.
//!
//! Every attempt takes a limiter slot first, so retries count against the
//! requests-per-minute budget like any other request. Transient failures
//! (429, 5xx, timeouts) back off exponentially with jitter; a
//! service-supplied `Retry-After` replaces the computed delay. Permanent
//! failures (other 4xx, malformed bodies) surface immediately. Either way
//! the caller gets a [`ChunkReviewError`] naming the chunk, skips it, and
//! carries on with the rest of the document.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use redline_core::{Chunk, ConfigError, DocumentSnapshot, Suggestion};

use crate::backoff::{RetryPolicy, parse_retry_after};
use crate::error::{ChunkReviewError, ClientError};
use crate::limiter::SlidingWindowLimiter;
use crate::wire::{ChatMessage, ReviewRequest, api_error_message, parse_suggestions};

/// System prompt used when the persona does not supply one.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a careful copy editor. Review the provided \
     document text for grammar, clarity, and style. Report each finding as a JSON object with \
     issue, suggestion, severity, quote, start_para_idx, and end_para_idx fields, and return \
     the findings as a JSON array.";

/// Default per-request timeout.
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Path of the review endpoint under the service base URL.
const REVIEW_PATH: &str = "/v1/review";

/// Prompt framing for review requests.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PersonaConfig {
    /// System prompt establishing the reviewer persona.
    pub system_prompt: String,
    /// Optional document-specific context prepended to the chunk text
    /// (e.g. the author's share message).
    pub context: Option<String>,
}

impl Default for PersonaConfig {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            context: None,
        }
    }
}

/// Client configuration.
#[derive(Clone, Debug)]
pub struct ReviewClientConfig {
    /// Base URL of the model service.
    pub base_url: String,
    /// Bearer token for the service.
    pub api_key: String,
    /// Model identifier sent with every request.
    pub model: String,
    /// Retry and backoff parameters.
    pub retry: RetryPolicy,
    /// Per-request timeout.
    pub request_timeout: Duration,
}

impl ReviewClientConfig {
    /// Create a config with default retry and timeout settings.
    #[must_use]
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
            retry: RetryPolicy::default(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Check the tunables.
    ///
    /// # Errors
    ///
    /// [`ConfigError`] when the retry policy is invalid or a required value
    /// is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.retry.validate()?;
        if self.base_url.is_empty() {
            return Err(ConfigError::MissingValue("model.baseUrl"));
        }
        if self.model.is_empty() {
            return Err(ConfigError::MissingValue("model.name"));
        }
        Ok(())
    }
}

/// Rate-limited, retry-capable model client.
pub struct ReviewClient {
    config: ReviewClientConfig,
    http: reqwest::Client,
    limiter: Arc<SlidingWindowLimiter>,
}

impl ReviewClient {
    /// Create a client sharing the given limiter.
    ///
    /// # Errors
    ///
    /// [`ConfigError`] when the configuration is invalid.
    pub fn new(
        config: ReviewClientConfig,
        limiter: Arc<SlidingWindowLimiter>,
    ) -> Result<Self, ConfigError> {
        Self::with_client(config, reqwest::Client::new(), limiter)
    }

    /// Create a client with a caller-supplied HTTP client.
    ///
    /// # Errors
    ///
    /// [`ConfigError`] when the configuration is invalid.
    pub fn with_client(
        config: ReviewClientConfig,
        http: reqwest::Client,
        limiter: Arc<SlidingWindowLimiter>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            http,
            limiter,
        })
    }

    /// The shared rate limiter.
    #[must_use]
    pub fn limiter(&self) -> &Arc<SlidingWindowLimiter> {
        &self.limiter
    }

    /// Review one chunk, returning its suggestions in service order.
    ///
    /// # Errors
    ///
    /// [`ChunkReviewError`] once retries are exhausted, on a permanent
    /// failure, or on cancellation. The caller skips the chunk and
    /// continues with the rest of the document.
    pub async fn review_chunk(
        &self,
        snapshot: &DocumentSnapshot,
        chunk: &Chunk,
        persona: &PersonaConfig,
        cancel: &CancellationToken,
    ) -> Result<Vec<Suggestion>, ChunkReviewError> {
        let request = self.build_request(snapshot, chunk, persona);
        let mut attempts: u32 = 0;

        loop {
            if let Err(err) = self.limiter.acquire(cancel).await {
                return Err(ChunkReviewError::for_chunk(chunk, attempts, err));
            }
            attempts += 1;

            match self.send(&request).await {
                Ok(suggestions) => {
                    debug!(
                        first_para = chunk.first_index(),
                        last_para = chunk.last_index(),
                        count = suggestions.len(),
                        attempts,
                        "chunk reviewed"
                    );
                    return Ok(suggestions);
                }
                Err(err) if err.is_retryable() && attempts < self.config.retry.max_attempts => {
                    let backoff = self
                        .config
                        .retry
                        .delay_for(attempts - 1, rand::random::<f64>());
                    let delay = err.retry_after().unwrap_or(backoff);
                    warn!(
                        first_para = chunk.first_index(),
                        last_para = chunk.last_index(),
                        attempts,
                        category = err.category(),
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        "transient review failure, backing off"
                    );
                    tokio::select! {
                        () = tokio::time::sleep(delay) => {}
                        () = cancel.cancelled() => {
                            return Err(ChunkReviewError::for_chunk(
                                chunk,
                                attempts,
                                ClientError::Cancelled,
                            ));
                        }
                    }
                }
                Err(err) => return Err(ChunkReviewError::for_chunk(chunk, attempts, err)),
            }
        }
    }

    /// Build the request payload for a chunk.
    fn build_request(
        &self,
        snapshot: &DocumentSnapshot,
        chunk: &Chunk,
        persona: &PersonaConfig,
    ) -> ReviewRequest {
        let chunk_text = chunk.text_from(&snapshot.paragraphs);
        let user_content = match &persona.context {
            Some(context) if !context.is_empty() => format!("{context}\n\n{chunk_text}"),
            _ => chunk_text.clone(),
        };
        ReviewRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage::system(&persona.system_prompt),
                ChatMessage::user(user_content),
            ],
            chunk_text,
        }
    }

    /// Issue one request attempt and classify the outcome.
    async fn send(&self, request: &ReviewRequest) -> Result<Vec<Suggestion>, ClientError> {
        let url = format!(
            "{}{REVIEW_PATH}",
            self.config.base_url.trim_end_matches('/')
        );
        let response = self
            .http
            .post(&url)
            .timeout(self.config.request_timeout)
            .bearer_auth(&self.config.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            let body = response.text().await?;
            return parse_suggestions(&body);
        }

        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_retry_after);
        let body = response.text().await.unwrap_or_default();
        let message = api_error_message(&body, status.as_u16());

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ClientError::RateLimited {
                retry_after,
                message,
            });
        }
        Err(ClientError::Api {
            status: status.as_u16(),
            message,
            retryable: status.is_server_error(),
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
