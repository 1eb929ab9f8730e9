//! Settings types with compiled defaults.

use serde::{Deserialize, Serialize};

use redline_core::ConfigError;

/// Default model identifier.
pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";
/// Default model-service base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.groq.com";
/// Env var holding the model-service API key.
pub const DEFAULT_API_KEY_ENV: &str = "REDLINE_API_KEY";
/// Default request chunk bound in bytes.
pub const DEFAULT_MAX_CHUNK_BYTES: usize = 20_000;
/// Default request budget per trailing minute.
pub const DEFAULT_REQUESTS_PER_MINUTE: u32 = 25;
/// Default maximum attempts per chunk.
pub const DEFAULT_MAX_RETRY_ATTEMPTS: u32 = 5;
/// Default base backoff delay in milliseconds.
pub const DEFAULT_BASE_BACKOFF_MS: u64 = 1000;
/// Default backoff delay cap in milliseconds.
pub const DEFAULT_MAX_BACKOFF_MS: u64 = 60_000;

/// Model service settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelSettings {
    /// Model identifier sent with every request.
    #[serde(default = "default_model")]
    pub name: String,
    /// Base URL of the model service.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Name of the env var the API key is read from.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}
fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}
fn default_api_key_env() -> String {
    DEFAULT_API_KEY_ENV.to_string()
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            name: default_model(),
            base_url: default_base_url(),
            api_key_env: default_api_key_env(),
        }
    }
}

/// Review pipeline settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSettings {
    /// Maximum bytes of paragraph text per model request.
    #[serde(default = "default_max_chunk_bytes")]
    pub max_chunk_bytes: usize,
    /// Request budget per trailing 60-second window.
    #[serde(default = "default_requests_per_minute")]
    pub requests_per_minute: u32,
    /// Optional override for the reviewer system prompt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
}

fn default_max_chunk_bytes() -> usize {
    DEFAULT_MAX_CHUNK_BYTES
}
fn default_requests_per_minute() -> u32 {
    DEFAULT_REQUESTS_PER_MINUTE
}

impl Default for ReviewSettings {
    fn default() -> Self {
        Self {
            max_chunk_bytes: DEFAULT_MAX_CHUNK_BYTES,
            requests_per_minute: DEFAULT_REQUESTS_PER_MINUTE,
            system_prompt: None,
        }
    }
}

/// Retry and backoff settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrySettings {
    /// Maximum attempts per chunk (first try plus retries).
    #[serde(default = "default_max_retry_attempts")]
    pub max_attempts: u32,
    /// Base backoff delay in milliseconds.
    #[serde(default = "default_base_backoff_ms")]
    pub base_delay_ms: u64,
    /// Backoff delay cap in milliseconds.
    #[serde(default = "default_max_backoff_ms")]
    pub max_delay_ms: u64,
}

fn default_max_retry_attempts() -> u32 {
    DEFAULT_MAX_RETRY_ATTEMPTS
}
fn default_base_backoff_ms() -> u64 {
    DEFAULT_BASE_BACKOFF_MS
}
fn default_max_backoff_ms() -> u64 {
    DEFAULT_MAX_BACKOFF_MS
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_RETRY_ATTEMPTS,
            base_delay_ms: DEFAULT_BASE_BACKOFF_MS,
            max_delay_ms: DEFAULT_MAX_BACKOFF_MS,
        }
    }
}

/// Top-level Redline settings.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedlineSettings {
    /// Model service settings.
    #[serde(default)]
    pub model: ModelSettings,
    /// Review pipeline settings.
    #[serde(default)]
    pub review: ReviewSettings,
    /// Retry and backoff settings.
    #[serde(default)]
    pub retry: RetrySettings,
}

impl RedlineSettings {
    /// Check every tunable the core consumes.
    ///
    /// # Errors
    ///
    /// The first [`ConfigError`] found; configuration errors are fatal at
    /// startup and never retried.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.review.max_chunk_bytes == 0 {
            return Err(ConfigError::InvalidChunkSize(self.review.max_chunk_bytes));
        }
        if self.review.requests_per_minute == 0 {
            return Err(ConfigError::InvalidRequestRate(
                self.review.requests_per_minute,
            ));
        }
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::InvalidRetryAttempts(self.retry.max_attempts));
        }
        if self.retry.base_delay_ms == 0
            || self.retry.max_delay_ms == 0
            || self.retry.base_delay_ms > self.retry.max_delay_ms
        {
            return Err(ConfigError::InvalidBackoffDelays {
                base_ms: self.retry.base_delay_ms,
                max_ms: self.retry.max_delay_ms,
            });
        }
        if self.model.name.is_empty() {
            return Err(ConfigError::MissingValue("model.name"));
        }
        if self.model.base_url.is_empty() {
            return Err(ConfigError::MissingValue("model.baseUrl"));
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let settings = RedlineSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.review.max_chunk_bytes, 20_000);
        assert_eq!(settings.review.requests_per_minute, 25);
        assert_eq!(settings.retry.max_attempts, 5);
        assert_eq!(settings.model.api_key_env, "REDLINE_API_KEY");
    }

    #[test]
    fn empty_json_deserializes_to_defaults() {
        let settings: RedlineSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings.model.name, DEFAULT_MODEL);
        assert_eq!(settings.retry.base_delay_ms, 1000);
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let settings: RedlineSettings =
            serde_json::from_str(r#"{"review":{"maxChunkBytes":8000}}"#).unwrap();
        assert_eq!(settings.review.max_chunk_bytes, 8000);
        assert_eq!(settings.review.requests_per_minute, 25);
    }

    #[test]
    fn serde_roundtrip_camel_case() {
        let settings = RedlineSettings::default();
        let json = serde_json::to_value(&settings).unwrap();
        assert!(json["review"].get("maxChunkBytes").is_some());
        assert!(json["retry"].get("baseDelayMs").is_some());
        assert!(json["model"].get("baseUrl").is_some());
    }

    #[test]
    fn zero_chunk_bytes_invalid() {
        let mut settings = RedlineSettings::default();
        settings.review.max_chunk_bytes = 0;
        assert_eq!(
            settings.validate().unwrap_err(),
            ConfigError::InvalidChunkSize(0)
        );
    }

    #[test]
    fn zero_request_rate_invalid() {
        let mut settings = RedlineSettings::default();
        settings.review.requests_per_minute = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn inverted_backoff_delays_invalid() {
        let mut settings = RedlineSettings::default();
        settings.retry.base_delay_ms = 90_000;
        assert!(matches!(
            settings.validate().unwrap_err(),
            ConfigError::InvalidBackoffDelays { .. }
        ));
    }

    #[test]
    fn empty_model_name_invalid() {
        let mut settings = RedlineSettings::default();
        settings.model.name = String::new();
        assert_eq!(
            settings.validate().unwrap_err(),
            ConfigError::MissingValue("model.name")
        );
    }
}
