//! Retry policy — exponential backoff with additive jitter.
//!
//! The delay for retry `attempt` (zero-based) is
//! `min(max_delay, base_delay * 2^attempt) + jitter` with jitter drawn
//! uniformly from `[0, base_delay)`. When the service supplies an explicit
//! `Retry-After`, that duration replaces the computed backoff for the next
//! attempt.

use std::time::Duration;

use redline_core::ConfigError;

/// Default maximum attempts per chunk (first try plus retries).
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
/// Default base backoff delay.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(1000);
/// Default backoff delay cap.
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_millis(60_000);

/// Retry parameters for the model client.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum total attempts per chunk; must be positive.
    pub max_attempts: u32,
    /// Base delay for exponential backoff; also bounds the jitter.
    pub base_delay: Duration,
    /// Cap applied to the exponential term.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Check the tunables.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidRetryAttempts`] when `max_attempts` is zero;
    /// [`ConfigError::InvalidBackoffDelays`] when a delay is zero or the
    /// base exceeds the cap.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_attempts == 0 {
            return Err(ConfigError::InvalidRetryAttempts(self.max_attempts));
        }
        if self.base_delay.is_zero()
            || self.max_delay.is_zero()
            || self.base_delay > self.max_delay
        {
            return Err(ConfigError::InvalidBackoffDelays {
                base_ms: u64::try_from(self.base_delay.as_millis()).unwrap_or(u64::MAX),
                max_ms: u64::try_from(self.max_delay.as_millis()).unwrap_or(u64::MAX),
            });
        }
        Ok(())
    }

    /// Backoff delay before retry number `attempt` (zero-based).
    ///
    /// `jitter` is a random value in `[0.0, 1.0)` supplied by the caller so
    /// tests stay deterministic; it scales the base delay.
    #[must_use]
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn delay_for(&self, attempt: u32, jitter: f64) -> Duration {
        let base_ms = u64::try_from(self.base_delay.as_millis()).unwrap_or(u64::MAX);
        let max_ms = u64::try_from(self.max_delay.as_millis()).unwrap_or(u64::MAX);
        let exponential = base_ms.saturating_mul(1u64 << attempt.min(31));
        let capped = exponential.min(max_ms);
        let jitter_ms = (jitter.clamp(0.0, 1.0) * base_ms as f64) as u64;
        Duration::from_millis(capped.saturating_add(jitter_ms))
    }
}

/// Parse a `Retry-After` header value into a delay.
///
/// Accepts a number of seconds (`"120"`) or an HTTP-date
/// (`"Thu, 01 Dec 2025 16:00:00 GMT"`). A past date yields a zero delay.
#[must_use]
pub fn parse_retry_after(value: &str) -> Option<Duration> {
    if let Ok(seconds) = value.trim().parse::<u64>() {
        return Some(Duration::from_secs(seconds));
    }

    if let Ok(date) = chrono::DateTime::parse_from_rfc2822(value) {
        let delay_ms = date
            .signed_duration_since(chrono::Utc::now())
            .num_milliseconds();
        return Some(Duration::from_millis(delay_ms.max(0).unsigned_abs()));
    }

    None
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn defaults_validate() {
        assert!(RetryPolicy::default().validate().is_ok());
    }

    #[test]
    fn zero_attempts_rejected() {
        let policy = RetryPolicy {
            max_attempts: 0,
            ..Default::default()
        };
        assert_eq!(
            policy.validate().unwrap_err(),
            ConfigError::InvalidRetryAttempts(0)
        );
    }

    #[test]
    fn zero_base_delay_rejected() {
        let policy = RetryPolicy {
            base_delay: Duration::ZERO,
            ..Default::default()
        };
        assert!(policy.validate().is_err());
    }

    #[test]
    fn base_above_max_rejected() {
        let policy = RetryPolicy {
            base_delay: Duration::from_secs(10),
            max_delay: Duration::from_secs(1),
            ..Default::default()
        };
        assert!(policy.validate().is_err());
    }

    #[test]
    fn delay_doubles_per_attempt_without_jitter() {
        let policy = RetryPolicy {
            max_attempts: 5,
            base_delay: Duration::from_millis(1000),
            max_delay: Duration::from_millis(60_000),
        };
        assert_eq!(policy.delay_for(0, 0.0), Duration::from_millis(1000));
        assert_eq!(policy.delay_for(1, 0.0), Duration::from_millis(2000));
        assert_eq!(policy.delay_for(2, 0.0), Duration::from_millis(4000));
        assert_eq!(policy.delay_for(3, 0.0), Duration::from_millis(8000));
    }

    #[test]
    fn delay_caps_at_max() {
        let policy = RetryPolicy {
            max_attempts: 5,
            base_delay: Duration::from_millis(1000),
            max_delay: Duration::from_millis(5000),
        };
        assert_eq!(policy.delay_for(10, 0.0), Duration::from_millis(5000));
    }

    #[test]
    fn jitter_adds_at_most_base_delay() {
        let policy = RetryPolicy {
            max_attempts: 5,
            base_delay: Duration::from_millis(1000),
            max_delay: Duration::from_millis(60_000),
        };
        // jitter is clamped below 1.0 by the caller contract; 0.999 is
        // just under a full extra base delay
        let delay = policy.delay_for(0, 0.999);
        assert!(delay >= Duration::from_millis(1000));
        assert!(delay < Duration::from_millis(2000));
    }

    #[test]
    fn high_attempt_does_not_overflow() {
        let policy = RetryPolicy::default();
        let delay = policy.delay_for(1000, 0.5);
        assert!(delay <= DEFAULT_MAX_DELAY + DEFAULT_BASE_DELAY);
    }

    #[test]
    fn parse_seconds() {
        assert_eq!(parse_retry_after("2"), Some(Duration::from_secs(2)));
        assert_eq!(parse_retry_after("0"), Some(Duration::ZERO));
        assert_eq!(parse_retry_after(" 120 "), Some(Duration::from_secs(120)));
    }

    #[test]
    fn parse_invalid() {
        assert_eq!(parse_retry_after("soon"), None);
        assert_eq!(parse_retry_after(""), None);
        assert_eq!(parse_retry_after("-5"), None);
    }

    #[test]
    fn parse_future_http_date() {
        use chrono::{TimeZone, Utc};
        let future = Utc.with_ymd_and_hms(2099, 1, 1, 0, 0, 0).unwrap().to_rfc2822();
        let delay = parse_retry_after(&future).unwrap();
        assert!(delay > Duration::ZERO);
    }

    #[test]
    fn parse_past_http_date_is_zero() {
        use chrono::{TimeZone, Utc};
        let past = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap().to_rfc2822();
        assert_eq!(parse_retry_after(&past), Some(Duration::ZERO));
    }

    proptest! {
        #[test]
        fn delay_never_exceeds_cap_plus_base(
            attempt in 0u32..64,
            jitter in 0.0f64..1.0,
            base_ms in 1u64..10_000,
            max_ms in 1u64..120_000,
        ) {
            let policy = RetryPolicy {
                max_attempts: 5,
                base_delay: Duration::from_millis(base_ms),
                max_delay: Duration::from_millis(max_ms),
            };
            let delay = policy.delay_for(attempt, jitter);
            prop_assert!(delay <= Duration::from_millis(max_ms + base_ms));
        }

        #[test]
        fn delay_is_monotone_in_attempt_without_jitter(
            attempt in 0u32..30,
            base_ms in 1u64..1000,
        ) {
            let policy = RetryPolicy {
                max_attempts: 5,
                base_delay: Duration::from_millis(base_ms),
                max_delay: Duration::from_millis(1_000_000),
            };
            prop_assert!(policy.delay_for(attempt, 0.0) <= policy.delay_for(attempt + 1, 0.0));
        }
    }
}
