//! Sliding-window rate limiter — at most N request admissions per trailing
//! 60-second interval.
//!
//! One limiter is shared by every chunk call in the process (and across
//! documents); it is the single source of truth for admission. The
//! check-and-record step runs under one lock so two callers can never both
//! observe the same free slot. Timestamps self-expire out of the window;
//! the limiter never needs a reset.

use std::collections::VecDeque;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use redline_core::ConfigError;

use crate::error::ClientError;

/// Length of the trailing admission window.
const RATE_WINDOW: Duration = Duration::from_secs(60);

/// Sliding-window admission control for model requests.
///
/// Share via `Arc`; [`acquire`](Self::acquire) is safe to call from any
/// number of concurrent tasks.
#[derive(Debug)]
pub struct SlidingWindowLimiter {
    capacity: usize,
    window: Duration,
    timestamps: Mutex<VecDeque<Instant>>,
}

/// Outcome of a single atomic admission check.
enum Admission {
    /// Slot taken; the caller's timestamp is recorded.
    Admitted,
    /// Window full; retry once the returned deadline passes.
    FullUntil(Instant),
}

impl SlidingWindowLimiter {
    /// Create a limiter admitting `requests_per_minute` requests per
    /// trailing 60-second window.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidRequestRate`] when the rate is zero.
    pub fn new(requests_per_minute: u32) -> Result<Self, ConfigError> {
        Self::with_window(requests_per_minute, RATE_WINDOW)
    }

    /// Create a limiter with an explicit window length (test seam).
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidRequestRate`] when the rate is zero.
    pub fn with_window(capacity: u32, window: Duration) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::InvalidRequestRate(capacity));
        }
        Ok(Self {
            capacity: capacity as usize,
            window,
            timestamps: Mutex::new(VecDeque::new()),
        })
    }

    /// Wait for an admission slot, recording this request's timestamp.
    ///
    /// Suspends until the oldest recorded timestamp leaves the trailing
    /// window. Observes `cancel` while waiting.
    ///
    /// # Errors
    ///
    /// [`ClientError::Cancelled`] when the token fires before a slot frees.
    pub async fn acquire(&self, cancel: &CancellationToken) -> Result<(), ClientError> {
        loop {
            match self.try_admit() {
                Admission::Admitted => return Ok(()),
                Admission::FullUntil(deadline) => {
                    tokio::select! {
                        () = tokio::time::sleep_until(deadline) => {}
                        () = cancel.cancelled() => return Err(ClientError::Cancelled),
                    }
                }
            }
        }
    }

    /// Atomic check-and-record: prune expired timestamps, then either take a
    /// slot or report when the next one frees.
    fn try_admit(&self) -> Admission {
        let mut stamps = self.timestamps.lock();
        let now = Instant::now();
        while stamps
            .front()
            .is_some_and(|&t| now.duration_since(t) >= self.window)
        {
            let _ = stamps.pop_front();
        }
        match stamps.front().copied() {
            Some(oldest) if stamps.len() >= self.capacity => {
                Admission::FullUntil(oldest + self.window)
            }
            _ => {
                stamps.push_back(now);
                Admission::Admitted
            }
        }
    }

    /// Number of admissions currently inside the trailing window.
    #[must_use]
    pub fn recorded_in_window(&self) -> usize {
        let mut stamps = self.timestamps.lock();
        let now = Instant::now();
        while stamps
            .front()
            .is_some_and(|&t| now.duration_since(t) >= self.window)
        {
            let _ = stamps.pop_front();
        }
        stamps.len()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
