//! Bounded retry with exponential backoff.
//!
//! A `RetryPolicy` owns the attempt budget and the delay schedule. Providers
//! wrap each HTTP exchange in `RetryPolicy::run`; only errors for which
//! `FetchError::is_retryable` holds are attempted again.

use super::provider::FetchError;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

/// Delay schedule between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Backoff {
    /// Delay before the first retry.
    pub base: Duration,
    /// Multiplier applied for each further retry.
    pub factor: f64,
    /// Upper bound on any single delay.
    pub max: Duration,
    /// Spread each delay uniformly over +/- 50%.
    pub jitter: bool,
}

impl Default for Backoff {
    /// 3s, 6s, 12s ... capped at 30s.
    fn default() -> Self {
        Self {
            base: Duration::from_secs(3),
            factor: 2.0,
            max: Duration::from_secs(30),
            jitter: true,
        }
    }
}

impl Backoff {
    /// Delay before retry number `retry` (0-based).
    pub fn delay(&self, retry: u32) -> Duration {
        let seconds = self.base.as_secs_f64() * self.factor.powi(retry as i32);
        let capped = seconds.min(self.max.as_secs_f64()).max(0.0);
        let delay = Duration::from_secs_f64(capped);

        if !self.jitter {
            return delay;
        }
        let half = delay.as_millis() as u64 / 2;
        let offset = fastrand::u64(0..=half * 2);
        Duration::from_millis(delay.as_millis() as u64 - half + offset)
    }
}

/// Attempt budget plus backoff schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts including the first one. Always at least 1.
    pub max_attempts: u32,
    pub backoff: Backoff,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            backoff: Backoff::default(),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff: Backoff) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    /// A single attempt, never retried.
    pub fn no_retry() -> Self {
        Self::new(1, Backoff::default())
    }

    /// Delay to wait after `error` before retry number `retry`.
    ///
    /// A provider-supplied `Retry-After` wins over the schedule when longer,
    /// but never exceeds `backoff.max`.
    pub fn delay_for(&self, retry: u32, error: &FetchError) -> Duration {
        let scheduled = self.backoff.delay(retry);
        match error {
            FetchError::RateLimited {
                retry_after: Some(after),
            } => scheduled.max((*after).min(self.backoff.max)),
            _ => scheduled,
        }
    }

    /// Run `op` until it succeeds, fails with a non-retryable error, or the
    /// attempt budget is spent. `op` receives the 0-based attempt number.
    pub fn run<T>(&self, op: impl FnMut(u32) -> Result<T, FetchError>) -> Result<T, FetchError> {
        self.run_with_sleep(op, std::thread::sleep)
    }

    /// Same as `run`, with the sleep function injected.
    pub fn run_with_sleep<T>(
        &self,
        mut op: impl FnMut(u32) -> Result<T, FetchError>,
        mut sleep: impl FnMut(Duration),
    ) -> Result<T, FetchError> {
        let attempts = self.max_attempts.max(1);
        let mut attempt = 0;
        loop {
            match op(attempt) {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt + 1 < attempts => {
                    let delay = self.delay_for(attempt, &e);
                    warn!(
                        attempt = attempt + 1,
                        max_attempts = attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "retrying provider request"
                    );
                    sleep(delay);
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
