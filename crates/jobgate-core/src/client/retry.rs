//! Retry policy: bounded attempts with exponential backoff.

use std::future::Future;
use std::time::Duration;

use tracing::info;

use crate::domain::UpstreamError;

/// Upper bound of one backoff wait, whatever the policy grows to.
pub const MAX_DELAY: Duration = Duration::from_secs(60 * 60);

/// Retry policy applied to every upstream call.
///
/// The policy is a plain value: clients own a copy and apply it around each raw
/// call, so business logic never sees a retry loop.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one. Values below 1 are treated as 1.
    pub max_attempts: u32,

    /// Delay before the second attempt.
    pub base_delay: Duration,

    /// Backoff multiplier for exponential backoff.
    pub multiplier: f64,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration, multiplier: f64) -> Self {
        Self {
            max_attempts,
            base_delay,
            multiplier,
        }
    }

    /// No waiting between attempts. Meant for tests and local tooling.
    pub fn immediate(max_attempts: u32) -> Self {
        Self::new(max_attempts, Duration::ZERO, 1.0)
    }

    /// Calculate the delay after a failed attempt.
    ///
    /// # Arguments
    /// * `attempts` - Number of attempts already made (1-indexed).
    ///
    /// delay = base_delay * multiplier^(attempts - 1)
    ///
    /// With base_delay=1s, multiplier=2.0:
    /// - after attempt 1: 1s
    /// - after attempt 2: 2s
    /// - after attempt 3: 4s
    ///
    /// The result never exceeds [`MAX_DELAY`]; an overflowing or non-finite
    /// product is clamped to it.
    pub fn next_delay(&self, attempts: u32) -> Duration {
        let exponent = attempts.saturating_sub(1).min(i32::MAX as u32) as i32;
        let base_secs = self.base_delay.as_secs_f64();
        let delay_secs = base_secs * self.multiplier.powi(exponent);
        Duration::try_from_secs_f64(delay_secs)
            .unwrap_or(MAX_DELAY)
            .min(MAX_DELAY)
    }

    /// Run `call` until it succeeds or the attempt budget is spent.
    ///
    /// Returns the last error once exhausted. Waiting happens on the calling
    /// task; nothing is spawned.
    pub async fn run<T, F, Fut>(&self, operation: &str, mut call: F) -> Result<T, UpstreamError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, UpstreamError>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            info!(operation, attempt, "requesting upstream (#{attempt} attempt)");
            match call().await {
                Ok(value) => return Ok(value),
                Err(e) if attempt < max_attempts && e.is_retryable() => {
                    let delay = self.next_delay(attempt);
                    info!(operation, attempt, error = %e, ?delay, "upstream attempt failed, retrying");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            multiplier: 2.0,
        }
    }
}
