//! Bounded retry with exponential backoff
//!
//! Wraps an async operation and re-runs it while it fails with a retryable
//! error. The wait before attempt `k + 1` is `delay * backoff_factor^(k - 1)`;
//! there is no wait before the first attempt and none after the last.
//!
//! Operations passed here may execute more than once and must be safe to
//! repeat.

use crate::error::{RecapitanError, Result};
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Errors the retry policy can classify
pub trait Retryable {
    /// Whether the failed operation may be attempted again
    fn is_retryable(&self) -> bool;
}

impl Retryable for RecapitanError {
    fn is_retryable(&self) -> bool {
        RecapitanError::is_retryable(self)
    }
}

/// Retry policy parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryOptions {
    max_attempts: u32,
    delay: Duration,
    backoff_factor: f64,
}

impl RetryOptions {
    /// Create retry options, rejecting zero attempts and factors below 1
    pub fn new(max_attempts: u32, delay: Duration, backoff_factor: f64) -> Result<Self> {
        if max_attempts == 0 {
            return Err(RecapitanError::Configuration(
                "max_attempts must be at least 1".to_string(),
            ));
        }
        if !backoff_factor.is_finite() || backoff_factor < 1.0 {
            return Err(RecapitanError::Configuration(format!(
                "backoff_factor must be >= 1, got {}",
                backoff_factor
            )));
        }

        Ok(Self {
            max_attempts,
            delay,
            backoff_factor,
        })
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Wait applied after failed attempt `attempt` (1-based)
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let secs = self.delay.as_secs_f64() * self.backoff_factor.powi(exponent);
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
    }
}

impl Default for RetryOptions {
    /// 3 attempts, 1s initial delay, doubling
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_millis(1000),
            backoff_factor: 2.0,
        }
    }
}

/// Run `operation` under the retry policy.
///
/// Non-retryable errors are returned immediately. When all attempts are
/// exhausted the last error is returned unmodified.
pub async fn retry<T, E, F, Fut>(mut operation: F, options: &RetryOptions) -> std::result::Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, E>>,
    E: Retryable + Display,
{
    let mut attempt = 1;

    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!("Operation succeeded on attempt {}", attempt);
                }
                return Ok(value);
            }
            Err(e) => {
                if !e.is_retryable() {
                    debug!("Non-retryable failure on attempt {}: {}", attempt, e);
                    return Err(e);
                }

                if attempt >= options.max_attempts {
                    warn!(
                        "Giving up after {} attempts: {}",
                        options.max_attempts, e
                    );
                    return Err(e);
                }

                let backoff = options.delay_after(attempt);
                warn!(
                    "Attempt {}/{} failed, retrying after {}ms: {}",
                    attempt,
                    options.max_attempts,
                    backoff.as_millis(),
                    e
                );

                sleep(backoff).await;
                attempt += 1;
            }
        }
    }
}
