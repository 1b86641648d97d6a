//! Bounded retry with exponential backoff.

use std::future::Future;
use std::time::Duration;

use motionprobe_common::InferenceConfig;
use tracing::warn;

use crate::error::{InferenceError, InferenceResult};

/// How many times to retry and how long to wait between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry; doubles each attempt.
    pub base_delay: Duration,
    /// Cap on any single wait. Sleeping happens outside the per-attempt
    /// timeout, so this bounds how long a retry can stall a clip.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &InferenceConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            base_delay: Duration::from_millis(config.retry_base_delay_ms),
            max_delay: Duration::from_millis(config.retry_max_delay_ms),
        }
    }

    /// Wait before retry number `attempt + 1`. A backend-supplied
    /// Retry-After takes precedence over the computed backoff; both are
    /// capped at `max_delay`.
    pub fn delay_for(&self, attempt: u32, error: &InferenceError) -> Duration {
        let delay = match error {
            InferenceError::RateLimited {
                retry_after: Some(retry_after),
            } => *retry_after,
            _ => self.base_delay.saturating_mul(2u32.saturating_pow(attempt)),
        };
        delay.min(self.max_delay)
    }
}

/// Run `operation` until it succeeds, fails with a non-retryable error, or
/// the retry budget is spent. Returns the last error on exhaustion.
pub async fn with_retry<F, Fut, T>(policy: &RetryPolicy, mut operation: F) -> InferenceResult<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = InferenceResult<T>>,
{
    let mut attempt = 0;
    loop {
        match operation(attempt).await {
            Ok(result) => return Ok(result),
            Err(e) if e.is_retryable() && attempt < policy.max_retries => {
                let delay = policy.delay_for(attempt, &e);
                warn!(
                    "Inference request failed (attempt {}), retrying in {:?}: {}",
                    attempt + 1,
                    delay,
                    e
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
