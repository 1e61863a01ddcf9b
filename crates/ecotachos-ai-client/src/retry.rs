//! Fixed-attempt retry with linear backoff.
//!
//! The delay before attempt `n + 1` is `step * n`. There is no jitter
//! and no cancellation; a caller that needs to abandon the loop drops
//! the future.

use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Configuration for retry behavior.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first.
    pub max_attempts: u32,
    /// Delay unit; multiplied by the number of failed attempts so far.
    pub step: Duration,
    /// Operation name for logging.
    pub operation_name: String,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            step: Duration::from_millis(2000),
            operation_name: "operation".to_string(),
        }
    }
}

impl RetryPolicy {
    /// Create a new retry policy with the given operation name.
    pub fn new(operation_name: impl Into<String>) -> Self {
        Self {
            operation_name: operation_name.into(),
            ..Default::default()
        }
    }

    /// Create policy from environment variables.
    pub fn from_env(operation_name: impl Into<String>) -> Self {
        let defaults = Self::default();
        Self {
            max_attempts: std::env::var("RETRY_MAX_ATTEMPTS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_attempts),
            step: std::env::var("RETRY_STEP_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.step),
            operation_name: operation_name.into(),
        }
    }

    /// Set the total number of attempts.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Set the delay unit.
    pub fn with_step(mut self, step: Duration) -> Self {
        self.step = step;
        self
    }

    /// Delay after `failed` consecutive failures.
    pub fn delay_for_attempt(&self, failed: u32) -> Duration {
        self.step.saturating_mul(failed)
    }
}

/// Run `operation` until it succeeds or `max_attempts` is reached.
///
/// Failures before the final one are logged and dropped; on exhaustion the
/// last error is returned. A policy with zero attempts still runs once.
///
/// # Example
/// ```ignore
/// let policy = RetryPolicy::new("ai_detect").with_max_attempts(3);
/// let body = retry_linear(&policy, || client.detect_raw(&input)).await?;
/// ```
pub async fn retry_linear<F, Fut, T, E>(policy: &RetryPolicy, operation: F) -> Result<T, E>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1u32;

    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!(
                        "{} succeeded on attempt {}/{}",
                        policy.operation_name, attempt, max_attempts
                    );
                }
                return Ok(value);
            }
            Err(e) if attempt < max_attempts => {
                let delay = policy.delay_for_attempt(attempt);
                warn!(
                    "{} attempt {}/{} failed, retrying in {:?}: {}",
                    policy.operation_name, attempt, max_attempts, delay, e
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => {
                warn!(
                    "{} failed after {} attempts: {}",
                    policy.operation_name, attempt, e
                );
                return Err(e);
            }
        }
    }
}
