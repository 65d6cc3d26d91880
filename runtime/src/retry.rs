//! Retry with exponential backoff for transient failures.
//!
//! Used by data sources whose operations can fail for reasons that go away on
//! their own (connection resets, 5xx responses). The default policy makes a
//! single attempt, so callers opt in to retrying.
//!
//! # Example
//!
//! ```rust
//! use todolist_runtime::retry::{RetryPolicy, retry_if};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), String> {
//! let policy = RetryPolicy::attempts(3).with_initial_delay(Duration::from_millis(50));
//!
//! let value = retry_if(
//!     &policy,
//!     || async { Ok::<_, String>(42) },
//!     |err: &String| err.contains("transient"),
//! )
//! .await?;
//! assert_eq!(value, 42);
//! # Ok(())
//! # }
//! ```

use rand::Rng;
use std::time::Duration;
use tokio::time::sleep;

/// Retry policy with capped exponential backoff and jitter.
///
/// # Default Values
///
/// - `max_attempts`: 1 (no retry)
/// - `initial_delay`: 200ms
/// - `max_delay`: 5 seconds
/// - `multiplier`: 2.0
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    max_attempts: u32,
    initial_delay: Duration,
    max_delay: Duration,
    multiplier: f64,
}

impl RetryPolicy {
    /// Policy that makes exactly one attempt
    #[must_use]
    pub const fn once() -> Self {
        Self::attempts(1)
    }

    /// Policy that makes up to `max_attempts` attempts (clamped to at least one)
    #[must_use]
    pub const fn attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: if max_attempts == 0 { 1 } else { max_attempts },
            initial_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(5),
            multiplier: 2.0,
        }
    }

    /// Set initial delay before the first retry
    #[must_use]
    pub const fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Set maximum delay between retries
    #[must_use]
    pub const fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Set backoff multiplier
    #[must_use]
    pub const fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    /// Maximum number of attempts, including the first
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Longest delay between two attempts
    #[must_use]
    pub const fn max_delay(&self) -> Duration {
        self.max_delay
    }

    /// Whether attempt number `attempt` (1-based) may run
    #[must_use]
    pub const fn allows(&self, attempt: u32) -> bool {
        attempt <= self.max_attempts
    }

    /// Delay after failed attempt `attempt` (0-indexed), before jitter
    ///
    /// `initial_delay * multiplier^attempt`, capped at `max_delay`.
    #[must_use]
    pub fn base_delay(&self, attempt: u32) -> Duration {
        #[allow(
            clippy::cast_possible_wrap,
            clippy::cast_precision_loss,
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss
        )] // attempt counts and delays stay small
        let millis = (self.initial_delay.as_millis() as f64
            * self.multiplier.powi(attempt as i32))
        .round() as u64;
        Duration::from_millis(millis).min(self.max_delay)
    }

    /// Delay with jitter in `[0.5, 1.0] * base_delay`
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let jitter = rand::thread_rng().gen_range(0.5..=1.0);
        self.base_delay(attempt).mul_f64(jitter)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::once()
    }
}

/// Run `operation` until it succeeds, the error is not retryable, or the
/// policy's attempts are used up. Returns the last error on failure.
///
/// # Errors
///
/// Returns the error of the final attempt.
pub async fn retry_if<F, Fut, T, E, P>(
    policy: &RetryPolicy,
    mut operation: F,
    is_retryable: P,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    E: std::fmt::Display,
    P: Fn(&E) -> bool,
{
    let mut attempt: u32 = 1;

    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    metrics::counter!("retry.success").increment(1);
                    tracing::info!(attempt, "Operation succeeded after retry");
                }
                return Ok(value);
            },
            Err(err) => {
                if !is_retryable(&err) {
                    tracing::debug!(error = %err, "Error is not retryable");
                    return Err(err);
                }

                if !policy.allows(attempt + 1) {
                    if policy.max_attempts() > 1 {
                        metrics::counter!("retry.exhausted").increment(1);
                        tracing::warn!(attempt, error = %err, "Retries exhausted");
                    }
                    return Err(err);
                }

                let delay = policy.delay_for_attempt(attempt - 1);
                metrics::counter!("retry.attempt").increment(1);
                tracing::warn!(
                    attempt,
                    delay_ms = delay.as_millis(),
                    error = %err,
                    "Operation failed, retrying"
                );

                sleep(delay).await;
                attempt += 1;
            },
        }
    }
}
