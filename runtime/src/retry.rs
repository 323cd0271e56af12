//! Fixed-delay retry for transient failures.
//!
//! Callback delivery is retried a fixed number of times with a constant pause
//! between attempts. There is no jitter and no exponential growth. The pause is
//! taken through an injected [`Sleeper`] so tests run without wall-clock delay.
//!
//! # Example
//!
//! ```rust
//! use custom_resource_runtime::retry::{RetryPolicy, retry_with_fixed_delay};
//! use custom_resource_runtime::transport::TokioSleeper;
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), String> {
//! let policy = RetryPolicy::builder()
//!     .attempts(3)
//!     .delay(Duration::from_millis(10))
//!     .build();
//!
//! let result = retry_with_fixed_delay(&policy, &TokioSleeper, || async {
//!     Ok::<_, String>(42)
//! })
//! .await?;
//!
//! assert_eq!(result, 42);
//! # Ok(())
//! # }
//! ```

use custom_resource_core::config::{DEFAULT_DELIVERY_ATTEMPTS, DEFAULT_DELIVERY_DELAY};
use custom_resource_core::environment::Sleeper;
use std::future::Future;
use std::time::Duration;

/// Retry policy: fixed attempt count, fixed delay.
///
/// # Default Values
///
/// - `attempts`: 5 (including the first)
/// - `delay`: 1000ms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Zero is treated as one.
    pub attempts: u32,
    /// Pause between consecutive attempts
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_DELIVERY_ATTEMPTS,
            delay: DEFAULT_DELIVERY_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Create a policy.
    #[must_use]
    pub const fn new(attempts: u32, delay: Duration) -> Self {
        Self { attempts, delay }
    }

    /// Create a new policy builder.
    #[must_use]
    pub const fn builder() -> RetryPolicyBuilder {
        RetryPolicyBuilder {
            attempts: None,
            delay: None,
        }
    }

    /// Attempts actually made before giving up.
    #[must_use]
    pub const fn effective_attempts(&self) -> u32 {
        if self.attempts == 0 { 1 } else { self.attempts }
    }

    /// Total time spent sleeping when every attempt fails.
    #[must_use]
    pub fn worst_case_delay(&self) -> Duration {
        self.delay * (self.effective_attempts() - 1)
    }
}

/// Builder for [`RetryPolicy`].
#[derive(Debug, Clone)]
pub struct RetryPolicyBuilder {
    attempts: Option<u32>,
    delay: Option<Duration>,
}

impl RetryPolicyBuilder {
    /// Set total attempts, including the first.
    #[must_use]
    pub const fn attempts(mut self, attempts: u32) -> Self {
        self.attempts = Some(attempts);
        self
    }

    /// Set delay between attempts.
    #[must_use]
    pub const fn delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Build the [`RetryPolicy`].
    #[must_use]
    pub fn build(self) -> RetryPolicy {
        RetryPolicy {
            attempts: self.attempts.unwrap_or(DEFAULT_DELIVERY_ATTEMPTS),
            delay: self.delay.unwrap_or(DEFAULT_DELIVERY_DELAY),
        }
    }
}

/// Retry an async operation with a fixed delay between attempts.
///
/// # Arguments
///
/// * `policy` - Attempt count and delay
/// * `sleeper` - Used for the pause between attempts
/// * `operation` - Async operation to retry (must be `FnMut` to allow multiple calls)
///
/// # Returns
///
/// Returns `Ok(T)` as soon as an attempt succeeds, or `Err(E)` with the error
/// of the final attempt once all attempts are used. No pause follows the final
/// attempt.
///
/// # Errors
///
/// Returns the last error produced by `operation` when every attempt fails.
pub async fn retry_with_fixed_delay<S, F, Fut, T, E>(
    policy: &RetryPolicy,
    sleeper: &S,
    mut operation: F,
) -> Result<T, E>
where
    S: Sleeper + ?Sized,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let attempts = policy.effective_attempts();
    let mut attempt = 1;

    loop {
        match operation().await {
            Ok(result) => {
                if attempt > 1 {
                    tracing::info!(attempt, "Operation succeeded after retry");
                }
                return Ok(result);
            }
            Err(err) => {
                if attempt >= attempts {
                    tracing::error!(
                        attempt,
                        error = %err,
                        "Operation failed after max attempts"
                    );
                    return Err(err);
                }

                tracing::warn!(
                    attempt,
                    delay_ms = policy.delay.as_millis(),
                    error = %err,
                    "Operation failed, retrying..."
                );

                sleeper.sleep(policy.delay).await;
                attempt += 1;
            }
        }
    }
}
