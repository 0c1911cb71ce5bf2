//! Retry logic with exponential backoff
//!
//! Content platforms throttle automated access, so item transfers are retried
//! when (and only when) the failure looks like rate limiting. The wait before
//! attempt `n` (0-based) is `initial_delay * backoff_multiplier^n`, which with
//! the defaults gives 15s before the second attempt and 45s before the third.
//!
//! # Example
//!
//! ```no_run
//! use profile_dl::retry::{IsRetryable, retry_with_backoff};
//! use profile_dl::config::RetryConfig;
//!
//! #[derive(Debug)]
//! enum MyError {
//!     Throttled,
//!     Gone,
//! }
//!
//! impl IsRetryable for MyError {
//!     fn is_retryable(&self) -> bool {
//!         matches!(self, MyError::Throttled)
//!     }
//! }
//!
//! # impl std::fmt::Display for MyError {
//! #     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
//! #         write!(f, "{:?}", self)
//! #     }
//! # }
//! # async fn example() {
//! let config = RetryConfig::default();
//! let result = retry_with_backoff(
//!     &config,
//!     |notice| println!("retrying in {:?}", notice.delay),
//!     || async { Ok::<_, MyError>(()) },
//! )
//! .await;
//! # let _ = result;
//! # }
//! ```

use crate::config::RetryConfig;
use crate::error::ExtractorError;
use rand::Rng;
use regex::Regex;
use std::future::Future;
use std::sync::LazyLock;
use std::time::Duration;
use thiserror::Error as ThisError;

/// Substrings (lowercase) that mark an extractor failure as rate limiting
const RATE_LIMIT_MARKERS: &[&str] = &["rate", "limit", "try again later", "too many requests"];

/// HTTP 429 as a standalone token, so numeric item ids containing "429" don't match
static HTTP_429: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"\b429\b").expect("valid status pattern")
});

/// Trait for errors that can be classified as retryable or not
///
/// Rate-limit responses should return `true`. Everything else (missing
/// content, private videos, malformed URLs) should return `false`.
pub trait IsRetryable {
    /// Returns true if the error is transient and the operation should be retried
    fn is_retryable(&self) -> bool;
}

/// Whether an extractor message describes a rate-limit response
pub fn is_rate_limited(message: &str) -> bool {
    let lower = message.to_lowercase();
    RATE_LIMIT_MARKERS.iter().any(|marker| lower.contains(marker)) || HTTP_429.is_match(&lower)
}

impl IsRetryable for ExtractorError {
    fn is_retryable(&self) -> bool {
        match self {
            ExtractorError::Failed(msg) => is_rate_limited(msg),
            // Aborts come from cancellation, never retry them
            ExtractorError::Aborted => false,
            ExtractorError::Spawn(_) => false,
            ExtractorError::InvalidOutput(_) => false,
            ExtractorError::NotSupported(_) => false,
        }
    }
}

/// Announcement of an upcoming retry, passed to the `on_retry` callback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryNotice {
    /// 1-based number of the attempt about to run
    pub attempt: u32,
    /// Total attempts allowed
    pub max_attempts: u32,
    /// Wait before the attempt
    pub delay: Duration,
}

/// Why [`retry_with_backoff`] gave up
#[derive(Debug, ThisError)]
pub enum RetryError<E> {
    /// The operation failed with an error that is not worth retrying
    #[error("{0}")]
    Permanent(E),

    /// Every attempt failed with a retryable error
    #[error("gave up after {attempts} attempts: {last}")]
    Exhausted {
        /// Attempts made
        attempts: u32,
        /// Error from the final attempt
        last: E,
    },
}

impl<E> RetryError<E> {
    /// The underlying error, regardless of why retrying stopped
    pub fn into_inner(self) -> E {
        match self {
            RetryError::Permanent(e) => e,
            RetryError::Exhausted { last, .. } => last,
        }
    }
}

/// Delay before 0-based attempt `attempt`, capped at `max_delay`
pub fn backoff_delay(config: &RetryConfig, attempt: u32) -> Duration {
    let factor = config.backoff_multiplier.powi(attempt as i32);
    let secs = config.initial_delay.as_secs_f64() * factor;
    if !secs.is_finite() || secs >= config.max_delay.as_secs_f64() {
        return config.max_delay;
    }
    Duration::from_secs_f64(secs)
}

/// Execute an async operation with exponential backoff retry logic
///
/// The operation runs at most `config.max_attempts` times (at least once).
/// Before every attempt after the first, `on_retry` is called with the
/// upcoming attempt number and wait, then the task sleeps. Sleeps are not
/// interrupted by cancellation; callers check their own checkpoints.
pub async fn retry_with_backoff<F, Fut, T, E, N>(
    config: &RetryConfig,
    mut on_retry: N,
    mut operation: F,
) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: IsRetryable + std::fmt::Display,
    N: FnMut(RetryNotice),
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        if attempt > 0 {
            let delay = backoff_delay(config, attempt);
            let delay = if config.jitter {
                add_jitter(delay)
            } else {
                delay
            };

            on_retry(RetryNotice {
                attempt: attempt + 1,
                max_attempts,
                delay,
            });
            tokio::time::sleep(delay).await;
        }

        match operation().await {
            Ok(result) => {
                if attempt > 0 {
                    tracing::info!(attempts = attempt + 1, "Operation succeeded after retry");
                }
                return Ok(result);
            }
            Err(e) if e.is_retryable() && attempt + 1 < max_attempts => {
                tracing::warn!(
                    error = %e,
                    attempt = attempt + 1,
                    max_attempts,
                    "Rate limit detected, will retry"
                );
                attempt += 1;
            }
            Err(e) if e.is_retryable() => {
                tracing::error!(
                    error = %e,
                    attempts = attempt + 1,
                    "Operation failed after all retry attempts exhausted"
                );
                return Err(RetryError::Exhausted {
                    attempts: attempt + 1,
                    last: e,
                });
            }
            Err(e) => {
                tracing::debug!(error = %e, "Operation failed with non-retryable error");
                return Err(RetryError::Permanent(e));
            }
        }
    }
}

/// Add random jitter to a delay
///
/// Jitter is uniformly distributed between 0% and 100% of the delay, so the
/// result lies between `delay` and `2 * delay`.
fn add_jitter(delay: Duration) -> Duration {
    let mut rng = rand::thread_rng();
    let jitter_factor: f64 = rng.gen_range(0.0..=1.0);
    Duration::from_secs_f64(delay.as_secs_f64() * (1.0 + jitter_factor))
}
