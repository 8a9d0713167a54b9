//! Bounded retry with exponential backoff for remote calls.

use crate::error::Result;
use std::future::Future;
use std::time::Duration;

/// Retry schedule: up to `max_attempts` total attempts, exponential
/// backoff between them (base delay doubled per attempt, capped).
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration, max_delay: Duration) -> Self {
        RetryPolicy {
            max_attempts,
            base_delay,
            max_delay,
        }
    }

    /// Delay to sleep after the given 1-based attempt: 1s, 2s, 4s, ... capped.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        let delay = self.base_delay.saturating_mul(1u32 << exponent);
        delay.min(self.max_delay)
    }
}

/// Invokes `call` until it succeeds, the error is permanent, or the
/// attempt budget is exhausted. The last error propagates unchanged.
///
/// Only errors classified retryable by [`crate::VertexError::is_retryable`]
/// trigger another attempt; permanent failures return immediately.
pub async fn retry_with_backoff<T, F, Fut>(
    policy: &RetryPolicy,
    operation: &str,
    mut call: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 1u32;
    loop {
        match call().await {
            Ok(value) => {
                if attempt > 1 {
                    log::info!("{}: succeeded on attempt {}", operation, attempt);
                }
                return Ok(value);
            }
            Err(e) if attempt < policy.max_attempts && e.is_retryable() => {
                let delay = policy.backoff(attempt);
                log::warn!(
                    "{}: attempt {}/{} failed: {}. Retrying in {:?}",
                    operation,
                    attempt,
                    policy.max_attempts,
                    e,
                    delay
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => {
                log::error!(
                    "{}: attempt {}/{} failed: {}",
                    operation,
                    attempt,
                    policy.max_attempts,
                    e
                );
                return Err(e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VertexError;
    use std::cell::Cell;

    fn transient() -> VertexError {
        VertexError::ApiError {
            status: 503,
            message: "service unavailable".into(),
        }
    }

    #[test]
    fn test_backoff_schedule() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff(1), Duration::from_secs(1));
        assert_eq!(policy.backoff(2), Duration::from_secs(2));
        assert_eq!(policy.backoff(3), Duration::from_secs(4));
        assert_eq!(policy.backoff(4), Duration::from_secs(8));
        // Capped at the maximum from here on.
        assert_eq!(policy.backoff(5), Duration::from_secs(10));
        assert_eq!(policy.backoff(10), Duration::from_secs(10));

        let custom = RetryPolicy::new(5, Duration::from_millis(100), Duration::from_secs(1));
        assert_eq!(custom.backoff(1), Duration::from_millis(100));
        assert_eq!(custom.backoff(4), Duration::from_millis(800));
        assert_eq!(custom.backoff(5), Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_after_transient_failures() {
        let attempts = Cell::new(0u32);
        let result = retry_with_backoff(&RetryPolicy::default(), "test", || {
            attempts.set(attempts.get() + 1);
            let n = attempts.get();
            async move {
                if n < 3 {
                    Err(transient())
                } else {
                    Ok("done")
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(attempts.get(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_propagates_last_error() {
        let attempts = Cell::new(0u32);
        let result: Result<()> = retry_with_backoff(&RetryPolicy::default(), "test", || {
            attempts.set(attempts.get() + 1);
            async {
                Err(VertexError::ApiError {
                    status: 500,
                    message: "internal".into(),
                })
            }
        })
        .await;

        assert_eq!(attempts.get(), 3);
        match result {
            Err(VertexError::ApiError { status, message }) => {
                assert_eq!(status, 500);
                assert_eq!(message, "internal");
            }
            other => panic!("expected ApiError, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_permanent_error_is_not_retried() {
        let attempts = Cell::new(0u32);
        let result: Result<()> = retry_with_backoff(&RetryPolicy::default(), "test", || {
            attempts.set(attempts.get() + 1);
            async { Err(VertexError::AuthError("invalid token".into())) }
        })
        .await;

        assert_eq!(attempts.get(), 1);
        assert!(matches!(result, Err(VertexError::AuthError(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_attempt_success_sleeps_nowhere() {
        let start = tokio::time::Instant::now();
        let result = retry_with_backoff(&RetryPolicy::default(), "test", || async { Ok(42) }).await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }
}
