//! Fixed-count retry for network call sites
//!
//! Only errors classified as transient (connection-level failures) are
//! retried. HTTP error statuses are never retried. There is no backoff
//! between attempts.

use std::fmt::Display;
use std::future::Future;

/// Classifies an error as safe to retry
pub trait Retryable {
    fn is_transient(&self) -> bool;
}

/// Retry policy applied explicitly around each network call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
}

impl RetryPolicy {
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

    /// Create a policy allowing `max_attempts` total attempts (at least one)
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
        }
    }

    /// A policy that never retries
    pub fn none() -> Self {
        Self::new(1)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Run `op`, re-invoking it while it fails with a transient error and
    /// attempts remain
    pub async fn run<T, E, F, Fut>(&self, operation: &str, mut op: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Retryable + Display,
    {
        let mut attempt = 1;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(error) if error.is_transient() && attempt < self.max_attempts => {
                    tracing::warn!(
                        operation = %operation,
                        attempt = attempt,
                        max_attempts = self.max_attempts,
                        error = %error,
                        "Transient failure, retrying"
                    );
                    attempt += 1;
                }
                Err(error) => return Err(error),
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_ATTEMPTS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Debug, thiserror::Error)]
    enum FakeError {
        #[error("connection reset")]
        Connection,
        #[error("HTTP 500")]
        Status,
    }

    impl Retryable for FakeError {
        fn is_transient(&self) -> bool {
            matches!(self, FakeError::Connection)
        }
    }

    #[tokio::test]
    async fn test_retries_transient_errors_until_success() {
        let calls = AtomicU32::new(0);
        let result: Result<&str, FakeError> = RetryPolicy::new(3)
            .run("op", || async {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(FakeError::Connection)
                } else {
                    Ok("done")
                }
            })
            .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let calls = AtomicU32::new(0);
        let result: Result<(), FakeError> = RetryPolicy::new(2)
            .run("op", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(FakeError::Connection)
            })
            .await;

        assert!(matches!(result, Err(FakeError::Connection)));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_does_not_retry_non_transient_errors() {
        let calls = AtomicU32::new(0);
        let result: Result<(), FakeError> = RetryPolicy::new(5)
            .run("op", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(FakeError::Status)
            })
            .await;

        assert!(matches!(result, Err(FakeError::Status)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_zero_attempts_clamped_to_one() {
        assert_eq!(RetryPolicy::new(0).max_attempts(), 1);
    }
}
