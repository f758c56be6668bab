// ============================================================================
// ROCKET PARTS PLATFORM - RETRY POLICY
// ============================================================================
// Module: shared/src/retry.rs
// Description: Composable bounded-retry policy shared by the inventory
//              client, payment client, and event publisher, so the saga
//              does not hand-roll a retry loop per call site.
// ============================================================================

use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::Error;

/// Linear back-off policy: attempt `n` waits `interval * n` before retrying.
/// Mirrors the teacher's `GrpcRetry::execute_with_retry`, generalized so the
/// same policy drives gRPC calls and event-bus publishes.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            interval,
        }
    }

    /// Policy for the payment leg of the saga: 3 attempts, 1s/2s back-off.
    pub fn saga_payment() -> Self {
        Self::new(3, Duration::from_secs(1))
    }

    /// Policy for event-bus publication retries.
    pub fn event_publish() -> Self {
        Self::new(3, Duration::from_millis(500))
    }

    /// Run `f` until it succeeds, a non-retryable error is returned, or
    /// attempts are exhausted. On the final attempt a retryable error is
    /// returned as-is (callers map it to `timeout`/`external_dependency`
    /// at their own boundary per spec.md §4.6).
    pub async fn run<F, Fut, T>(&self, operation: &str, mut f: F) -> Result<T, Error>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, Error>>,
    {
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match f().await {
                Ok(value) => return Ok(value),
                Err(err) if !err.is_retryable() => {
                    debug!(operation, attempt, "non-retryable error, stopping");
                    return Err(err);
                }
                Err(err) if attempt >= self.max_attempts => {
                    warn!(operation, attempt, %err, "retries exhausted");
                    return Err(err);
                }
                Err(err) => {
                    let delay = self.interval * attempt;
                    warn!(
                        operation,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        %err,
                        "retrying after transient error"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn stops_immediately_on_non_retryable_error() {
        let policy = RetryPolicy::new(3, Duration::from_millis(1));
        let calls = AtomicU32::new(0);

        let result: Result<(), Error> = policy
            .run("test", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(Error::Validation("bad input".into())) }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_transient_errors_up_to_max_attempts() {
        let policy = RetryPolicy::new(3, Duration::from_millis(1));
        let calls = AtomicU32::new(0);

        let result: Result<(), Error> = policy
            .run("test", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async {
                    Err(Error::ExternalDependency {
                        service: "inventory".into(),
                        source: "unavailable".into(),
                    })
                }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn succeeds_after_transient_failures() {
        let policy = RetryPolicy::new(3, Duration::from_millis(1));
        let calls = AtomicU32::new(0);

        let result = policy
            .run("test", || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 2 {
                        Err(Error::Timeout {
                            operation: "process_payment".into(),
                        })
                    } else {
                        Ok(42)
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
