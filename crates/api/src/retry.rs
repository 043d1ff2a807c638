//! Generic retry executor for fallible async operations.

use std::future::Future;
use std::time::Duration;
use tracing::warn;

use crate::config::RetryConfig;
use crate::error::Result;

/// Invoke `operation` until it succeeds, fails with a non-retryable error,
/// or exhausts `config.max_retries` attempts.
///
/// Between retryable failures the current task sleeps for the jittered
/// exponential backoff from [`RetryConfig::backoff_for_attempt`]. A rate
/// limit that carries an explicit `Retry-After` hint overrides the computed
/// delay; jitter is not applied in that case.
///
/// The executor is not tied to HTTP: any operation returning
/// [`crate::AirtableError`] can be wrapped.
pub async fn with_retry<T, F, Fut>(config: &RetryConfig, mut operation: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 1u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(error) => {
                if !error.is_retryable() || attempt >= config.max_retries {
                    return Err(error);
                }

                let delay = match error.retry_after() {
                    Some(secs) => Duration::from_secs(secs),
                    None => config.backoff_for_attempt(attempt),
                };
                warn!(
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %error,
                    "request failed, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AirtableError;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn quick_config() -> RetryConfig {
        RetryConfig {
            max_retries: 3,
            initial_backoff: Duration::from_millis(10),
            max_backoff: Duration::from_millis(100),
            backoff_multiplier: 2.0,
        }
    }

    fn server_error() -> AirtableError {
        AirtableError::Api {
            status: 500,
            message: "internal".to_string(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_short_circuits() {
        let calls = AtomicU32::new(0);

        let result = with_retry(&quick_config(), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok(42) }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_retryable_error_invokes_once() {
        let calls = AtomicU32::new(0);

        let result: Result<()> = with_retry(&quick_config(), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async {
                Err(AirtableError::Api {
                    status: 404,
                    message: "not found".to_string(),
                })
            }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_transient_failures_until_success() {
        let calls = AtomicU32::new(0);
        let start = tokio::time::Instant::now();

        let result = with_retry(&quick_config(), || {
            let call = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if call < 2 {
                    Err(server_error())
                } else {
                    Ok("done")
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // Two jittered waits: >= 7ms after the first failure, >= 15ms after
        // the second.
        assert!(start.elapsed() >= Duration::from_millis(22));
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_attempts_propagate_last_error() {
        let calls = AtomicU32::new(0);

        let result: Result<()> = with_retry(&quick_config(), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(server_error()) }
        })
        .await;

        match result {
            Err(AirtableError::Api { status, .. }) => assert_eq!(status, 500),
            other => panic!("expected Api error, got {other:?}"),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_after_hint_overrides_backoff() {
        let calls = AtomicU32::new(0);
        let start = tokio::time::Instant::now();

        let result = with_retry(&quick_config(), || {
            let call = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if call == 0 {
                    Err(AirtableError::RateLimited {
                        retry_after_secs: Some(2),
                    })
                } else {
                    Ok("done")
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), "done");
        // The hint is used verbatim, no jitter.
        assert_eq!(start.elapsed(), Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_without_hint_uses_backoff() {
        let calls = AtomicU32::new(0);
        let start = tokio::time::Instant::now();

        let result = with_retry(&quick_config(), || {
            let call = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if call == 0 {
                    Err(AirtableError::RateLimited {
                        retry_after_secs: None,
                    })
                } else {
                    Ok(())
                }
            }
        })
        .await;

        assert!(result.is_ok());
        assert!(start.elapsed() >= Duration::from_millis(7));
        assert!(start.elapsed() <= Duration::from_millis(13));
    }
}
