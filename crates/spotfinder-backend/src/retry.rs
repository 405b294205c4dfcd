//! Retry with exponential back-off and jitter for backend requests.
//!
//! [`retry_with_backoff`] wraps any fallible async operation and retries on
//! transient errors (network failures, 429, 5xx). Everything else is returned
//! immediately.

use std::future::Future;
use std::time::Duration;

use crate::error::BackendError;

const MAX_DELAY_MS: u64 = 30_000;

/// Returns `true` for errors that are worth retrying after a back-off delay.
///
/// **Retriable:** timeouts, connection failures, HTTP 429 and 5xx.
///
/// **Not retriable:** other HTTP statuses, malformed bodies, bad URLs.
pub(crate) fn is_retriable(err: &BackendError) -> bool {
    match err {
        BackendError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        BackendError::UnexpectedStatus { status, .. } => *status == 429 || *status >= 500,
        BackendError::Deserialize { .. }
        | BackendError::InvalidUrl { .. }
        | BackendError::EmptyResponse { .. } => false,
    }
}

/// Runs `operation` with up to `max_retries` additional attempts on transient errors.
///
/// Attempt `n` sleeps `backoff_base_ms × 2ⁿ⁻¹ ± 25 %` before retrying, capped
/// at 30 s.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, BackendError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, BackendError>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let computed = backoff_base_ms.saturating_mul(1u64 << (attempt - 1).min(10));
                let capped = computed.min(MAX_DELAY_MS);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let delay_ms = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "backend transient error; retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use super::*;

    fn status_err(status: u16) -> BackendError {
        BackendError::UnexpectedStatus {
            status,
            url: "http://backend/rest/v1/parking_locations".to_owned(),
        }
    }

    #[test]
    fn server_errors_and_throttling_are_retriable() {
        assert!(is_retriable(&status_err(503)));
        assert!(is_retriable(&status_err(500)));
        assert!(is_retriable(&status_err(429)));
    }

    #[test]
    fn client_errors_are_not_retriable() {
        assert!(!is_retriable(&status_err(401)));
        assert!(!is_retriable(&status_err(404)));
    }

    #[test]
    fn deserialize_error_is_not_retriable() {
        let src = serde_json::from_str::<()>("invalid").unwrap_err();
        assert!(!is_retriable(&BackendError::Deserialize {
            context: "test".to_owned(),
            source: src,
        }));
    }

    #[tokio::test]
    async fn succeeds_immediately_on_first_try() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(3, 0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Ok::<u32, BackendError>(42)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_then_succeeds() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(3, 0, || {
            let c = Arc::clone(&c);
            async move {
                let attempt = c.fetch_add(1, Ordering::SeqCst) + 1;
                if attempt < 3 {
                    Err(status_err(503))
                } else {
                    Ok(99)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 99);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_retry_budget() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(2, 0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<u32, _>(status_err(502))
            }
        })
        .await;
        assert!(matches!(
            result,
            Err(BackendError::UnexpectedStatus { status: 502, .. })
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 3, "1 attempt + 2 retries");
    }

    #[tokio::test]
    async fn does_not_retry_client_errors() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(3, 0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<u32, _>(status_err(401))
            }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1, "401 must not be retried");
        assert!(result.is_err());
    }
}
