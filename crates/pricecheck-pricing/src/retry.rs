//! Retry with exponential back-off and jitter for the pricing clients.
//!
//! The reconciliation walk turns any pricing failure into an "unavailable"
//! sentinel, so retries are opt-in: with `max_retries = 0` every operation is
//! attempted exactly once.

use std::future::Future;
use std::time::Duration;

use crate::error::PricingError;

/// Returns `true` for errors that are worth retrying after a back-off delay.
///
/// **Retriable:**
/// - [`PricingError::RateLimited`]: HTTP 429.
/// - [`PricingError::Http`] when it is a timeout, a connect failure or carries a 5xx status.
/// - [`PricingError::UnexpectedStatus`] with a 5xx status.
///
/// Everything else (404, 4xx, malformed bodies, a response without a price,
/// bad base URLs) is returned immediately.
pub(crate) fn is_retriable(err: &PricingError) -> bool {
    match err {
        PricingError::RateLimited { .. } => true,
        PricingError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        PricingError::UnexpectedStatus { status, .. } => (500..600).contains(status),
        PricingError::Deserialize { .. }
        | PricingError::NotFound { .. }
        | PricingError::InvalidBaseUrl { .. }
        | PricingError::MissingPrice { .. } => false,
    }
}

const MAX_DELAY_MS: u64 = 60_000;

/// Wait before retry `attempt` (1-based): `backoff_base_ms * 2^(attempt-1)`
/// with ±25 % jitter. A 429 waits at least its `Retry-After`. Capped at 60 s.
pub(crate) fn backoff_delay_ms(err: &PricingError, attempt: u32, backoff_base_ms: u64) -> u64 {
    let computed = backoff_base_ms.saturating_mul(1u64 << attempt.saturating_sub(1).min(10));
    let capped = computed.min(MAX_DELAY_MS);
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let jittered = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;

    let floor = match err {
        PricingError::RateLimited {
            retry_after_secs, ..
        } => retry_after_secs.saturating_mul(1_000),
        _ => 0,
    };
    jittered.max(floor).min(MAX_DELAY_MS)
}

/// Runs `operation` with up to `max_retries` additional attempts on transient errors.
///
/// See [`backoff_delay_ms`] for the wait between attempts.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, PricingError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, PricingError>>,
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
                let delay_ms = backoff_delay_ms(&err, attempt, backoff_base_ms);
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "transient pricing error, retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}
