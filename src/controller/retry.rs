//! Bounded retry for transient control-plane errors
//!
//! Some failures are expected to self-resolve: IAM role propagation lag on
//! create/modify, and the cluster-level replica ordering constraint on
//! delete. These are retried within a time budget; everything else fails
//! immediately.

use std::future::Future;
use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::debug;

use crate::api::ApiError;

/// Budget for retrying permission-propagation errors. Propagation in the
/// identity system settles well within this window.
pub const PROPAGATION_TIMEOUT: Duration = Duration::from_secs(120);

/// Delay between retry attempts.
pub const RETRY_INTERVAL: Duration = Duration::from_secs(5);

/// Retry `op` while `retryable` classifies its error as transient, bounded
/// by `budget`.
///
/// When the budget runs out while the error is still classified transient,
/// one final unretried attempt is issued and its result is surfaced as-is,
/// success or error. The caller sees the real underlying failure rather
/// than a timeout masking it.
pub async fn retry_when<T, F, Fut, P>(budget: Duration, mut op: F, retryable: P) -> Result<T, ApiError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
    P: Fn(&ApiError) -> bool,
{
    let deadline = Instant::now() + budget;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if retryable(&err) => {
                if Instant::now() + RETRY_INTERVAL >= deadline {
                    debug!(error = %err, "retry budget exhausted, issuing final attempt");
                    return op().await;
                }
                debug!(error = %err, "transient error, retrying in {:?}", RETRY_INTERVAL);
                sleep(RETRY_INTERVAL).await;
            }
            Err(err) => return Err(err),
        }
    }
}

/// Retry `op` past IAM permission-propagation errors.
///
/// Used around `CreateDBInstance` and `ModifyDBInstance`, which both reject
/// a monitoring role ARN until the identity system has finished propagating
/// it.
pub async fn retry_on_permission_propagation<T, F, Fut>(op: F) -> Result<T, ApiError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    retry_when(PROPAGATION_TIMEOUT, op, ApiError::is_permission_propagation).await
}
