//! Deadline helper for work functions.
//!
//! The orchestrator imposes no timeout; work functions wrap their transport
//! call with [`with_timeout`] so an expired deadline surfaces as a raised
//! `TransportError::Timeout`, which classifies as a network failure.

use std::future::Future;
use std::time::Duration;

use errand_core::TransportError;

/// Awaits `fut`, failing with [`TransportError::Timeout`] after `duration`.
///
/// # Errors
///
/// Returns `TransportError::Timeout` if `fut` does not resolve in time.
pub async fn with_timeout<F: Future>(
    duration: Duration,
    fut: F,
) -> Result<F::Output, TransportError> {
    match tokio::time::timeout(duration, fut).await {
        Ok(output) => Ok(output),
        Err(_elapsed) => Err(TransportError::Timeout {
            timeout_ms: u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
        }),
    }
}
