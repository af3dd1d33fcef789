//! Deadline helper for backend calls.

use std::future::Future;
use std::time::Duration;

use crate::domain::errors::{CoreError, CoreResult};

/// Runs `fut` under `limit`, failing with [`CoreError::Timeout`] when it does
/// not finish in time. The future is dropped on expiry.
pub async fn bounded<T, F>(limit: Duration, fut: F) -> CoreResult<T>
where
    F: Future<Output = CoreResult<T>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(CoreError::Timeout(limit)),
    }
}
