//! Fixed-window rate limiting middleware.

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use std::net::SocketAddr;

use crate::application::services::Decision;
use crate::utils::client_ip::client_key;
use crate::{error::AppError, state::AppState};

/// Admits or rejects a request using the shared [`FixedWindowLimiter`].
///
/// Passes everything through when no limiter is configured.
///
/// # Key Extraction
///
/// The client key is the peer IP, or the first `X-Forwarded-For` /
/// `X-Real-IP` entry when the service runs behind a trusted proxy.
///
/// # Errors
///
/// Returns `429 Too Many Requests` with a `Retry-After` header once the
/// client has used up its window.
///
/// [`FixedWindowLimiter`]: crate::application::services::FixedWindowLimiter
pub async fn layer(
    State(st): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(limiter) = st.rate_limiter.as_ref() else {
        return Ok(next.run(req).await);
    };

    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let key = client_key(req.headers(), peer, st.behind_proxy);

    match limiter.allow(&key) {
        Decision::Allowed { .. } => Ok(next.run(req).await),
        Decision::Rejected { retry_after } => {
            tracing::warn!(
                client = %key,
                path = %req.uri().path(),
                retry_after_ms = retry_after.as_millis() as u64,
                "Rate limit exceeded"
            );
            Err(AppError::TooManyRequests { retry_after })
        }
    }
}
