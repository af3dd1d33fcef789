//! Handler for short URL redirect.

use axum::{
    extract::{Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use serde_json::json;

use crate::error::AppError;
use crate::state::AppState;
use crate::utils::base62::is_valid_code;

/// Redirects a short code to its original URL.
///
/// # Endpoint
///
/// `GET /{code}`
///
/// Each successful redirect counts one visit; the increment and the lookup
/// are a single store operation.
///
/// # Errors
///
/// Returns 404 if the code is malformed, unknown or expired.
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    if !is_valid_code(&code) {
        return Err(AppError::not_found(
            "Not found",
            json!({ "resource": format!("short code {code}") }),
        ));
    }

    let record = state.link_service.resolve(&code).await?;

    tracing::debug!(code = %code, visits = record.visit_count, "Redirecting");

    Ok((
        StatusCode::FOUND,
        [(header::LOCATION, record.original_url)],
    ))
}
