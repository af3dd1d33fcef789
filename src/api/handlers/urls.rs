//! Handlers for short URL management (create, list, delete).

use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
};
use validator::Validate;

use crate::api::dto::urls::{CreateUrlRequest, UrlListResponse, UrlResponse};
use crate::domain::entities::{ShortUrl, User};
use crate::domain::errors::CoreError;
use crate::error::AppError;
use crate::state::AppState;

/// Creates a short URL owned by the caller.
///
/// # Endpoint
///
/// `POST /v1/urls`
///
/// # Request Body
///
/// ```json
/// {
///   "url": "https://example.com/some/long/path",
///   "expires_at": "2030-01-01T00:00:00Z"
/// }
/// ```
///
/// `expires_at` is optional and defaults to the configured link TTL.
///
/// # Errors
///
/// - 400 if the URL is not an absolute http(s) URL
/// - 409 if no free short code could be allocated
/// - 503 if the store timed out
pub async fn create_url_handler(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(payload): Json<CreateUrlRequest>,
) -> Result<(StatusCode, Json<UrlResponse>), AppError> {
    payload.validate()?;

    let record = state
        .link_service
        .create_short_url(user.id, payload.url, payload.expires_at)
        .await?;

    tracing::info!(code = %record.short_code, owner = %user.id, "Short URL created");

    Ok((StatusCode::CREATED, Json(record.into())))
}

/// Lists the caller's short URLs.
///
/// `GET /v1/urls`
pub async fn list_urls_handler(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<Json<UrlListResponse>, AppError> {
    let urls = state.link_service.list_by_owner(&user.id).await?;
    Ok(Json(urls.into()))
}

/// Deletes one of the caller's short URLs.
///
/// # Endpoint
///
/// `DELETE /v1/urls/{code}`
///
/// Runs behind [`crate::api::middleware::ownership`], which has already
/// answered 404 for unknown codes and 403 for codes owned by someone else.
/// A concurrent delete that wins the race still yields 204.
pub async fn delete_url_handler(
    State(state): State<AppState>,
    Extension(url): Extension<ShortUrl>,
) -> Result<StatusCode, AppError> {
    match state.link_service.delete(&url.short_code).await {
        Ok(()) | Err(CoreError::NotFound(_)) => {
            tracing::info!(code = %url.short_code, "Short URL deleted");
            Ok(StatusCode::NO_CONTENT)
        }
        Err(e) => Err(e.into()),
    }
}
