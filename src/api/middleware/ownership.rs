//! Ownership check for per-record routes.

use axum::{
    Extension,
    extract::{Path, Request, State},
    middleware::Next,
    response::Response,
};
use serde_json::json;

use crate::domain::entities::User;
use crate::{error::AppError, state::AppState};

/// Loads the record named by the `{code}` path segment and checks that the
/// authenticated caller owns it.
///
/// Must run after [`super::auth::layer`]. The lookup does not count a visit.
/// On success the [`ShortUrl`](crate::domain::entities::ShortUrl) is inserted
/// into request extensions.
///
/// # Errors
///
/// - 404 if no record has this code
/// - 403 if the record belongs to another user
pub async fn layer(
    State(st): State<AppState>,
    Path(code): Path<String>,
    Extension(user): Extension<User>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let url = st.link_service.find_by_code(&code).await?;

    if !url.is_owned_by(&user.id) {
        tracing::warn!(code = %code, user = %user.id, "Ownership check failed");
        return Err(AppError::forbidden(
            "Forbidden",
            json!({ "reason": "Short URL belongs to another user" }),
        ));
    }

    req.extensions_mut().insert(url);

    Ok(next.run(req).await)
}
