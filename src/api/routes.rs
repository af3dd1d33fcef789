//! API route configuration.
//!
//! All routes here require Bearer token authentication via
//! [`crate::api::middleware::auth`], applied by the caller.

use crate::api::handlers::{create_url_handler, delete_url_handler, list_urls_handler};
use crate::api::middleware::ownership;
use crate::state::AppState;
use axum::{
    Router, middleware,
    routing::{delete, get},
};

/// Authenticated URL management routes.
///
/// # Endpoints
///
/// - `POST   /urls`          - Create a short URL
/// - `GET    /urls`          - List the caller's short URLs
/// - `DELETE /urls/{code}`   - Delete one of the caller's short URLs
pub fn protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/urls", get(list_urls_handler).post(create_url_handler))
        .route(
            "/urls/{code}",
            delete(delete_url_handler)
                .route_layer(middleware::from_fn_with_state(state, ownership::layer)),
        )
}
