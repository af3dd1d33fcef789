//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /{code}`       - Short link redirect (public)
//! - `GET  /v1/health`    - Health check: database, cache (public)
//! - `/v1/urls*`          - URL management (Bearer token required)
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Rate limiting** - Per-client fixed window, when enabled
//! - **Authentication** - Bearer token on `/v1/urls*`
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::handlers::{health_handler, redirect_handler};
use crate::api::middleware::{auth, rate_limit, tracing};
use crate::state::AppState;
use axum::routing::get;
use axum::{Router, middleware};
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Constructs the application router with trailing-slash normalization.
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(router(state))
}

/// All routes and middleware, without path normalization.
///
/// The rate limiter middleware is always mounted and passes requests through
/// when `state.rate_limiter` is `None`.
pub fn router(state: AppState) -> Router {
    let api_router = api::routes::protected_routes(state.clone())
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::layer));

    let v1 = Router::new()
        .route("/health", get(health_handler))
        .merge(api_router);

    Router::new()
        .route("/{code}", get(redirect_handler))
        .nest("/v1", v1)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit::layer,
        ))
        .with_state(state)
        .layer(tracing::layer())
}
