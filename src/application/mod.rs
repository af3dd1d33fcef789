//! Application layer services implementing business logic.
//!
//! Services consume repository and cache traits and expose the operations
//! HTTP handlers and the admin CLI call into.
//!
//! # Available Services
//!
//! - [`services::link_service::LinkService`] - Short URL creation, resolution and deletion
//! - [`services::user_accessor::UserAccessor`] - User lookup with optional cache-aside
//! - [`services::rate_limiter::FixedWindowLimiter`] - Per-client admission control
//! - [`services::auth_service::AuthService`] - Bearer token authentication

pub mod services;
