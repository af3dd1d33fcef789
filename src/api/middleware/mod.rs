//! HTTP middleware for request processing and protection.
//!
//! Provides authentication, ownership checks, rate limiting, and
//! observability middleware.

pub mod auth;
pub mod ownership;
pub mod rate_limit;
pub mod tracing;
