//! HTTP surface: versioned JSON API under `/v1` plus the public redirect.
//!
//! - [`dto`] - Request/response bodies
//! - [`handlers`] - Endpoint handlers
//! - [`middleware`] - Auth, ownership, rate limiting, request tracing
//! - [`routes`] - Authenticated route table

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
