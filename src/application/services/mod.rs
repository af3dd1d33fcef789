//! Business logic services for the application layer.

pub mod auth_service;
pub mod link_service;
pub mod rate_limiter;
pub mod user_accessor;

pub use auth_service::{AuthService, TokenError, TokenSigner};
pub use link_service::{LinkService, LinkServiceConfig, resume_generator};
pub use rate_limiter::{Decision, FixedWindowLimiter, RateLimitConfig};
pub use user_accessor::{CachedUserAccessor, DirectUserAccessor, UserAccessor};
