//! User cache trait.

use async_trait::async_trait;

use crate::domain::entities::{User, UserId};
use crate::domain::errors::CoreResult;

/// Key-value cache for user records.
///
/// Entries expire after an implementation-configured TTL. Backend failures are
/// returned as [`crate::domain::errors::CoreError::Cache`]; absence is `Ok(None)`.
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::RedisUserCache`] - Redis-backed, shared across instances
/// - [`crate::infrastructure::cache::MemoryUserCache`] - process-local, used in tests and
///   single-instance deployments
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserCache: Send + Sync {
    /// Returns the cached user, or `Ok(None)` on a miss or an expired entry.
    async fn get(&self, id: &UserId) -> CoreResult<Option<User>>;

    /// Writes or refreshes the entry for `user.id`, resetting its TTL.
    async fn set(&self, user: &User) -> CoreResult<()>;

    /// Removes the entry for `id` if present.
    async fn invalidate(&self, id: &UserId) -> CoreResult<()>;

    /// Checks if the cache backend is reachable.
    async fn health_check(&self) -> bool;
}

/// Builds the cache key for a user.
pub fn user_key(id: &UserId) -> String {
    format!("user-{id}")
}
