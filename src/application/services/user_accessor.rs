//! User identity lookup, with or without a cache in front of the store.
//!
//! Whether the cache is used is decided once at startup by picking either
//! [`CachedUserAccessor`] or [`DirectUserAccessor`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::entities::{User, UserId};
use crate::domain::errors::{CoreError, CoreResult};
use crate::domain::repositories::UserRepository;
use crate::infrastructure::cache::UserCache;
use crate::utils::timeout::bounded;

/// Read path for user records used on every authenticated request.
#[async_trait]
pub trait UserAccessor: Send + Sync {
    /// Returns the user with `id`.
    ///
    /// The result never carries `password_hash`, whether it came from the
    /// cache or the store.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the user does not exist (never cached)
    /// - `Cache` if the cache backend failed
    /// - `Storage` / `Timeout` if the primary store failed
    async fn get(&self, id: &UserId) -> CoreResult<User>;

    /// Writes or refreshes the cached copy of `user`.
    async fn set(&self, user: &User) -> CoreResult<()>;

    /// Drops any cached copy of `id`.
    async fn invalidate(&self, id: &UserId) -> CoreResult<()>;

    /// Checks the cache backend, if there is one. A check that does not
    /// answer within the operation bound counts as unhealthy.
    async fn cache_healthy(&self) -> Option<bool>;
}

/// Cache-aside accessor: cache first, primary store on a miss.
///
/// Cache errors are returned as-is instead of falling back to the store, so
/// a cache outage is never mistaken for a missing user.
pub struct CachedUserAccessor<R: UserRepository + ?Sized, C: UserCache + ?Sized> {
    users: Arc<R>,
    cache: Arc<C>,
    op_timeout: Duration,
}

impl<R: UserRepository + ?Sized, C: UserCache + ?Sized> CachedUserAccessor<R, C> {
    pub fn new(users: Arc<R>, cache: Arc<C>, op_timeout: Duration) -> Self {
        Self {
            users,
            cache,
            op_timeout,
        }
    }
}

#[async_trait]
impl<R: UserRepository + ?Sized, C: UserCache + ?Sized> UserAccessor for CachedUserAccessor<R, C> {
    async fn get(&self, id: &UserId) -> CoreResult<User> {
        if let Some(user) = bounded(self.op_timeout, self.cache.get(id)).await? {
            return Ok(user);
        }

        let user = bounded(self.op_timeout, self.users.find_by_id(id))
            .await?
            .ok_or_else(|| CoreError::not_found(format!("user {id}")))?
            .without_secrets();

        bounded(self.op_timeout, self.cache.set(&user)).await?;

        Ok(user)
    }

    async fn set(&self, user: &User) -> CoreResult<()> {
        bounded(self.op_timeout, self.cache.set(user)).await
    }

    async fn invalidate(&self, id: &UserId) -> CoreResult<()> {
        bounded(self.op_timeout, self.cache.invalidate(id)).await
    }

    async fn cache_healthy(&self) -> Option<bool> {
        match tokio::time::timeout(self.op_timeout, self.cache.health_check()).await {
            Ok(healthy) => Some(healthy),
            Err(_) => {
                tracing::warn!(timeout = ?self.op_timeout, "Cache health check timed out");
                Some(false)
            }
        }
    }
}

/// Accessor used when caching is disabled: every lookup hits the store.
pub struct DirectUserAccessor<R: UserRepository + ?Sized> {
    users: Arc<R>,
    op_timeout: Duration,
}

impl<R: UserRepository + ?Sized> DirectUserAccessor<R> {
    pub fn new(users: Arc<R>, op_timeout: Duration) -> Self {
        Self { users, op_timeout }
    }
}

#[async_trait]
impl<R: UserRepository + ?Sized> UserAccessor for DirectUserAccessor<R> {
    async fn get(&self, id: &UserId) -> CoreResult<User> {
        bounded(self.op_timeout, self.users.find_by_id(id))
            .await?
            .map(User::without_secrets)
            .ok_or_else(|| CoreError::not_found(format!("user {id}")))
    }

    async fn set(&self, _user: &User) -> CoreResult<()> {
        Ok(())
    }

    async fn invalidate(&self, _id: &UserId) -> CoreResult<()> {
        Ok(())
    }

    async fn cache_healthy(&self) -> Option<bool> {
        None
    }
}
