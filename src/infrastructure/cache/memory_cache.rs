//! Process-local user cache.

use super::service::UserCache;
use crate::domain::entities::{User, UserId};
use crate::domain::errors::CoreResult;
use async_trait::async_trait;
use dashmap::DashMap;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// In-memory user cache with per-entry expiry.
///
/// Expired entries are dropped when their key is read, and every write
/// sweeps the rest, so ids that are never looked up again do not pile up.
pub struct MemoryUserCache {
    entries: DashMap<UserId, (User, Instant)>,
    ttl: Duration,
}

impl MemoryUserCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl UserCache for MemoryUserCache {
    async fn get(&self, id: &UserId) -> CoreResult<Option<User>> {
        let now = Instant::now();

        if let Some(entry) = self.entries.get(id) {
            let (user, expires_at) = entry.value();
            if now < *expires_at {
                debug!("Cache HIT: user-{}", id);
                return Ok(Some(user.clone()));
            }
        }

        // No shard guard is held at this point.
        self.entries.remove_if(id, |_, (_, expires_at)| now >= *expires_at);
        debug!("Cache MISS: user-{}", id);
        Ok(None)
    }

    async fn set(&self, user: &User) -> CoreResult<()> {
        let now = Instant::now();
        self.entries.retain(|_, (_, expires_at)| now < *expires_at);
        self.entries.insert(user.id, (user.clone(), now + self.ttl));
        Ok(())
    }

    async fn invalidate(&self, id: &UserId) -> CoreResult<()> {
        self.entries.remove(id);
        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user() -> User {
        User {
            id: UserId::new(),
            username: "ada".to_string(),
            email: "ada@example.com".to_string(),
            password_hash: None,
            created_at: Utc::now(),
            is_active: true,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_expires_after_ttl() {
        let cache = MemoryUserCache::new(Duration::from_secs(60));
        let u = user();

        cache.set(&u).await.unwrap();
        assert_eq!(cache.get(&u.id).await.unwrap(), Some(u.clone()));

        tokio::time::advance(Duration::from_secs(59)).await;
        assert!(cache.get(&u.id).await.unwrap().is_some());

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(cache.get(&u.id).await.unwrap().is_none());
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_refreshes_ttl() {
        let cache = MemoryUserCache::new(Duration::from_secs(60));
        let u = user();

        cache.set(&u).await.unwrap();
        tokio::time::advance(Duration::from_secs(45)).await;
        cache.set(&u).await.unwrap();
        tokio::time::advance(Duration::from_secs(45)).await;

        assert!(cache.get(&u.id).await.unwrap().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_write_sweeps_unread_expired_entries() {
        let cache = MemoryUserCache::new(Duration::from_secs(60));
        for _ in 0..3 {
            cache.set(&user()).await.unwrap();
        }
        assert_eq!(cache.len(), 3);

        tokio::time::advance(Duration::from_secs(61)).await;
        let fresh = user();
        cache.set(&fresh).await.unwrap();

        assert_eq!(cache.len(), 1);
        assert!(cache.get(&fresh.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_invalidate_removes_entry() {
        let cache = MemoryUserCache::new(Duration::from_secs(60));
        let u = user();

        cache.set(&u).await.unwrap();
        cache.invalidate(&u.id).await.unwrap();

        assert!(cache.get(&u.id).await.unwrap().is_none());
        assert_eq!(cache.len(), 0);
    }
}
