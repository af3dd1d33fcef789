//! Redis-backed user cache.

use super::service::{UserCache, user_key};
use crate::domain::entities::{User, UserId};
use crate::domain::errors::{CoreError, CoreResult};
use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use std::time::Duration;
use tracing::{debug, error, info};

/// Redis user cache storing JSON-encoded users under `user-{id}`.
///
/// Uses `ConnectionManager` for connection reuse and reconnects. Every entry
/// is written with `SETEX`, so expiry is handled by Redis itself.
pub struct RedisUserCache {
    client: ConnectionManager,
    ttl: Duration,
}

impl RedisUserCache {
    /// Connects to Redis and validates the connection with a PING.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Cache`] if the URL is invalid, the connection cannot
    /// be established, or the PING fails.
    pub async fn connect(redis_url: &str, ttl: Duration) -> CoreResult<Self> {
        info!("Connecting to Redis");

        let client = Client::open(redis_url)
            .map_err(|e| CoreError::cache(format!("Failed to create Redis client: {e}")))?;

        let manager = ConnectionManager::new(client)
            .await
            .map_err(|e| CoreError::cache(format!("Failed to connect to Redis: {e}")))?;

        let mut test_conn = manager.clone();
        test_conn
            .ping::<()>()
            .await
            .map_err(|e| CoreError::cache(format!("Redis PING failed: {e}")))?;

        info!("✓ Connected to Redis");

        Ok(Self {
            client: manager,
            ttl,
        })
    }

    fn ttl_seconds(&self) -> u64 {
        self.ttl.as_secs().max(1)
    }
}

#[async_trait]
impl UserCache for RedisUserCache {
    async fn get(&self, id: &UserId) -> CoreResult<Option<User>> {
        let key = user_key(id);
        let mut conn = self.client.clone();

        let raw = conn.get::<_, Option<String>>(&key).await.map_err(|e| {
            error!("Redis GET error for {}: {}", key, e);
            CoreError::cache(e)
        })?;

        match raw {
            Some(json) => {
                debug!("Cache HIT: {}", key);
                serde_json::from_str(&json)
                    .map(Some)
                    .map_err(|e| CoreError::cache(format!("corrupt entry {key}: {e}")))
            }
            None => {
                debug!("Cache MISS: {}", key);
                Ok(None)
            }
        }
    }

    async fn set(&self, user: &User) -> CoreResult<()> {
        let key = user_key(&user.id);
        let payload = serde_json::to_string(user).map_err(CoreError::cache)?;
        let mut conn = self.client.clone();

        conn.set_ex::<_, _, ()>(&key, payload, self.ttl_seconds())
            .await
            .map_err(|e| {
                error!("Redis SET error for {}: {}", key, e);
                CoreError::cache(e)
            })?;

        debug!("Cache SET: {} (TTL: {}s)", key, self.ttl_seconds());
        Ok(())
    }

    async fn invalidate(&self, id: &UserId) -> CoreResult<()> {
        let key = user_key(id);
        let mut conn = self.client.clone();

        let deleted = conn.del::<_, i32>(&key).await.map_err(|e| {
            error!("Redis DEL error for {}: {}", key, e);
            CoreError::cache(e)
        })?;

        if deleted > 0 {
            debug!("Cache INVALIDATE: {}", key);
        }
        Ok(())
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.client.clone();
        conn.ping::<()>().await.is_ok()
    }
}
