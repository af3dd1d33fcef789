//! Runs against a live Redis when `TEST_REDIS_URL` is set; skipped otherwise.

use std::time::Duration;

use chrono::Utc;
use linkpress::domain::entities::{User, UserId};
use linkpress::infrastructure::cache::{RedisUserCache, UserCache};

async fn test_cache(ttl: Duration) -> Option<RedisUserCache> {
    let url = std::env::var("TEST_REDIS_URL").ok()?;
    Some(RedisUserCache::connect(&url, ttl).await.unwrap())
}

fn user() -> User {
    User {
        id: UserId::new(),
        username: "carol".to_string(),
        email: "carol@example.com".to_string(),
        password_hash: Some("never-cached".to_string()),
        created_at: Utc::now(),
        is_active: true,
    }
}

#[tokio::test]
async fn test_set_get_invalidate() {
    let Some(cache) = test_cache(Duration::from_secs(60)).await else {
        return;
    };
    let u = user();

    assert!(cache.get(&u.id).await.unwrap().is_none());

    cache.set(&u).await.unwrap();
    let cached = cache.get(&u.id).await.unwrap().unwrap();
    assert_eq!(cached.id, u.id);
    assert_eq!(cached.email, u.email);
    assert!(cached.password_hash.is_none());

    cache.invalidate(&u.id).await.unwrap();
    assert!(cache.get(&u.id).await.unwrap().is_none());

    assert!(cache.health_check().await);
}

#[tokio::test]
async fn test_entries_expire() {
    let Some(cache) = test_cache(Duration::from_secs(1)).await else {
        return;
    };
    let u = user();

    cache.set(&u).await.unwrap();
    assert!(cache.get(&u.id).await.unwrap().is_some());

    tokio::time::sleep(Duration::from_millis(2100)).await;
    assert!(cache.get(&u.id).await.unwrap().is_none());
}
