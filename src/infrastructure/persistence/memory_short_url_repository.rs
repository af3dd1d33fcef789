//! Process-local short URL repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use mongodb::bson::oid::ObjectId;
use std::ops::RangeInclusive;

use crate::domain::entities::{NewShortUrl, ShortUrl, UserId};
use crate::domain::errors::{CoreError, CoreResult};
use crate::domain::repositories::ShortUrlRepository;
use crate::utils::base62;

/// In-memory repository keyed by short code.
///
/// Each record is mutated under its map shard lock, which makes the
/// resolve increment atomic. Expired records are not evicted, only hidden
/// from `resolve`.
#[derive(Debug, Default)]
pub struct InMemoryShortUrlRepository {
    records: DashMap<String, ShortUrl>,
}

impl InMemoryShortUrlRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl ShortUrlRepository for InMemoryShortUrlRepository {
    async fn insert(&self, new_url: NewShortUrl) -> CoreResult<ShortUrl> {
        match self.records.entry(new_url.short_code.clone()) {
            Entry::Occupied(_) => Err(CoreError::conflict("short_code")),
            Entry::Vacant(slot) => {
                let record = new_url.into_record(ObjectId::new().to_hex());
                slot.insert(record.clone());
                Ok(record)
            }
        }
    }

    async fn resolve(&self, code: &str, now: DateTime<Utc>) -> CoreResult<Option<ShortUrl>> {
        let Some(mut record) = self.records.get_mut(code) else {
            return Ok(None);
        };

        if record.is_expired_at(now) {
            return Ok(None);
        }

        record.visit_count += 1;
        Ok(Some(record.value().clone()))
    }

    async fn find_by_code(&self, code: &str) -> CoreResult<Option<ShortUrl>> {
        Ok(self.records.get(code).map(|r| r.value().clone()))
    }

    async fn list_by_owner(&self, owner: &UserId) -> CoreResult<Vec<ShortUrl>> {
        Ok(self
            .records
            .iter()
            .filter(|r| r.is_owned_by(owner))
            .map(|r| r.value().clone())
            .collect())
    }

    async fn delete(&self, code: &str) -> CoreResult<bool> {
        Ok(self.records.remove(code).is_some())
    }

    async fn latest_in_range(&self, ids: RangeInclusive<u64>) -> CoreResult<Option<ShortUrl>> {
        Ok(self
            .records
            .iter()
            .filter(|r| base62::decode(&r.short_code).is_ok_and(|id| ids.contains(&id)))
            .max_by(|a, b| {
                a.created_at
                    .cmp(&b.created_at)
                    .then_with(|| a.id.cmp(&b.id))
            })
            .map(|r| r.value().clone()))
    }

    async fn ping(&self) -> CoreResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn new_url(code: &str, owner: UserId) -> NewShortUrl {
        let now = Utc::now();
        NewShortUrl {
            short_code: code.to_string(),
            original_url: format!("https://example.com/{code}"),
            owner_id: owner,
            created_at: now,
            expires_at: now + chrono::Duration::days(15),
        }
    }

    #[tokio::test]
    async fn test_duplicate_code_conflicts() {
        let repo = InMemoryShortUrlRepository::new();
        let owner = UserId::new();

        repo.insert(new_url("abc", owner)).await.unwrap();
        let err = repo.insert(new_url("abc", owner)).await.unwrap_err();

        assert_eq!(err, CoreError::Conflict("short_code".to_string()));
        assert_eq!(repo.len(), 1);
    }

    #[tokio::test]
    async fn test_resolve_increments_and_find_does_not() {
        let repo = InMemoryShortUrlRepository::new();
        repo.insert(new_url("abc", UserId::new())).await.unwrap();

        let first = repo.resolve("abc", Utc::now()).await.unwrap().unwrap();
        let second = repo.resolve("abc", Utc::now()).await.unwrap().unwrap();
        assert_eq!((first.visit_count, second.visit_count), (1, 2));

        let peeked = repo.find_by_code("abc").await.unwrap().unwrap();
        assert_eq!(peeked.visit_count, 2);
    }

    #[tokio::test]
    async fn test_resolve_hides_expired() {
        let repo = InMemoryShortUrlRepository::new();
        let stored = repo.insert(new_url("abc", UserId::new())).await.unwrap();
        let after_expiry = stored.expires_at.unwrap();

        assert!(repo.resolve("abc", after_expiry).await.unwrap().is_none());
        assert_eq!(repo.find_by_code("abc").await.unwrap().unwrap().visit_count, 0);
    }

    #[tokio::test]
    async fn test_list_by_owner_filters() {
        let repo = InMemoryShortUrlRepository::new();
        let alice = UserId::new();
        let bob = UserId::new();

        repo.insert(new_url("a1", alice)).await.unwrap();
        repo.insert(new_url("a2", alice)).await.unwrap();
        repo.insert(new_url("b1", bob)).await.unwrap();

        let mut codes: Vec<String> = repo
            .list_by_owner(&alice)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.short_code)
            .collect();
        codes.sort();

        assert_eq!(codes, vec!["a1", "a2"]);
    }

    #[tokio::test]
    async fn test_delete_reports_absence() {
        let repo = InMemoryShortUrlRepository::new();
        repo.insert(new_url("abc", UserId::new())).await.unwrap();

        assert!(repo.delete("abc").await.unwrap());
        assert!(!repo.delete("abc").await.unwrap());
        assert!(repo.resolve("abc", Utc::now()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_latest_in_range_picks_newest_matching_code() {
        let repo = InMemoryShortUrlRepository::new();
        let owner = UserId::new();
        let base = Utc::now();

        for (id, age_secs) in [(1_640_003u64, 30), (1_640_007, 10), (1_650_001, 0)] {
            let mut url = new_url(&base62::encode(id), owner);
            url.created_at = base - chrono::Duration::seconds(age_secs);
            repo.insert(url).await.unwrap();
        }
        repo.insert(new_url("not-base62!", owner)).await.unwrap();

        let latest = repo
            .latest_in_range(1_640_000..=1_649_998)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(base62::decode(&latest.short_code).unwrap(), 1_640_007);

        assert!(repo.latest_in_range(20_000..=29_998).await.unwrap().is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_concurrent_resolves_lose_no_updates() {
        let repo = Arc::new(InMemoryShortUrlRepository::new());
        repo.insert(new_url("hot", UserId::new())).await.unwrap();

        let handles: Vec<_> = (0..500)
            .map(|_| {
                let repo = Arc::clone(&repo);
                tokio::spawn(async move { repo.resolve("hot", Utc::now()).await })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap().unwrap().unwrap();
        }

        let record = repo.find_by_code("hot").await.unwrap().unwrap();
        assert_eq!(record.visit_count, 500);
    }
}
