//! Repository trait for short URL record access.

use crate::domain::entities::{NewShortUrl, ShortUrl, UserId};
use crate::domain::errors::CoreResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::ops::RangeInclusive;

/// Repository interface for short URL records.
///
/// Implementations must make [`ShortUrlRepository::resolve`] a single atomic
/// read-modify-write: N concurrent resolutions of one code raise its
/// `visit_count` by exactly N.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::MongoShortUrlRepository`] - MongoDB implementation
/// - [`crate::infrastructure::persistence::InMemoryShortUrlRepository`] - process-local store
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ShortUrlRepository: Send + Sync {
    /// Inserts a fully populated record.
    ///
    /// # Errors
    ///
    /// Returns [`crate::domain::errors::CoreError::Conflict`] if the short code
    /// is already taken. Returns `Storage` on any other backend failure.
    async fn insert(&self, new_url: NewShortUrl) -> CoreResult<ShortUrl>;

    /// Atomically increments `visit_count` of the record matching `code` and
    /// returns the record as it is after the increment.
    ///
    /// Records whose `expires_at` is at or before `now` do not match, even if
    /// the backend has not evicted them yet.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(ShortUrl))` if a live record matched
    /// - `Ok(None)` otherwise (nothing is written)
    async fn resolve(&self, code: &str, now: DateTime<Utc>) -> CoreResult<Option<ShortUrl>>;

    /// Reads a record without touching its visit counter.
    async fn find_by_code(&self, code: &str) -> CoreResult<Option<ShortUrl>>;

    /// Lists every record owned by `owner`. Order is unspecified.
    async fn list_by_owner(&self, owner: &UserId) -> CoreResult<Vec<ShortUrl>>;

    /// Removes the record matching `code`.
    ///
    /// Returns `Ok(true)` if a record was removed, `Ok(false)` if none matched.
    async fn delete(&self, code: &str) -> CoreResult<bool>;

    /// Returns the most recently created record whose short code decodes to
    /// an identifier inside `ids`, expired or not.
    ///
    /// Ties on `created_at` go to the later inserted record.
    async fn latest_in_range(&self, ids: RangeInclusive<u64>) -> CoreResult<Option<ShortUrl>>;

    /// Checks that the backend is reachable.
    async fn ping(&self) -> CoreResult<()>;
}
