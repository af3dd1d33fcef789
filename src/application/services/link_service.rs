//! Short URL creation, resolution, listing and deletion.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::domain::entities::{NewShortUrl, ShortUrl, ShortUrlDraft, UserId};
use crate::domain::errors::{CoreError, CoreResult};
use crate::domain::repositories::ShortUrlRepository;
use crate::utils::base62;
use crate::utils::code_generator::SequenceGenerator;
use crate::utils::timeout::bounded;

/// Attempts made with fresh codes before a create gives up on conflicts.
const MAX_ATTEMPTS: usize = 10;

/// Tunables for [`LinkService`].
#[derive(Debug, Clone, Copy)]
pub struct LinkServiceConfig {
    /// Offset added to `created_at` when no expiry is supplied.
    pub default_ttl: chrono::Duration,
    /// Bound on every repository call.
    pub op_timeout: Duration,
}

impl Default for LinkServiceConfig {
    fn default() -> Self {
        Self {
            default_ttl: chrono::Duration::days(15),
            op_timeout: Duration::from_secs(5),
        }
    }
}

/// Builds the generator for `machine_id`, continuing after the newest code
/// already stored in its partition.
///
/// A fresh partition starts at sequence 0, like [`SequenceGenerator::new`].
///
/// # Errors
///
/// Returns `Timeout` or `Storage` if the lookup fails.
pub async fn resume_generator<R: ShortUrlRepository + ?Sized>(
    repository: &R,
    machine_id: u64,
    op_timeout: Duration,
) -> CoreResult<SequenceGenerator> {
    let latest = bounded(
        op_timeout,
        repository.latest_in_range(SequenceGenerator::id_range(machine_id)),
    )
    .await?;

    let seq = latest
        .and_then(|record| base62::decode(&record.short_code).ok())
        .map(SequenceGenerator::sequence_of)
        .unwrap_or(0);

    tracing::info!(machine_id, seq, "Code sequence resumed");
    Ok(SequenceGenerator::starting_at(machine_id, seq))
}

/// Service owning the short URL record lifecycle.
///
/// Codes come from the injected [`SequenceGenerator`]. Store writes and reads
/// are each bounded by `op_timeout`; nothing is retried except a create that
/// lost a code collision.
pub struct LinkService<R: ShortUrlRepository + ?Sized> {
    repository: Arc<R>,
    generator: Arc<SequenceGenerator>,
    config: LinkServiceConfig,
}

impl<R: ShortUrlRepository + ?Sized> LinkService<R> {
    pub fn new(
        repository: Arc<R>,
        generator: Arc<SequenceGenerator>,
        config: LinkServiceConfig,
    ) -> Self {
        Self {
            repository,
            generator,
            config,
        }
    }

    /// Creates a record for `original_url` owned by `owner_id`.
    ///
    /// `expires_at` defaults to now + the configured TTL.
    ///
    /// # Errors
    ///
    /// Returns `Conflict` if every attempt collided, `Timeout` if a write
    /// exceeded its bound, `Storage` on backend failure.
    pub async fn create_short_url(
        &self,
        owner_id: UserId,
        original_url: impl Into<String>,
        expires_at: Option<DateTime<Utc>>,
    ) -> CoreResult<ShortUrl> {
        let draft = ShortUrlDraft::new(owner_id, original_url);
        let draft = match expires_at {
            Some(at) => draft.with_expires_at(at),
            None => draft,
        };
        self.create(draft).await
    }

    /// Creates a record from a draft, defaulting its timestamps first.
    pub async fn create(&self, draft: ShortUrlDraft) -> CoreResult<ShortUrl> {
        let created_at = draft.created_at.unwrap_or_else(Utc::now);
        let expires_at = draft
            .expires_at
            .unwrap_or(created_at + self.config.default_ttl);

        let mut last_conflict = None;

        for attempt in 1..=MAX_ATTEMPTS {
            let new_url = NewShortUrl {
                short_code: self.generator.next_code(),
                original_url: draft.original_url.clone(),
                owner_id: draft.owner_id,
                created_at,
                expires_at,
            };
            let code = new_url.short_code.clone();

            match bounded(self.config.op_timeout, self.repository.insert(new_url)).await {
                Ok(record) => {
                    tracing::debug!(code = %record.short_code, owner = %record.owner_id, "Short URL created");
                    return Ok(record);
                }
                Err(e) if e.is_conflict() => {
                    tracing::warn!(code = %code, attempt, "Short code collision, retrying");
                    last_conflict = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_conflict.unwrap_or_else(|| CoreError::conflict("short_code")))
    }

    /// Resolves `code`, counting the visit.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no live record has this code.
    pub async fn resolve(&self, code: &str) -> CoreResult<ShortUrl> {
        bounded(self.config.op_timeout, self.repository.resolve(code, Utc::now()))
            .await?
            .ok_or_else(|| CoreError::not_found(format!("short code {code}")))
    }

    /// Looks `code` up without counting a visit.
    pub async fn find_by_code(&self, code: &str) -> CoreResult<ShortUrl> {
        bounded(self.config.op_timeout, self.repository.find_by_code(code))
            .await?
            .ok_or_else(|| CoreError::not_found(format!("short code {code}")))
    }

    /// Returns every record owned by `owner_id`.
    pub async fn list_by_owner(&self, owner_id: &UserId) -> CoreResult<Vec<ShortUrl>> {
        bounded(self.config.op_timeout, self.repository.list_by_owner(owner_id)).await
    }

    /// Deletes the record for `code`.
    ///
    /// Ownership is not checked here.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if nothing was deleted, so a second delete of the
    /// same code fails.
    pub async fn delete(&self, code: &str) -> CoreResult<()> {
        let deleted = bounded(self.config.op_timeout, self.repository.delete(code)).await?;

        if deleted {
            tracing::debug!(code = %code, "Short URL deleted");
            Ok(())
        } else {
            Err(CoreError::not_found(format!("short code {code}")))
        }
    }

    /// Checks that the store answers within the operation bound.
    pub async fn ping(&self) -> CoreResult<()> {
        bounded(self.config.op_timeout, self.repository.ping()).await
    }
}
