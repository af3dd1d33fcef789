//! Short URL entity representing a code-to-target mapping owned by a user.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::user::UserId;

/// A persisted short URL record.
///
/// `short_code` is assigned once at creation and never changes afterwards.
/// `visit_count` only ever grows, one step per successful resolution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShortUrl {
    /// Opaque identifier assigned by the store.
    #[serde(skip)]
    pub id: String,
    pub short_code: String,
    pub original_url: String,
    #[serde(rename = "user_id")]
    pub owner_id: UserId,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    pub visit_count: u64,
}

impl ShortUrl {
    /// Returns true if the record has passed its expiry time.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|e| now >= e)
    }

    /// Returns true if `user` owns this record.
    pub fn is_owned_by(&self, user: &UserId) -> bool {
        &self.owner_id == user
    }
}

/// Caller-supplied input for creating a short URL.
///
/// Timestamps left as `None` are defaulted by the link service before the
/// write happens.
#[derive(Debug, Clone)]
pub struct ShortUrlDraft {
    pub owner_id: UserId,
    pub original_url: String,
    pub created_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl ShortUrlDraft {
    pub fn new(owner_id: UserId, original_url: impl Into<String>) -> Self {
        Self {
            owner_id,
            original_url: original_url.into(),
            created_at: None,
            expires_at: None,
        }
    }

    pub fn with_expires_at(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }
}

/// Fully populated record handed to the repository for insertion.
///
/// `visit_count` is implicitly zero.
#[derive(Debug, Clone, PartialEq)]
pub struct NewShortUrl {
    pub short_code: String,
    pub original_url: String,
    pub owner_id: UserId,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl NewShortUrl {
    /// Materializes the stored record once the backend has assigned an id.
    pub fn into_record(self, id: String) -> ShortUrl {
        ShortUrl {
            id,
            short_code: self.short_code,
            original_url: self.original_url,
            owner_id: self.owner_id,
            created_at: self.created_at,
            expires_at: Some(self.expires_at),
            visit_count: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample(expires_at: Option<DateTime<Utc>>) -> ShortUrl {
        ShortUrl {
            id: "1".to_string(),
            short_code: "2R1o".to_string(),
            original_url: "https://example.com".to_string(),
            owner_id: UserId::new(),
            created_at: Utc::now(),
            expires_at,
            visit_count: 0,
        }
    }

    #[test]
    fn test_short_url_not_expired_without_expiry() {
        assert!(!sample(None).is_expired());
    }

    #[test]
    fn test_short_url_is_expired() {
        let link = sample(Some(Utc::now() - Duration::seconds(1)));
        assert!(link.is_expired());
    }

    #[test]
    fn test_short_url_future_expiry() {
        let link = sample(Some(Utc::now() + Duration::days(15)));
        assert!(!link.is_expired());
    }

    #[test]
    fn test_is_owned_by() {
        let link = sample(None);
        assert!(link.is_owned_by(&link.owner_id.clone()));
        assert!(!link.is_owned_by(&UserId::new()));
    }

    #[test]
    fn test_serialized_field_names() {
        let link = sample(None);
        let value = serde_json::to_value(&link).unwrap();

        assert!(value.get("id").is_none());
        assert_eq!(value["short_code"], "2R1o");
        assert_eq!(value["original_url"], "https://example.com");
        assert_eq!(value["user_id"], link.owner_id.to_string());
        assert_eq!(value["visit_count"], 0);
        assert!(value.get("expires_at").is_none());
    }

    #[test]
    fn test_into_record_starts_at_zero_visits() {
        let now = Utc::now();
        let new = NewShortUrl {
            short_code: "abc".to_string(),
            original_url: "https://example.com".to_string(),
            owner_id: UserId::new(),
            created_at: now,
            expires_at: now + Duration::days(15),
        };

        let record = new.clone().into_record("id-1".to_string());
        assert_eq!(record.id, "id-1");
        assert_eq!(record.visit_count, 0);
        assert_eq!(record.expires_at, Some(new.expires_at));
    }

    #[test]
    fn test_draft_builder() {
        let owner = UserId::new();
        let at = Utc::now();
        let draft = ShortUrlDraft::new(owner, "https://rust-lang.org").with_expires_at(at);

        assert_eq!(draft.original_url, "https://rust-lang.org");
        assert_eq!(draft.expires_at, Some(at));
        assert!(draft.created_at.is_none());
    }
}
