//! DTOs for short URL management endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::domain::entities::{ShortUrl, UserId};
use crate::utils::url_validator::validate_target_url;

/// Request to create a short URL.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUrlRequest {
    /// Absolute http(s) target, stored as submitted.
    #[validate(custom(function = "target_url"))]
    pub url: String,

    /// Optional expiry; defaults to the configured link TTL.
    pub expires_at: Option<DateTime<Utc>>,
}

fn target_url(url: &str) -> Result<(), ValidationError> {
    validate_target_url(url).map_err(|e| {
        let mut err = ValidationError::new("url");
        err.message = Some(e.to_string().into());
        err
    })
}

/// A short URL as returned by the API.
#[derive(Debug, Serialize, Deserialize)]
pub struct UrlResponse {
    pub short_code: String,
    pub original_url: String,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub visit_count: u64,
}

impl From<ShortUrl> for UrlResponse {
    fn from(url: ShortUrl) -> Self {
        Self {
            short_code: url.short_code,
            original_url: url.original_url,
            user_id: url.owner_id,
            created_at: url.created_at,
            expires_at: url.expires_at,
            visit_count: url.visit_count,
        }
    }
}

/// The caller's short URLs.
#[derive(Debug, Serialize, Deserialize)]
pub struct UrlListResponse {
    pub total: usize,
    pub items: Vec<UrlResponse>,
}

impl From<Vec<ShortUrl>> for UrlListResponse {
    fn from(urls: Vec<ShortUrl>) -> Self {
        let items: Vec<UrlResponse> = urls.into_iter().map(UrlResponse::from).collect();
        Self {
            total: items.len(),
            items,
        }
    }
}
