//! MongoDB implementation of the short URL repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::TryStreamExt;
use mongodb::bson::{DateTime as BsonDateTime, doc, oid::ObjectId};
use mongodb::options::ReturnDocument;
use mongodb::{Collection, Database};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

use super::mongo::{URLS_COLLECTION, classify, from_bson_datetime, ping, to_bson_datetime};
use crate::domain::entities::{NewShortUrl, ShortUrl, UserId};
use crate::domain::errors::CoreResult;
use crate::domain::repositories::ShortUrlRepository;
use crate::utils::base62;

/// Stored document shape. Field names are shared with existing data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct UrlDocument {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub short_code: String,
    pub original_url: String,
    pub user_id: ObjectId,
    pub created_at: BsonDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<BsonDateTime>,
    #[serde(default)]
    pub visit_count: i64,
}

impl UrlDocument {
    fn from_new(id: ObjectId, new_url: &NewShortUrl) -> Self {
        Self {
            id,
            short_code: new_url.short_code.clone(),
            original_url: new_url.original_url.clone(),
            user_id: new_url.owner_id.as_object_id(),
            created_at: to_bson_datetime(new_url.created_at),
            expires_at: Some(to_bson_datetime(new_url.expires_at)),
            visit_count: 0,
        }
    }
}

impl From<UrlDocument> for ShortUrl {
    fn from(d: UrlDocument) -> Self {
        ShortUrl {
            id: d.id.to_hex(),
            short_code: d.short_code,
            original_url: d.original_url,
            owner_id: UserId::from(d.user_id),
            created_at: from_bson_datetime(d.created_at),
            expires_at: d.expires_at.map(from_bson_datetime),
            visit_count: d.visit_count.max(0) as u64,
        }
    }
}

/// MongoDB repository for short URL records.
///
/// Resolution uses `findOneAndUpdate` with `$inc`, so the increment and the
/// returned document come from one atomic server-side operation.
pub struct MongoShortUrlRepository {
    db: Database,
    urls: Collection<UrlDocument>,
}

impl MongoShortUrlRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            db: db.clone(),
            urls: db.collection(URLS_COLLECTION),
        }
    }
}

#[async_trait]
impl ShortUrlRepository for MongoShortUrlRepository {
    async fn insert(&self, new_url: NewShortUrl) -> CoreResult<ShortUrl> {
        let document = UrlDocument::from_new(ObjectId::new(), &new_url);

        self.urls
            .insert_one(&document)
            .await
            .map_err(|e| classify(e, &["short_code"]))?;

        Ok(document.into())
    }

    async fn resolve(&self, code: &str, now: DateTime<Utc>) -> CoreResult<Option<ShortUrl>> {
        let filter = doc! {
            "short_code": code,
            "$or": [
                { "expires_at": { "$gt": to_bson_datetime(now) } },
                { "expires_at": null },
            ],
        };

        let updated = self
            .urls
            .find_one_and_update(filter, doc! { "$inc": { "visit_count": 1_i64 } })
            .return_document(ReturnDocument::After)
            .await
            .map_err(|e| classify(e, &[]))?;

        Ok(updated.map(ShortUrl::from))
    }

    async fn find_by_code(&self, code: &str) -> CoreResult<Option<ShortUrl>> {
        let found = self
            .urls
            .find_one(doc! { "short_code": code })
            .await
            .map_err(|e| classify(e, &[]))?;

        Ok(found.map(ShortUrl::from))
    }

    async fn list_by_owner(&self, owner: &UserId) -> CoreResult<Vec<ShortUrl>> {
        let cursor = self
            .urls
            .find(doc! { "user_id": owner.as_object_id() })
            .await
            .map_err(|e| classify(e, &[]))?;

        let documents: Vec<UrlDocument> =
            cursor.try_collect().await.map_err(|e| classify(e, &[]))?;

        Ok(documents.into_iter().map(ShortUrl::from).collect())
    }

    async fn delete(&self, code: &str) -> CoreResult<bool> {
        let result = self
            .urls
            .delete_one(doc! { "short_code": code })
            .await
            .map_err(|e| classify(e, &[]))?;

        Ok(result.deleted_count > 0)
    }

    async fn latest_in_range(&self, ids: RangeInclusive<u64>) -> CoreResult<Option<ShortUrl>> {
        let mut cursor = self
            .urls
            .find(range_filter(&ids))
            .sort(doc! { "created_at": -1, "_id": -1 })
            .await
            .map_err(|e| classify(e, &[]))?;

        while let Some(document) = cursor.try_next().await.map_err(|e| classify(e, &[]))? {
            if base62::decode(&document.short_code).is_ok_and(|id| ids.contains(&id)) {
                return Ok(Some(document.into()));
            }
        }

        Ok(None)
    }

    async fn ping(&self) -> CoreResult<()> {
        ping(&self.db).await
    }
}

/// Narrows the scan to codes between the encoded bounds.
///
/// Base62 digits sort in ASCII order, so same-length codes compare like their
/// numbers. When the bounds differ in length no string bound is usable and
/// the caller filters every document.
fn range_filter(ids: &RangeInclusive<u64>) -> mongodb::bson::Document {
    let low = base62::encode(*ids.start());
    let high = base62::encode(*ids.end());

    if low.len() == high.len() {
        doc! { "short_code": { "$gte": low, "$lte": high } }
    } else {
        doc! {}
    }
}
