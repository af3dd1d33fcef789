//! MongoDB connection bootstrap, index management and error classification.

use std::time::Duration;

use mongodb::bson::{DateTime as BsonDateTime, doc};
use mongodb::error::{Error as MongoError, ErrorKind, WriteFailure};
use mongodb::options::{ClientOptions, IndexOptions};
use mongodb::{Client, Database, IndexModel};
use tracing::info;

use crate::domain::errors::{CoreError, CoreResult};

/// Collection holding short URL records.
pub const URLS_COLLECTION: &str = "urls";
/// Collection holding users.
pub const USERS_COLLECTION: &str = "users";

const DUPLICATE_KEY: i32 = 11000;

/// Pool settings applied when connecting.
#[derive(Debug, Clone)]
pub struct MongoSettings {
    pub url: String,
    pub database: String,
    pub max_pool_size: u32,
    pub max_idle_time: Duration,
    pub connect_timeout: Duration,
}

/// Connects to MongoDB, pings the server and returns the configured database.
///
/// # Errors
///
/// Returns [`CoreError::Storage`] if the URL cannot be parsed, the client
/// cannot be built, or the ping fails.
pub async fn connect(settings: &MongoSettings) -> CoreResult<Database> {
    let mut options = ClientOptions::parse(&settings.url)
        .await
        .map_err(|e| CoreError::storage(format!("Invalid MongoDB URL: {e}")))?;

    options.app_name = Some(env!("CARGO_PKG_NAME").to_string());
    options.max_pool_size = Some(settings.max_pool_size);
    options.max_idle_time = Some(settings.max_idle_time);
    options.connect_timeout = Some(settings.connect_timeout);
    options.server_selection_timeout = Some(settings.connect_timeout);

    let client = Client::with_options(options)
        .map_err(|e| CoreError::storage(format!("Failed to create MongoDB client: {e}")))?;
    let db = client.database(&settings.database);

    ping(&db).await?;
    info!("✓ Connected to MongoDB database '{}'", settings.database);

    Ok(db)
}

/// Runs the `ping` admin command against `db`.
pub async fn ping(db: &Database) -> CoreResult<()> {
    db.run_command(doc! { "ping": 1 })
        .await
        .map(|_| ())
        .map_err(|e| CoreError::storage(format!("MongoDB ping failed: {e}")))
}

/// Index definitions the repositories rely on.
///
/// Returned as `(collection, model)` pairs so the admin CLI can list them.
pub fn index_models() -> Vec<(&'static str, IndexModel)> {
    let unique = |name: &str| {
        IndexOptions::builder()
            .unique(true)
            .name(name.to_string())
            .build()
    };

    vec![
        (
            USERS_COLLECTION,
            IndexModel::builder()
                .keys(doc! { "email": 1 })
                .options(unique("unique_email"))
                .build(),
        ),
        (
            USERS_COLLECTION,
            IndexModel::builder()
                .keys(doc! { "username": 1 })
                .options(unique("unique_username"))
                .build(),
        ),
        (
            URLS_COLLECTION,
            IndexModel::builder()
                .keys(doc! { "short_code": 1 })
                .options(unique("unique_short_code"))
                .build(),
        ),
        (
            URLS_COLLECTION,
            IndexModel::builder()
                .keys(doc! { "user_id": 1 })
                .options(IndexOptions::builder().name("by_user_id".to_string()).build())
                .build(),
        ),
        (
            URLS_COLLECTION,
            IndexModel::builder()
                .keys(doc! { "expires_at": 1 })
                .options(
                    IndexOptions::builder()
                        .name("expires_index".to_string())
                        .expire_after(Duration::from_secs(0))
                        .build(),
                )
                .build(),
        ),
    ]
}

/// Creates every index from [`index_models`]. Existing identical indexes are
/// left untouched by the server.
pub async fn ensure_indexes(db: &Database) -> CoreResult<()> {
    for (collection, model) in index_models() {
        let name = model
            .options
            .as_ref()
            .and_then(|o| o.name.clone())
            .unwrap_or_default();

        db.collection::<mongodb::bson::Document>(collection)
            .create_index(model)
            .await
            .map_err(|e| CoreError::storage(format!("Failed to create index {name}: {e}")))?;

        info!("Index ensured: {}.{}", collection, name);
    }
    Ok(())
}

/// Returns true if `err` is a duplicate key violation.
pub fn is_duplicate_key(err: &MongoError) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(we)) => we.code == DUPLICATE_KEY,
        ErrorKind::Command(ce) => ce.code == DUPLICATE_KEY,
        _ => false,
    }
}

/// Classifies a driver error: duplicate keys become `Conflict` naming the
/// first of `fields` mentioned in the server message, anything else `Storage`.
pub fn classify(err: MongoError, fields: &[&str]) -> CoreError {
    if is_duplicate_key(&err) {
        let message = err.to_string();
        let field = fields
            .iter()
            .find(|f| message.contains(*f))
            .or(fields.first())
            .copied()
            .unwrap_or("key");
        return CoreError::conflict(field);
    }

    tracing::error!("MongoDB error: {}", err);
    CoreError::storage(err)
}

pub(crate) fn to_bson_datetime(dt: chrono::DateTime<chrono::Utc>) -> BsonDateTime {
    BsonDateTime::from_millis(dt.timestamp_millis())
}

pub(crate) fn from_bson_datetime(dt: BsonDateTime) -> chrono::DateTime<chrono::Utc> {
    chrono::DateTime::from_timestamp_millis(dt.timestamp_millis()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_index_names() {
        let names: Vec<(&str, String)> = index_models()
            .into_iter()
            .map(|(c, m)| (c, m.options.and_then(|o| o.name).unwrap_or_default()))
            .collect();

        assert_eq!(
            names,
            vec![
                ("users", "unique_email".to_string()),
                ("users", "unique_username".to_string()),
                ("urls", "unique_short_code".to_string()),
                ("urls", "by_user_id".to_string()),
                ("urls", "expires_index".to_string()),
            ]
        );
    }

    #[test]
    fn test_ttl_index_expires_immediately() {
        let (_, model) = index_models().pop().unwrap();
        let options = model.options.unwrap();
        assert_eq!(options.expire_after, Some(Duration::from_secs(0)));
    }

    #[test]
    fn test_datetime_conversion_keeps_millis() {
        let dt = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap()
            + chrono::Duration::milliseconds(123);
        assert_eq!(from_bson_datetime(to_bson_datetime(dt)), dt);
    }
}
