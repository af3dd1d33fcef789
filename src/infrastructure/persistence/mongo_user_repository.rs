//! MongoDB implementation of the user repository.

use async_trait::async_trait;
use chrono::Utc;
use mongodb::bson::{DateTime as BsonDateTime, doc, oid::ObjectId};
use mongodb::{Collection, Database};
use serde::{Deserialize, Serialize};

use super::mongo::{USERS_COLLECTION, classify, from_bson_datetime, to_bson_datetime};
use crate::domain::entities::{NewUser, User, UserId};
use crate::domain::errors::CoreResult;
use crate::domain::repositories::UserRepository;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct UserDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    username: String,
    email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    password_hash: Option<String>,
    created_at: BsonDateTime,
    #[serde(default = "default_active")]
    is_active: bool,
}

fn default_active() -> bool {
    true
}

impl From<UserDocument> for User {
    fn from(d: UserDocument) -> Self {
        User {
            id: UserId::from(d.id),
            username: d.username,
            email: d.email,
            password_hash: d.password_hash,
            created_at: from_bson_datetime(d.created_at),
            is_active: d.is_active,
        }
    }
}

/// MongoDB repository for users.
///
/// Email and username uniqueness is enforced by the `unique_email` and
/// `unique_username` indexes.
pub struct MongoUserRepository {
    users: Collection<UserDocument>,
}

impl MongoUserRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            users: db.collection(USERS_COLLECTION),
        }
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    async fn create(&self, new_user: NewUser) -> CoreResult<User> {
        let document = UserDocument {
            id: ObjectId::new(),
            username: new_user.username,
            email: new_user.email,
            password_hash: new_user.password_hash,
            created_at: to_bson_datetime(Utc::now()),
            is_active: true,
        };

        self.users
            .insert_one(&document)
            .await
            .map_err(|e| classify(e, &["email", "username"]))?;

        Ok(document.into())
    }

    async fn find_by_id(&self, id: &UserId) -> CoreResult<Option<User>> {
        let found = self
            .users
            .find_one(doc! { "_id": id.as_object_id() })
            .await
            .map_err(|e| classify(e, &[]))?;

        Ok(found.map(User::from))
    }

    async fn find_by_email(&self, email: &str) -> CoreResult<Option<User>> {
        let found = self
            .users
            .find_one(doc! { "email": email })
            .await
            .map_err(|e| classify(e, &[]))?;

        Ok(found.map(User::from))
    }
}
