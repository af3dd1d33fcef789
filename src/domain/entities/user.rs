//! User entity read by the identity lookup path.

use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Datastore-native user identifier.
///
/// Serialized as a 24-character lowercase hex string, which is also the form
/// embedded in bearer tokens and cache keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserId(ObjectId);

impl UserId {
    /// Generates a fresh identifier.
    pub fn new() -> Self {
        Self(ObjectId::new())
    }

    pub fn as_object_id(&self) -> ObjectId {
        self.0
    }

    pub fn to_hex(&self) -> String {
        self.0.to_hex()
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<ObjectId> for UserId {
    fn from(value: ObjectId) -> Self {
        Self(value)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_hex())
    }
}

/// Error returned when a string is not a valid user identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid user id: {0}")]
pub struct InvalidUserId(pub String);

impl FromStr for UserId {
    type Err = InvalidUserId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ObjectId::parse_str(s)
            .map(Self)
            .map_err(|_| InvalidUserId(s.to_string()))
    }
}

impl Serialize for UserId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_hex())
    }
}

impl<'de> Deserialize<'de> for UserId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A registered user.
///
/// The password hash is owned by the authentication subsystem. It is never
/// serialized, so cached copies and API responses do not carry it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    #[serde(skip, default)]
    pub password_hash: Option<String>,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
}

impl User {
    /// Returns the user as a cache holds it, without the password hash.
    pub fn without_secrets(mut self) -> Self {
        self.password_hash = None;
        self
    }
}

/// Input data for registering a user.
///
/// `created_at` and `is_active` are set by the repository.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_hex_roundtrip() {
        let id = UserId::new();
        let hex = id.to_string();

        assert_eq!(hex.len(), 24);
        assert_eq!(hex.parse::<UserId>().unwrap(), id);
    }

    #[test]
    fn test_user_id_rejects_garbage() {
        let err = "not-an-id".parse::<UserId>().unwrap_err();
        assert_eq!(err, InvalidUserId("not-an-id".to_string()));
    }

    #[test]
    fn test_user_serialization_skips_password_hash() {
        let user = User {
            id: UserId::new(),
            username: "gopher".to_string(),
            email: "gopher@example.com".to_string(),
            password_hash: Some("secret-hash".to_string()),
            created_at: Utc::now(),
            is_active: true,
        };

        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("secret-hash"));
        assert!(json.contains(&user.id.to_string()));

        let back: User = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, user.id);
        assert_eq!(back.email, user.email);
        assert!(back.password_hash.is_none());
    }
}
