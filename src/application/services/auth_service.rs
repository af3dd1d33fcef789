//! Bearer token issuance and verification.
//!
//! Tokens have the form `<user_id_hex>.<mac_hex>`, where the MAC is
//! HMAC-SHA256 of the user id keyed by the server signing secret. Nothing is
//! stored server-side; revoking a user means deactivating them.

use hmac::{Hmac, Mac};
use serde_json::json;
use sha2::Sha256;
use std::sync::Arc;

use crate::application::services::user_accessor::UserAccessor;
use crate::domain::entities::{User, UserId};
use crate::domain::errors::CoreError;
use crate::error::AppError;

type HmacSha256 = Hmac<Sha256>;

/// Token verification failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("signing secret rejected")]
    InvalidKey,

    #[error("malformed token")]
    Malformed,

    #[error("invalid token signature")]
    BadSignature,
}

/// Signs and verifies user tokens with a shared secret.
#[derive(Clone)]
pub struct TokenSigner {
    mac: HmacSha256,
}

impl TokenSigner {
    /// Creates a signer keyed by `secret`.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::InvalidKey`] if the MAC rejects the key.
    pub fn new(secret: &str) -> Result<Self, TokenError> {
        let mac = HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| TokenError::InvalidKey)?;
        Ok(Self { mac })
    }

    /// Issues a token for `user_id`.
    pub fn issue(&self, user_id: &UserId) -> String {
        let subject = user_id.to_hex();
        let mut mac = self.mac.clone();
        mac.update(subject.as_bytes());
        format!("{}.{}", subject, hex::encode(mac.finalize().into_bytes()))
    }

    /// Verifies `token` and returns the user id it was issued for.
    ///
    /// The signature comparison is constant-time.
    pub fn verify(&self, token: &str) -> Result<UserId, TokenError> {
        let (subject, signature) = token.split_once('.').ok_or(TokenError::Malformed)?;
        let user_id: UserId = subject.parse().map_err(|_| TokenError::Malformed)?;
        let signature = hex::decode(signature).map_err(|_| TokenError::Malformed)?;

        let mut mac = self.mac.clone();
        mac.update(subject.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| TokenError::BadSignature)?;

        Ok(user_id)
    }
}

/// Service for authenticating API requests via Bearer tokens.
///
/// A verified token is resolved to a user through the [`UserAccessor`], so the
/// lookup goes through the user cache when one is configured.
pub struct AuthService<A: UserAccessor + ?Sized> {
    accessor: Arc<A>,
    signer: TokenSigner,
}

impl<A: UserAccessor + ?Sized> AuthService<A> {
    pub fn new(accessor: Arc<A>, signer: TokenSigner) -> Self {
        Self { accessor, signer }
    }

    pub fn signer(&self) -> &TokenSigner {
        &self.signer
    }

    /// Authenticates a raw token and returns the caller.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] if:
    /// - The token is malformed or its signature does not match
    /// - The user no longer exists
    /// - The user is inactive
    ///
    /// Cache and storage failures are not reported as 401; they keep their
    /// own mapping (503 / 500).
    pub async fn authenticate(&self, token: &str) -> Result<User, AppError> {
        let user_id = self.signer.verify(token).map_err(|e| {
            AppError::unauthorized("Unauthorized", json!({ "reason": e.to_string() }))
        })?;

        let user = match self.accessor.get(&user_id).await {
            Ok(user) => user,
            Err(CoreError::NotFound(_)) => {
                return Err(AppError::unauthorized(
                    "Unauthorized",
                    json!({ "reason": "Unknown user" }),
                ));
            }
            Err(e) => return Err(e.into()),
        };

        if !user.is_active {
            return Err(AppError::unauthorized(
                "Unauthorized",
                json!({ "reason": "User is inactive" }),
            ));
        }

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::CoreResult;
    use async_trait::async_trait;
    use chrono::Utc;

    fn signer() -> TokenSigner {
        TokenSigner::new("test-signing-secret").unwrap()
    }

    fn user(is_active: bool) -> User {
        User {
            id: UserId::new(),
            username: "linus".to_string(),
            email: "linus@example.com".to_string(),
            password_hash: None,
            created_at: Utc::now(),
            is_active,
        }
    }

    struct FixedAccessor(CoreResult<User>);

    #[async_trait]
    impl UserAccessor for FixedAccessor {
        async fn get(&self, _id: &UserId) -> CoreResult<User> {
            self.0.clone()
        }

        async fn set(&self, _user: &User) -> CoreResult<()> {
            Ok(())
        }

        async fn invalidate(&self, _id: &UserId) -> CoreResult<()> {
            Ok(())
        }

        async fn cache_healthy(&self) -> Option<bool> {
            None
        }
    }

    fn service(result: CoreResult<User>) -> AuthService<FixedAccessor> {
        AuthService::new(Arc::new(FixedAccessor(result)), signer())
    }

    #[test]
    fn test_issue_then_verify() {
        let id = UserId::new();
        let token = signer().issue(&id);

        assert!(token.starts_with(&id.to_hex()));
        assert_eq!(token.len(), 24 + 1 + 64);
        assert_eq!(signer().verify(&token).unwrap(), id);
    }

    #[test]
    fn test_verify_rejects_tampering() {
        let id = UserId::new();
        let token = signer().issue(&id);
        let (_, signature) = token.split_once('.').unwrap();

        let forged = format!("{}.{}", UserId::new(), signature);
        assert_eq!(signer().verify(&forged), Err(TokenError::BadSignature));
    }

    #[test]
    fn test_verify_rejects_other_secret() {
        let id = UserId::new();
        let token = TokenSigner::new("secret-a").unwrap().issue(&id);

        assert_eq!(
            TokenSigner::new("secret-b").unwrap().verify(&token),
            Err(TokenError::BadSignature)
        );
    }

    #[test]
    fn test_verify_rejects_malformed() {
        for token in ["", "no-dot", "zz.abcd", "66f0c0ffee.zz"] {
            assert_eq!(signer().verify(token), Err(TokenError::Malformed), "{token}");
        }
    }

    #[tokio::test]
    async fn test_authenticate_success() {
        let u = user(true);
        let token = signer().issue(&u.id);

        let authed = service(Ok(u.clone())).authenticate(&token).await.unwrap();
        assert_eq!(authed, u);
    }

    #[tokio::test]
    async fn test_authenticate_bad_token() {
        let err = service(Ok(user(true)))
            .authenticate("garbage")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized { .. }));
    }

    #[tokio::test]
    async fn test_authenticate_unknown_or_inactive_user() {
        let u = user(false);
        let token = signer().issue(&u.id);

        let err = service(Ok(u)).authenticate(&token).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized { .. }));

        let err = service(Err(CoreError::not_found("user")))
            .authenticate(&token)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized { .. }));
    }

    #[tokio::test]
    async fn test_authenticate_cache_failure_is_not_unauthorized() {
        let token = signer().issue(&UserId::new());

        let err = service(Err(CoreError::cache("down")))
            .authenticate(&token)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ServiceUnavailable { .. }));
    }
}
