//! Repository trait for user records.

use crate::domain::entities::{NewUser, User, UserId};
use crate::domain::errors::CoreResult;
use async_trait::async_trait;

/// Repository interface for registered users.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::MongoUserRepository`] - MongoDB implementation
/// - [`crate::infrastructure::persistence::InMemoryUserRepository`] - process-local store
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Registers a new active user.
    ///
    /// # Errors
    ///
    /// Returns `Conflict` if the email or username is already registered.
    async fn create(&self, new_user: NewUser) -> CoreResult<User>;

    /// Finds a user by id.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(User))` if found
    /// - `Ok(None)` if not found
    async fn find_by_id(&self, id: &UserId) -> CoreResult<Option<User>>;

    /// Finds a user by email address.
    async fn find_by_email(&self, email: &str) -> CoreResult<Option<User>>;
}
