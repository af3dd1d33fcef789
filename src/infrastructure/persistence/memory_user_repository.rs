//! Process-local user repository.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;

use crate::domain::entities::{NewUser, User, UserId};
use crate::domain::errors::{CoreError, CoreResult};
use crate::domain::repositories::UserRepository;

/// In-memory user store enforcing email and username uniqueness.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<UserId, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flips `is_active` for an existing user. Returns false if absent.
    pub fn set_active(&self, id: &UserId, is_active: bool) -> bool {
        match self.users.write().get_mut(id) {
            Some(user) => {
                user.is_active = is_active;
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, new_user: NewUser) -> CoreResult<User> {
        let mut users = self.users.write();

        if users.values().any(|u| u.email == new_user.email) {
            return Err(CoreError::conflict("email"));
        }
        if users.values().any(|u| u.username == new_user.username) {
            return Err(CoreError::conflict("username"));
        }

        let user = User {
            id: UserId::new(),
            username: new_user.username,
            email: new_user.email,
            password_hash: new_user.password_hash,
            created_at: Utc::now(),
            is_active: true,
        };
        users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn find_by_id(&self, id: &UserId) -> CoreResult<Option<User>> {
        Ok(self.users.read().get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> CoreResult<Option<User>> {
        Ok(self
            .users
            .read()
            .values()
            .find(|u| u.email == email)
            .cloned())
    }
}
