//! Shared application state injected into every handler and middleware.

use std::sync::Arc;

use crate::application::services::{
    AuthService, FixedWindowLimiter, LinkService, UserAccessor,
};
use crate::domain::repositories::ShortUrlRepository;

#[derive(Clone)]
pub struct AppState {
    pub link_service: Arc<LinkService<dyn ShortUrlRepository>>,
    pub user_accessor: Arc<dyn UserAccessor>,
    pub auth_service: Arc<AuthService<dyn UserAccessor>>,
    /// `None` when admission control is disabled.
    pub rate_limiter: Option<Arc<FixedWindowLimiter>>,
    /// Read client keys from `X-Forwarded-For` / `X-Real-IP`.
    pub behind_proxy: bool,
    pub app_env: String,
}

impl AppState {
    /// Builds state with rate limiting disabled and the `development` env.
    pub fn new(
        link_service: Arc<LinkService<dyn ShortUrlRepository>>,
        user_accessor: Arc<dyn UserAccessor>,
        auth_service: Arc<AuthService<dyn UserAccessor>>,
    ) -> Self {
        Self {
            link_service,
            user_accessor,
            auth_service,
            rate_limiter: None,
            behind_proxy: false,
            app_env: "development".to_string(),
        }
    }

    pub fn with_rate_limiter(mut self, limiter: Arc<FixedWindowLimiter>) -> Self {
        self.rate_limiter = Some(limiter);
        self
    }

    pub fn with_behind_proxy(mut self, behind_proxy: bool) -> Self {
        self.behind_proxy = behind_proxy;
        self
    }

    pub fn with_app_env(mut self, app_env: impl Into<String>) -> Self {
        self.app_env = app_env.into();
        self
    }
}
