#![allow(dead_code)]

use axum_test::TestServer;
use std::sync::Arc;
use std::time::Duration;

use linkpress::application::services::{
    AuthService, DirectUserAccessor, FixedWindowLimiter, LinkService, LinkServiceConfig,
    RateLimitConfig, TokenSigner, UserAccessor,
};
use linkpress::domain::entities::{NewUser, User};
use linkpress::domain::repositories::{ShortUrlRepository, UserRepository};
use linkpress::infrastructure::persistence::{InMemoryShortUrlRepository, InMemoryUserRepository};
use linkpress::routes::router;
use linkpress::state::AppState;
use linkpress::utils::code_generator::SequenceGenerator;

pub const SIGNING_SECRET: &str = "test-signing-secret";
pub const MACHINE_ID: u64 = 164;

/// In-memory application with handles on its backends.
pub struct TestApp {
    pub state: AppState,
    pub urls: Arc<InMemoryShortUrlRepository>,
    pub users: Arc<InMemoryUserRepository>,
    pub signer: TokenSigner,
}

impl TestApp {
    pub fn new() -> Self {
        Self::build(None)
    }

    /// App with rate limiting on, keyed by `X-Forwarded-For`.
    pub fn with_rate_limit(limit: u32, window: Duration) -> Self {
        Self::build(Some(RateLimitConfig {
            limit,
            window,
            max_keys: 1000,
        }))
    }

    fn build(rate_limit: Option<RateLimitConfig>) -> Self {
        let urls = Arc::new(InMemoryShortUrlRepository::new());
        let users = Arc::new(InMemoryUserRepository::new());
        let signer = TokenSigner::new(SIGNING_SECRET).unwrap();

        let url_repository: Arc<dyn ShortUrlRepository> = urls.clone();
        let link_service = Arc::new(LinkService::new(
            url_repository,
            Arc::new(SequenceGenerator::new(MACHINE_ID)),
            LinkServiceConfig::default(),
        ));

        let accessor: Arc<dyn UserAccessor> = Arc::new(DirectUserAccessor::new(
            users.clone(),
            Duration::from_secs(5),
        ));
        let auth_service = Arc::new(AuthService::new(accessor.clone(), signer.clone()));

        let mut state =
            AppState::new(link_service, accessor, auth_service).with_app_env("test");

        if let Some(config) = rate_limit {
            state = state
                .with_rate_limiter(Arc::new(FixedWindowLimiter::new(config)))
                .with_behind_proxy(true);
        }

        Self {
            state,
            urls,
            users,
            signer,
        }
    }

    pub fn server(&self) -> TestServer {
        TestServer::new(router(self.state.clone())).unwrap()
    }

    /// Registers a user and returns it with a valid bearer token.
    pub async fn create_user(&self, username: &str) -> (User, String) {
        let user = self
            .users
            .create(NewUser {
                username: username.to_string(),
                email: format!("{username}@example.com"),
                password_hash: None,
            })
            .await
            .unwrap();
        let token = self.signer.issue(&user.id);

        (user, token)
    }
}
