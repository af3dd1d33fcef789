//! HTTP server initialization and runtime setup.
//!
//! Handles logging, database connections, cache selection, background
//! sweeping, and the Axum server lifecycle.

use crate::application::services::{
    AuthService, CachedUserAccessor, DirectUserAccessor, FixedWindowLimiter, LinkService,
    TokenSigner, UserAccessor, resume_generator,
};
use crate::config::Config;
use crate::domain::repositories::ShortUrlRepository;
use crate::infrastructure::cache::RedisUserCache;
use crate::infrastructure::persistence::{MongoShortUrlRepository, MongoUserRepository, mongo};
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing_subscriber::EnvFilter;

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` takes precedence; otherwise `config.log_level` is used.
/// `LOG_FORMAT=json` switches to one JSON object per line.
pub fn init_tracing(config: &Config) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    if config.log_format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - MongoDB client, ping and index bootstrap
/// - User accessor (Redis cache-aside or direct, per `REDIS_ENABLED`)
/// - Token signer and code generator, resumed from the stored partition
/// - Rate limiter and its sweep task
/// - Axum HTTP server with graceful shutdown
///
/// # Errors
///
/// Returns an error if:
/// - MongoDB is unreachable or index creation fails
/// - Redis is enabled but unreachable
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let db = mongo::connect(&config.mongo_settings())
        .await
        .context("Failed to connect to MongoDB")?;

    mongo::ensure_indexes(&db)
        .await
        .context("Failed to create indexes")?;

    let url_repository: Arc<dyn ShortUrlRepository> = Arc::new(MongoShortUrlRepository::new(&db));
    let user_repository = Arc::new(MongoUserRepository::new(&db));

    let user_accessor: Arc<dyn UserAccessor> = if config.redis_enabled {
        let cache = RedisUserCache::connect(&config.redis_url, config.user_cache_ttl())
            .await
            .context("Failed to connect to Redis")?;
        tracing::info!("User cache enabled (Redis)");
        Arc::new(CachedUserAccessor::new(
            user_repository,
            Arc::new(cache),
            config.query_timeout(),
        ))
    } else {
        tracing::info!("User cache disabled");
        Arc::new(DirectUserAccessor::new(
            user_repository,
            config.query_timeout(),
        ))
    };

    let signer = TokenSigner::new(&config.token_signing_secret)
        .context("Invalid TOKEN_SIGNING_SECRET")?;
    let auth_service = Arc::new(AuthService::new(user_accessor.clone(), signer));

    let generator = resume_generator(
        url_repository.as_ref(),
        config.machine_id,
        config.query_timeout(),
    )
    .await
    .context("Failed to resume the code sequence")?;
    let generator = Arc::new(generator);
    let link_service = Arc::new(LinkService::new(
        url_repository,
        generator,
        config.link_service_config(),
    ));

    let mut state = AppState::new(link_service, user_accessor, auth_service)
        .with_behind_proxy(config.behind_proxy)
        .with_app_env(config.app_env.clone());

    let sweeper = if config.rate_limiter_enabled {
        let limiter = Arc::new(FixedWindowLimiter::new(config.rate_limit_config()));
        let handle = spawn_limiter_sweep(limiter.clone());
        state = state.with_rate_limiter(limiter);
        Some(handle)
    } else {
        None
    };

    let app = app_router(state);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    if let Some(handle) = sweeper {
        handle.abort();
    }
    tracing::info!("Server stopped");

    Ok(())
}

/// Drops stale rate limit windows once per window length.
fn spawn_limiter_sweep(limiter: Arc<FixedWindowLimiter>) -> JoinHandle<()> {
    let period = limiter.config().window;

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            limiter.sweep_expired();
        }
    })
}

/// Resolves on Ctrl-C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl-C, shutting down"),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
