use std::{sync::Arc, time::Duration};

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod config;
mod error;
mod middleware;
mod models;
mod rate_limiter;
mod repositories;
mod routes;
mod session;
mod state;

use common::{
    cache::{RedisConfig, RedisPool},
    database::{DatabaseConfig, init_pool},
};
use feed::FeedService;
use tokio::net::TcpListener;

use crate::{
    config::{AppConfig, RateLimitBackendKind},
    rate_limiter::{
        MemoryRateLimitStore, RateLimitBackend, RateLimiter, RateLimiterConfig,
        RedisRateLimitStore,
    },
    repositories::{PgRecipeStore, SessionRepository},
    session::SessionPolicy,
    state::AppState,
};

const EVICTION_PERIOD: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting feed API service");

    let config = AppConfig::load()?;

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    // Check database connectivity
    if common::database::health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    let rate_limiter = RateLimiter::new(
        RateLimiterConfig::from(&config.rate_limit),
        rate_limit_backend(config.rate_limit.backend).await?,
    );
    if let RateLimitBackend::Memory(store) = rate_limiter.store() {
        store.spawn_eviction(EVICTION_PERIOD);
    }
    info!(
        backend = ?rate_limiter.store().kind(),
        max_requests = rate_limiter.config().max_requests,
        window_seconds = rate_limiter.config().window_seconds,
        "Rate limiter initialized"
    );

    let app_state = AppState {
        db_pool: pool.clone(),
        feed: FeedService::new(PgRecipeStore::new(pool.clone())),
        session_repository: SessionRepository::new(pool),
        session_policy: SessionPolicy::from(&config.session),
        rate_limiter,
        config: Arc::new(config.clone()),
    };

    // Start the web server
    let app = routes::create_router(app_state);

    let listener = TcpListener::bind(&config.server.bind_address).await?;
    info!("Feed API service listening on {}", config.server.bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}

async fn rate_limit_backend(kind: RateLimitBackendKind) -> Result<RateLimitBackend> {
    match kind {
        RateLimitBackendKind::Memory => Ok(RateLimitBackend::Memory(MemoryRateLimitStore::new())),
        RateLimitBackendKind::Redis => {
            let redis_pool = RedisPool::new(&RedisConfig::from_env()?).await?;
            if !redis_pool.health_check().await? {
                anyhow::bail!("Failed to connect to Redis");
            }
            info!("Redis connection successful");
            Ok(RateLimitBackend::Redis(RedisRateLimitStore::new(redis_pool)))
        }
    }
}
