//! Application state shared across handlers

use std::sync::Arc;

use feed::FeedService;
use sqlx::PgPool;

use crate::{
    config::AppConfig,
    rate_limiter::{RateLimitBackend, RateLimiter},
    repositories::{PgRecipeStore, SessionRepository},
    session::SessionPolicy,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub feed: FeedService<PgRecipeStore>,
    pub session_repository: SessionRepository,
    pub session_policy: SessionPolicy,
    pub rate_limiter: RateLimiter<RateLimitBackend>,
    pub config: Arc<AppConfig>,
}
