//! Service settings
//!
//! Loaded from `NUTRIBUD_`-prefixed environment variables, with `__`
//! separating nested keys:
//!
//! - `NUTRIBUD_SERVER__BIND_ADDRESS` (default `0.0.0.0:3001`)
//! - `NUTRIBUD_FEED__PAGE_SIZE` (default `3`)
//! - `NUTRIBUD_SESSION__COOKIE_NAME` (default `auth_session`)
//! - `NUTRIBUD_SESSION__LIFETIME_DAYS` (default `14`)
//! - `NUTRIBUD_SESSION__SECURE_COOKIE` (default `false`)
//! - `NUTRIBUD_RATE_LIMIT__MAX_REQUESTS` (default `60`)
//! - `NUTRIBUD_RATE_LIMIT__WINDOW_SECONDS` (default `60`)
//! - `NUTRIBUD_RATE_LIMIT__BACKEND`: `memory` or `redis` (default `memory`)
//!
//! Database and Redis connection settings are read by `common`.

use config::{Config, ConfigError, Environment};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub feed: FeedConfig,
    pub session: SessionConfig,
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub bind_address: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    /// Recipes per feed page
    pub page_size: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub cookie_name: String,
    pub lifetime_days: i64,
    pub secure_cookie: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    pub max_requests: u32,
    pub window_seconds: u64,
    pub backend: RateLimitBackendKind,
}

/// Where rate limit windows are counted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RateLimitBackendKind {
    /// Per-process counters
    Memory,
    /// Counters shared through Redis
    Redis,
}

impl AppConfig {
    /// Load settings from the process environment
    pub fn load() -> Result<Self, ConfigError> {
        let config: AppConfig = Config::builder()
            .set_default("server.bind_address", "0.0.0.0:3001")?
            .set_default("feed.page_size", 3_i64)?
            .set_default("session.cookie_name", "auth_session")?
            .set_default("session.lifetime_days", 14_i64)?
            .set_default("session.secure_cookie", false)?
            .set_default("rate_limit.max_requests", 60_i64)?
            .set_default("rate_limit.window_seconds", 60_i64)?
            .set_default("rate_limit.backend", "memory")?
            .add_source(
                Environment::with_prefix("NUTRIBUD")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.feed.page_size == 0 {
            return Err(ConfigError::Message(
                "feed.page_size must be at least 1".to_string(),
            ));
        }
        if self.session.lifetime_days <= 0 {
            return Err(ConfigError::Message(
                "session.lifetime_days must be positive".to_string(),
            ));
        }
        if self.rate_limit.max_requests == 0 || self.rate_limit.window_seconds == 0 {
            return Err(ConfigError::Message(
                "rate_limit.max_requests and rate_limit.window_seconds must be positive"
                    .to_string(),
            ));
        }
        Ok(())
    }
}
