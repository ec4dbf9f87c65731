//! Fixed-window rate limiter for authenticated feed requests
//!
//! Each identifier gets `max_requests` hits per window. The window opens on
//! the first hit and closes `window_seconds` later. Counting lives behind
//! [`RateLimitStore`] so it can run per process or be shared through Redis.

use anyhow::Result;
use common::cache::RedisPool;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::{sync::Mutex, task::JoinHandle};
use tracing::debug;

use crate::config::{RateLimitBackendKind, RateLimitConfig};

/// Rate limiter configuration
#[derive(Debug, Clone)]
pub struct RateLimiterConfig {
    /// Requests allowed per window
    pub max_requests: u32,
    /// Window length in seconds
    pub window_seconds: u64,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            max_requests: 60,
            window_seconds: 60,
        }
    }
}

impl From<&RateLimitConfig> for RateLimiterConfig {
    fn from(config: &RateLimitConfig) -> Self {
        Self {
            max_requests: config.max_requests,
            window_seconds: config.window_seconds,
        }
    }
}

/// Outcome of a single [`RateLimiter::check`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub limit: u32,
    /// Requests left in the current window
    pub remaining: u32,
    /// Set only when the request was refused
    pub retry_after_seconds: Option<u64>,
}

/// Counter state after recording one hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowHit {
    /// Hits in the current window, including this one
    pub count: u64,
    /// Time until the current window closes
    pub resets_in: Duration,
}

/// Records hits against fixed windows
pub trait RateLimitStore: Send + Sync {
    fn hit(&self, key: &str, window: Duration) -> impl Future<Output = Result<WindowHit>> + Send;
}

/// Time source for the in-memory store
pub trait Clock: Send + Sync + fmt::Debug {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

#[derive(Debug)]
struct WindowEntry {
    count: u64,
    resets_at: Instant,
}

/// Per-process window counters
#[derive(Debug, Clone)]
pub struct MemoryRateLimitStore {
    clock: Arc<dyn Clock>,
    entries: Arc<Mutex<HashMap<String, WindowEntry>>>,
}

impl Default for MemoryRateLimitStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryRateLimitStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Drop windows that have closed, returning how many were removed
    pub async fn evict_expired(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.resets_at > now);
        before - entries.len()
    }

    /// Run [`evict_expired`](Self::evict_expired) every `period`
    pub fn spawn_eviction(&self, period: Duration) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                let evicted = store.evict_expired().await;
                if evicted > 0 {
                    debug!(evicted, "Evicted closed rate limit windows");
                }
            }
        })
    }
}

impl RateLimitStore for MemoryRateLimitStore {
    async fn hit(&self, key: &str, window: Duration) -> Result<WindowHit> {
        let now = self.clock.now();
        let mut entries = self.entries.lock().await;

        let entry = entries.entry(key.to_string()).or_insert(WindowEntry {
            count: 0,
            resets_at: now + window,
        });

        if now >= entry.resets_at {
            entry.count = 0;
            entry.resets_at = now + window;
        }

        entry.count += 1;

        Ok(WindowHit {
            count: entry.count,
            resets_in: entry.resets_at.saturating_duration_since(now),
        })
    }
}

/// Window counters shared by every instance through Redis
#[derive(Clone)]
pub struct RedisRateLimitStore {
    pool: RedisPool,
}

impl RedisRateLimitStore {
    pub fn new(pool: RedisPool) -> Self {
        Self { pool }
    }
}

impl RateLimitStore for RedisRateLimitStore {
    async fn hit(&self, key: &str, window: Duration) -> Result<WindowHit> {
        let redis_key = format!("rate_limit:{}", key);
        let (count, ttl) = self
            .pool
            .incr_window(&redis_key, window.as_secs().max(1))
            .await?;

        Ok(WindowHit {
            count,
            resets_in: Duration::from_secs(ttl),
        })
    }
}

/// Store selected at startup
#[derive(Clone)]
pub enum RateLimitBackend {
    Memory(MemoryRateLimitStore),
    Redis(RedisRateLimitStore),
}

impl RateLimitBackend {
    pub fn kind(&self) -> RateLimitBackendKind {
        match self {
            RateLimitBackend::Memory(_) => RateLimitBackendKind::Memory,
            RateLimitBackend::Redis(_) => RateLimitBackendKind::Redis,
        }
    }
}

impl RateLimitStore for RateLimitBackend {
    async fn hit(&self, key: &str, window: Duration) -> Result<WindowHit> {
        match self {
            RateLimitBackend::Memory(store) => store.hit(key, window).await,
            RateLimitBackend::Redis(store) => store.hit(key, window).await,
        }
    }
}

/// Rate limiter
#[derive(Clone)]
pub struct RateLimiter<S> {
    config: RateLimiterConfig,
    store: S,
}

impl<S: RateLimitStore> RateLimiter<S> {
    pub fn new(config: RateLimiterConfig, store: S) -> Self {
        Self { config, store }
    }

    /// Record one request for `identifier` and decide whether it may proceed
    pub async fn check(&self, identifier: &str) -> Result<RateLimitDecision> {
        let window = Duration::from_secs(self.config.window_seconds);
        let hit = self.store.hit(identifier, window).await?;
        let limit = self.config.max_requests;

        if hit.count > u64::from(limit) {
            let retry_after = hit.resets_in.as_secs_f64().ceil() as u64;
            return Ok(RateLimitDecision {
                allowed: false,
                limit,
                remaining: 0,
                retry_after_seconds: Some(retry_after.max(1)),
            });
        }

        Ok(RateLimitDecision {
            allowed: true,
            limit,
            remaining: limit - hit.count as u32,
            retry_after_seconds: None,
        })
    }

    /// Get the rate limiter configuration
    pub fn config(&self) -> &RateLimiterConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
