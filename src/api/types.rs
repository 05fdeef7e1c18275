//! Shared types for the HTTP API layer.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use rusqlite::Connection;

use crate::api::error::ApiError;
use crate::config::AppConfig;
use crate::db::sqlite::open_database;

/// Requests allowed per client inside one window.
pub const RATE_LIMIT_MAX_REQUESTS: usize = 100;
/// Length of the rate-limit window (15 minutes).
pub const RATE_LIMIT_WINDOW_SECS: u64 = 15 * 60;

// ═══════════════════════════════════════════════════════════
// API context: shared state for the router
// ═══════════════════════════════════════════════════════════

/// Shared context for all API routes and middleware.
#[derive(Clone)]
pub struct ApiContext {
    pub database_path: Arc<PathBuf>,
    pub prediction_url: Arc<str>,
    pub prediction_timeout_secs: u64,
    pub rate_limiter: Arc<Mutex<RateLimiter>>,
}

impl ApiContext {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            database_path: Arc::new(config.database_path.clone()),
            prediction_url: Arc::from(config.prediction_url.as_str()),
            prediction_timeout_secs: config.prediction_timeout_secs,
            rate_limiter: Arc::new(Mutex::new(RateLimiter::new())),
        }
    }

    /// Open a connection for the current request.
    pub fn open_db(&self) -> Result<Connection, ApiError> {
        open_database(&self.database_path).map_err(ApiError::from)
    }
}

// ═══════════════════════════════════════════════════════════
// Rate limiter: per-client sliding window
// ═══════════════════════════════════════════════════════════

/// Per-client rate limiter over a single sliding window.
pub struct RateLimiter {
    windows: HashMap<String, Vec<Instant>>,
    max_requests: usize,
    window: Duration,
    last_sweep: Instant,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::with_limits(
            RATE_LIMIT_MAX_REQUESTS,
            Duration::from_secs(RATE_LIMIT_WINDOW_SECS),
        )
    }

    pub fn with_limits(max_requests: usize, window: Duration) -> Self {
        Self {
            windows: HashMap::new(),
            max_requests,
            window,
            last_sweep: Instant::now(),
        }
    }

    /// Check if a client is within its limit. Returns `Ok(())` or
    /// `Err(retry_after_secs)` if exceeded.
    pub fn check(&mut self, client: &str) -> Result<(), u64> {
        self.check_at(client, Instant::now())
    }

    fn check_at(&mut self, client: &str, now: Instant) -> Result<(), u64> {
        let window = self.window;
        if now.duration_since(self.last_sweep) >= window {
            self.sweep(now);
        }

        let entries = self.windows.entry(client.to_string()).or_default();
        entries.retain(|ts| now.duration_since(*ts) < window);

        if entries.len() >= self.max_requests {
            // Oldest entry leaves the window first
            let oldest = entries.first().copied().unwrap_or(now);
            let remaining = window.saturating_sub(now.duration_since(oldest));
            return Err(remaining.as_secs().max(1));
        }

        entries.push(now);
        Ok(())
    }

    /// Drop clients with no request inside the window. Runs at most once per window.
    fn sweep(&mut self, now: Instant) {
        let window = self.window;
        self.windows.retain(|_, entries| {
            entries.retain(|ts| now.duration_since(*ts) < window);
            !entries.is_empty()
        });
        self.last_sweep = now;
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}
