//! Fixed-window admission control keyed by client.

use std::time::Duration;

use dashmap::DashMap;
use tokio::time::Instant;

use crate::domain::errors::{CoreError, CoreResult};

/// Limiter settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Requests admitted per window.
    pub limit: u32,
    /// Window length.
    pub window: Duration,
    /// Tracked keys that trigger a forced sweep.
    pub max_keys: usize,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            limit: 20,
            window: Duration::from_secs(5),
            max_keys: 100_000,
        }
    }
}

/// Outcome of [`FixedWindowLimiter::allow`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed { remaining: u32 },
    Rejected { retry_after: Duration },
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }

    /// Time until the window resets; zero when the request was allowed.
    pub fn retry_after(&self) -> Duration {
        match self {
            Self::Allowed { .. } => Duration::ZERO,
            Self::Rejected { retry_after } => *retry_after,
        }
    }

    pub fn into_result(self) -> CoreResult<()> {
        match self {
            Self::Allowed { .. } => Ok(()),
            Self::Rejected { retry_after } => Err(CoreError::LimitExceeded { retry_after }),
        }
    }
}

#[derive(Debug)]
struct Window {
    count: u32,
    started: Instant,
}

/// Per-key fixed-window counter.
///
/// State lives in memory only. Each key is updated under its map shard lock,
/// so concurrent calls for one key never lose a count. Stale windows are
/// dropped by [`FixedWindowLimiter::sweep_expired`]; `allow` also sweeps when
/// the map reaches `max_keys`, and rejects unseen keys if it is still full.
#[derive(Debug)]
pub struct FixedWindowLimiter {
    config: RateLimitConfig,
    windows: DashMap<String, Window>,
}

impl FixedWindowLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            windows: DashMap::new(),
        }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Number of keys currently tracked.
    pub fn tracked_keys(&self) -> usize {
        self.windows.len()
    }

    /// Counts one request for `key` and decides whether to admit it.
    pub fn allow(&self, key: &str) -> Decision {
        let now = Instant::now();

        if !self.windows.contains_key(key) && self.windows.len() >= self.config.max_keys {
            self.sweep_at(now);
            if self.windows.len() >= self.config.max_keys {
                tracing::warn!(
                    tracked = self.windows.len(),
                    "Rate limiter key table full, rejecting new client"
                );
                return Decision::Rejected {
                    retry_after: self.config.window,
                };
            }
        }

        let mut entry = self.windows.entry(key.to_string()).or_insert(Window {
            count: 0,
            started: now,
        });
        let window = entry.value_mut();

        if now.duration_since(window.started) >= self.config.window {
            window.count = 0;
            window.started = now;
        }

        window.count = window.count.saturating_add(1);

        if window.count > self.config.limit {
            Decision::Rejected {
                retry_after: (window.started + self.config.window).saturating_duration_since(now),
            }
        } else {
            Decision::Allowed {
                remaining: self.config.limit - window.count,
            }
        }
    }

    /// Drops windows that have fully elapsed. Returns how many were removed.
    pub fn sweep_expired(&self) -> usize {
        self.sweep_at(Instant::now())
    }

    fn sweep_at(&self, now: Instant) -> usize {
        let before = self.windows.len();
        self.windows
            .retain(|_, w| now.duration_since(w.started) < self.config.window);
        let removed = before.saturating_sub(self.windows.len());

        if removed > 0 {
            tracing::debug!(removed, "Swept expired rate limit windows");
        }
        removed
    }
}
