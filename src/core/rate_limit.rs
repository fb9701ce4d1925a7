//! Fixed-window rate limiting
//!
//! Each logger may cap the number of records it accepts per minute. The
//! window is fixed, not sliding: it starts with the first call and
//! restarts lazily on the first call made at least [`RATE_LIMIT_WINDOW`]
//! after the current window began. Calls straddling a boundary can
//! therefore admit up to twice the cap within sixty seconds.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Length of one rate-limit window
pub const RATE_LIMIT_WINDOW: Duration = Duration::from_millis(60_000);

/// Configuration for per-logger rate limiting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitConfig {
    /// Maximum records accepted per window
    pub max_per_min: u32,
}

impl RateLimitConfig {
    pub fn new(max_per_min: u32) -> Self {
        Self { max_per_min }
    }
}

#[derive(Debug)]
struct Window {
    /// Unset until the first call
    start: Option<Instant>,
    count: u64,
}

/// Counter admitting at most `max_per_min` records per window
#[derive(Debug)]
pub struct RateLimiter {
    max_per_min: u64,
    window: Mutex<Window>,
}

impl RateLimiter {
    /// Limiter whose first window begins with the first call
    pub fn new(config: RateLimitConfig) -> Self {
        Self::with_window(config, None)
    }

    /// Limiter whose first window begins at `start`
    pub fn starting_at(config: RateLimitConfig, start: Instant) -> Self {
        Self::with_window(config, Some(start))
    }

    fn with_window(config: RateLimitConfig, start: Option<Instant>) -> Self {
        Self {
            max_per_min: u64::from(config.max_per_min),
            window: Mutex::new(Window { start, count: 0 }),
        }
    }

    /// Count one call and report whether it is admitted
    pub fn check(&self) -> bool {
        self.check_at(Instant::now())
    }

    /// Count one call made at `now` and report whether it is admitted.
    ///
    /// Every call increments the counter, including rejected ones.
    pub fn check_at(&self, now: Instant) -> bool {
        let mut window = self.window.lock();
        let expired = match window.start {
            Some(start) => now.saturating_duration_since(start) >= RATE_LIMIT_WINDOW,
            None => true,
        };
        if expired {
            window.start = Some(now);
            window.count = 0;
        }
        window.count += 1;
        window.count <= self.max_per_min
    }

    /// Calls counted in the current window
    pub fn current_count(&self) -> u64 {
        self.window.lock().count
    }

    pub fn max_per_min(&self) -> u64 {
        self.max_per_min
    }
}
