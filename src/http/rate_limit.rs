//! Client-side rate limiting
//!
//! The API meters every endpoint with two windows: a short burst allowance
//! and a steady per-minute rate. A governor token bucket models both, the
//! bucket size being the burst and the refill rate the steady rate.

use governor::clock::DefaultClock;
use governor::middleware::NoOpMiddleware;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter as Governor};
use std::num::NonZeroU32;
use std::sync::Arc;

/// Quota the client holds itself to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimiterConfig {
    /// Requests allowed back to back
    pub burst: u32,
    /// Sustained requests per minute
    pub per_minute: u32,
}

impl Default for RateLimiterConfig {
    /// The API's medium tier: 10 burst, 150 per minute
    fn default() -> Self {
        Self {
            burst: 10,
            per_minute: 150,
        }
    }
}

impl RateLimiterConfig {
    /// Create a quota from its two windows
    pub fn new(burst: u32, per_minute: u32) -> Self {
        Self { burst, per_minute }
    }

    /// Steady rate of `requests_per_second` with a burst of the same size
    pub fn per_second(requests_per_second: u32) -> Self {
        Self::new(requests_per_second, requests_per_second.saturating_mul(60))
    }
}

/// Token bucket rate limiter
#[derive(Clone)]
pub struct RateLimiter {
    limiter: Arc<Governor<NotKeyed, InMemoryState, DefaultClock, NoOpMiddleware>>,
}

impl RateLimiter {
    /// Create a new rate limiter with the given config
    pub fn new(config: &RateLimiterConfig) -> Self {
        let steady = NonZeroU32::new(config.per_minute).unwrap_or(NonZeroU32::MIN);
        let burst = NonZeroU32::new(config.burst).unwrap_or(NonZeroU32::MIN);
        let quota = Quota::per_minute(steady).allow_burst(burst);

        Self {
            limiter: Arc::new(Governor::direct(quota)),
        }
    }

    /// Wait until a request can be made
    pub async fn wait(&self) {
        self.limiter.until_ready().await;
    }

    /// Take a permit if one is free right now
    pub fn try_acquire(&self) -> bool {
        self.limiter.check().is_ok()
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter").finish_non_exhaustive()
    }
}
