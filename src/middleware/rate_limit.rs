//! Per-IP rate limiting using governor and `tower_governor`.
//!
//! One limiter per route class:
//! - `general_rate_limiter`: every `/api` route (200 per 15 minutes)
//! - `auth_rate_limiter`: login (10 per hour)
//! - `upload_rate_limiter`: photo uploads (20 per hour)
//! - `user_creation_rate_limiter`: admin user creation (3 per day)
//!
//! Keys come from `SmartIpKeyExtractor` (forwarding headers, then the peer
//! address), so the server must be served with connect info.

use std::sync::Arc;

use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer};

pub type RateLimiterLayer = GovernorLayer<SmartIpKeyExtractor, NoOpMiddleware<QuantaInstant>>;

/// A request budget: `burst` requests, refilled evenly over `window_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateBudget {
    pub burst: u32,
    pub window_ms: u64,
}

impl RateBudget {
    pub const GENERAL: RateBudget = RateBudget { burst: 200, window_ms: 15 * 60 * 1000 };
    pub const AUTH: RateBudget = RateBudget { burst: 10, window_ms: 60 * 60 * 1000 };
    pub const UPLOAD: RateBudget = RateBudget { burst: 20, window_ms: 60 * 60 * 1000 };
    pub const USER_CREATION: RateBudget = RateBudget { burst: 3, window_ms: 24 * 60 * 60 * 1000 };

    /// Milliseconds between single-token refills
    pub fn replenish_interval_ms(&self) -> u64 {
        (self.window_ms / u64::from(self.burst.max(1))).max(1)
    }

    /// Build the layer; `None` only if governor rejects the quota.
    pub fn layer(&self) -> Option<RateLimiterLayer> {
        let config = GovernorConfigBuilder::default()
            .key_extractor(SmartIpKeyExtractor)
            .per_millisecond(self.replenish_interval_ms())
            .burst_size(self.burst)
            .finish();

        match config {
            Some(config) => Some(GovernorLayer { config: Arc::new(config) }),
            None => {
                tracing::error!(burst = self.burst, window_ms = self.window_ms, "Invalid rate limit quota, limiter disabled");
                None
            }
        }
    }
}

pub fn general_rate_limiter() -> Option<RateLimiterLayer> {
    RateBudget::GENERAL.layer()
}

pub fn auth_rate_limiter() -> Option<RateLimiterLayer> {
    RateBudget::AUTH.layer()
}

pub fn upload_rate_limiter() -> Option<RateLimiterLayer> {
    RateBudget::UPLOAD.layer()
}

pub fn user_creation_rate_limiter() -> Option<RateLimiterLayer> {
    RateBudget::USER_CREATION.layer()
}
