//! Rate limiting middleware using token bucket algorithm

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use governor::{
    clock::QuantaClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use std::num::NonZeroU32;
use std::sync::Arc;
use webtrees_common::errors::{AppError, Result};

/// Rate limiter using governor crate
pub type GlobalRateLimiter = RateLimiter<NotKeyed, InMemoryState, QuantaClock>;

/// Global limiter plus the quota it was built with, for error reporting.
pub struct RateLimit {
    limiter: GlobalRateLimiter,
    requests_per_second: u32,
}

impl RateLimit {
    /// Zero rates are raised to one.
    pub fn new(requests_per_second: u32, burst: u32) -> Self {
        let rate = NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN);
        let burst = NonZeroU32::new(burst).unwrap_or(rate);
        let quota = Quota::per_second(rate).allow_burst(burst);

        Self {
            limiter: RateLimiter::direct(quota),
            requests_per_second: rate.get(),
        }
    }

    pub fn check(&self) -> bool {
        self.limiter.check().is_ok()
    }
}

/// Rate limiting middleware
pub async fn rate_limit_middleware(
    State(rate_limit): State<Arc<RateLimit>>,
    request: Request,
    next: Next,
) -> Result<Response> {
    if rate_limit.check() {
        Ok(next.run(request).await)
    } else {
        tracing::warn!(path = %request.uri().path(), "Rate limit exceeded");
        Err(AppError::RateLimited {
            limit: rate_limit.requests_per_second,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limiter_creation() {
        let rate_limit = RateLimit::new(100, 200);
        assert!(rate_limit.check());
    }

    #[test]
    fn test_burst_exhausted() {
        let rate_limit = RateLimit::new(1, 2);
        assert!(rate_limit.check());
        assert!(rate_limit.check());
        assert!(!rate_limit.check());
    }

    #[test]
    fn test_zero_rate_is_raised() {
        let rate_limit = RateLimit::new(0, 0);
        assert_eq!(rate_limit.requests_per_second, 1);
        assert!(rate_limit.check());
    }
}
