//! Rate limiting middleware using token bucket algorithm

use airport_common::config::RateLimitConfig;
use airport_common::errors::{AppError, Result};
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

/// Rate limiter using governor crate
pub type GlobalRateLimiter = RateLimiter<NotKeyed, InMemoryState, QuantaClock>;

/// Create a new rate limiter
pub fn create_rate_limiter(config: &RateLimitConfig) -> Result<Arc<GlobalRateLimiter>> {
    let per_second = NonZeroU32::new(config.requests_per_second).ok_or_else(|| {
        AppError::Configuration {
            message: "rate_limit.requests_per_second must be positive".to_string(),
        }
    })?;
    let burst = NonZeroU32::new(config.burst).ok_or_else(|| AppError::Configuration {
        message: "rate_limit.burst must be positive".to_string(),
    })?;

    Ok(Arc::new(RateLimiter::direct(
        Quota::per_second(per_second).allow_burst(burst),
    )))
}

/// Rate limiting middleware
pub async fn rate_limit(
    State(limiter): State<Arc<GlobalRateLimiter>>,
    request: Request,
    next: Next,
) -> Result<Response> {
    match limiter.check() {
        Ok(_) => Ok(next.run(request).await),
        Err(_) => Err(AppError::RateLimited),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limiter_creation() {
        let limiter = create_rate_limiter(&RateLimitConfig::default()).unwrap();
        assert!(limiter.check().is_ok());
    }

    #[test]
    fn test_burst_is_enforced() {
        let limiter = create_rate_limiter(&RateLimitConfig {
            requests_per_second: 1,
            burst: 2,
            enabled: true,
        })
        .unwrap();

        assert!(limiter.check().is_ok());
        assert!(limiter.check().is_ok());
        assert!(limiter.check().is_err());
    }

    #[test]
    fn test_zero_quota_is_a_configuration_error() {
        let err = create_rate_limiter(&RateLimitConfig {
            requests_per_second: 0,
            burst: 1,
            enabled: true,
        })
        .unwrap_err();
        assert!(matches!(err, AppError::Configuration { .. }));
    }
}
