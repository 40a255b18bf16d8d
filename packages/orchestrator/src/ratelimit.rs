//! Per-API-key token-bucket rate limiting.
//!
//! The geocoder's [`defarm_geocoder::ratelimit`] limiter enforces a single
//! global minimum gap between calls, which fits a single outbound
//! provider. Admission control for inbound requests needs a per-key quota
//! instead (§5, "API-key rate limiting is the primary admission
//! control"), so this is a small token bucket per key rather than a
//! reuse of that limiter.

use std::collections::HashMap;
use std::time::Instant;

use tokio::sync::Mutex;

struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

/// Tracks one token bucket per API-key prefix, refilled continuously at
/// `rate_limit_per_minute / 60` tokens per second, capped at the per-minute
/// limit.
#[derive(Default)]
pub struct RateLimiter {
    buckets: Mutex<HashMap<String, Bucket>>,
}

impl RateLimiter {
    /// Creates an empty limiter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attempts to consume one token for `key`, whose quota is
    /// `limit_per_minute` requests/minute. Returns `true` if the request is
    /// admitted.
    pub async fn check(&self, key: &str, limit_per_minute: i32) -> bool {
        let capacity = f64::from(limit_per_minute.max(1));
        let refill_per_sec = capacity / 60.0;

        let mut buckets = self.buckets.lock().await;
        let bucket = buckets.entry(key.to_string()).or_insert_with(|| Bucket {
            tokens: capacity,
            last_refill: Instant::now(),
        });

        let elapsed = bucket.last_refill.elapsed().as_secs_f64();
        bucket.tokens = (bucket.tokens + elapsed * refill_per_sec).min(capacity);
        bucket.last_refill = Instant::now();

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn admits_up_to_the_per_minute_limit() {
        let limiter = RateLimiter::new();
        for _ in 0..5 {
            assert!(limiter.check("key-a", 5).await);
        }
        assert!(!limiter.check("key-a", 5).await);
    }

    #[tokio::test]
    async fn keys_are_independent() {
        let limiter = RateLimiter::new();
        for _ in 0..3 {
            assert!(limiter.check("key-a", 3).await);
        }
        assert!(!limiter.check("key-a", 3).await);
        assert!(limiter.check("key-b", 3).await);
    }

    #[tokio::test]
    async fn refills_over_time() {
        let limiter = RateLimiter::new();
        assert!(limiter.check("key-a", 60).await);
        // draining isn't feasible to await for in a unit test at 60/min
        // (1/sec refill); just confirm a second immediate call still
        // succeeds since capacity was 60 and only one token was spent.
        assert!(limiter.check("key-a", 60).await);
    }
}
