//! A minimal monotonic-clock rate limiter.
//!
//! The teacher's dependency stack has no rate-limiting crate (providers
//! express rate limits as a plain `rate_limit_ms` config field and leave
//! pacing to the caller), so this is a small hand-rolled token-less
//! limiter: it remembers the instant of the last permitted call and sleeps
//! just long enough to maintain the configured minimum gap.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

/// Serializes calls so that consecutive permits are at least
/// `min_gap` apart, regardless of how many callers are waiting.
pub struct RateLimiter {
    min_gap: Duration,
    last_call: Arc<Mutex<Option<Instant>>>,
}

impl RateLimiter {
    /// Creates a limiter enforcing at least `min_gap_ms` milliseconds
    /// between permits.
    #[must_use]
    pub fn new(min_gap_ms: u64) -> Self {
        Self {
            min_gap: Duration::from_millis(min_gap_ms),
            last_call: Arc::new(Mutex::new(None)),
        }
    }

    /// Waits until it is this caller's turn, then records the permit time.
    ///
    /// Concurrent callers serialize on the internal mutex, so the gap
    /// invariant holds even under a burst of simultaneous callers.
    pub async fn wait(&self) {
        let mut last_call = self.last_call.lock().await;
        if let Some(last) = *last_call {
            let elapsed = last.elapsed();
            if elapsed < self.min_gap {
                tokio::time::sleep(self.min_gap - elapsed).await;
            }
        }
        *last_call = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn enforces_minimum_gap() {
        let limiter = RateLimiter::new(50);
        let start = Instant::now();
        limiter.wait().await;
        limiter.wait().await;
        limiter.wait().await;
        assert!(start.elapsed() >= Duration::from_millis(100));
    }

    #[tokio::test]
    async fn serializes_concurrent_callers() {
        let limiter = Arc::new(RateLimiter::new(30));
        let mut handles = Vec::new();
        for _ in 0..5 {
            let limiter = Arc::clone(&limiter);
            handles.push(tokio::spawn(async move {
                limiter.wait().await;
            }));
        }
        let start = Instant::now();
        for h in handles {
            h.await.unwrap();
        }
        assert!(start.elapsed() >= Duration::from_millis(120));
    }
}
