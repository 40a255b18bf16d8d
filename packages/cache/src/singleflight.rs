//! In-process coalescing of concurrent cache misses for the same
//! fingerprint, so N simultaneous requests for the same checker/input pair
//! execute the underlying work exactly once.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use defarm_checker_models::CheckerResult;
use tokio::sync::{Mutex, OnceCell};

/// Coordinates concurrent misses so only the first caller for a given
/// fingerprint runs `compute`; subsequent callers await the same result.
#[derive(Default)]
pub struct SingleFlight {
    inflight: Mutex<HashMap<String, Arc<OnceCell<CheckerResult>>>>,
}

impl SingleFlight {
    /// Creates an empty coordinator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `compute` for `fingerprint`, collapsing concurrent callers with
    /// the same fingerprint into a single invocation. The in-flight entry is
    /// removed once `compute` resolves, so a later cache miss for the same
    /// fingerprint starts a fresh computation rather than reusing a stale
    /// one.
    pub async fn run<F, Fut>(&self, fingerprint: &str, compute: F) -> CheckerResult
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = CheckerResult>,
    {
        let (cell, is_leader) = {
            let mut inflight = self.inflight.lock().await;
            if let Some(existing) = inflight.get(fingerprint) {
                (existing.clone(), false)
            } else {
                let cell = Arc::new(OnceCell::new());
                inflight.insert(fingerprint.to_string(), cell.clone());
                (cell, true)
            }
        };

        // `OnceCell::get_or_init` itself coalesces concurrent initializers:
        // whichever caller (leader or follower) reaches it first acquires the
        // init slot and runs its own `compute`; everyone else blocks on the
        // same slot and, on wake, finds the cell already initialized and
        // never runs their own closure. So every caller can simply call it.
        let result = cell.get_or_init(compute).await.clone();

        if is_leader {
            self.inflight.lock().await.remove(fingerprint);
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::SingleFlight;
    use defarm_checker_models::{CheckerResult, Evidence, Status};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn stub_result(message: &str) -> CheckerResult {
        CheckerResult {
            status: Status::Pass,
            severity: None,
            message: message.to_string(),
            details: serde_json::Value::Null,
            evidence: Evidence {
                data_source: "test".to_string(),
                url: None,
                last_update: None,
                raw: None,
            },
            execution_time_ms: 0,
            cached: false,
        }
    }

    #[tokio::test]
    async fn collapses_concurrent_identical_fingerprints() {
        let flight = Arc::new(SingleFlight::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let flight = flight.clone();
            let calls = calls.clone();
            handles.push(tokio::spawn(async move {
                flight
                    .run("fp-a", || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
                        stub_result("computed")
                    })
                    .await
            }));
        }

        for handle in handles {
            let result = handle.await.unwrap();
            assert_eq!(result.message, "computed");
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn distinct_fingerprints_both_execute() {
        let flight = SingleFlight::new();
        let a = flight.run("fp-a", || async { stub_result("a") }).await;
        let b = flight.run("fp-b", || async { stub_result("b") }).await;
        assert_eq!(a.message, "a");
        assert_eq!(b.message, "b");
    }
}
