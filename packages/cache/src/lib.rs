#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Fingerprinted checker-result cache, backed by the relational store, with
//! in-process singleflight coalescing of concurrent misses.

pub mod fingerprint;
pub mod geocode;
pub mod singleflight;

use defarm_checker_models::CheckerResult;
use switchy_database::Database;

use fingerprint::fingerprint as compute_fingerprint;
pub use geocode::RelationalGeocodeCache;
pub use singleflight::SingleFlight;

/// Errors from the cache layer. Per the Design Notes, cache failures are
/// logged and treated as misses rather than propagated — this type exists
/// for that logging, not for callers to act on.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// The backing store returned an error.
    #[error("cache store error: {0}")]
    Store(#[from] defarm_database::DbError),
    /// The stored result payload failed to deserialize.
    #[error("cache payload deserialize error: {0}")]
    Deserialize(#[from] serde_json::Error),
}

/// Looks up a cached result for `(namespace, key)`. Returns `Ok(None)` on
/// a clean miss; logs and returns `Ok(None)` on a store error too, per the
/// cache layer's failure-transparency rule — callers should not have to
/// distinguish a miss from a cache outage.
pub async fn get(db: &dyn Database, namespace: &str, key: &str) -> Option<CheckerResult> {
    let fp = compute_fingerprint(namespace, key, "");
    match defarm_database::cache::get(db, &fp).await {
        Ok(Some(row)) => match serde_json::from_value::<CheckerResult>(row.result) {
            Ok(mut result) => {
                result.cached = true;
                Some(result)
            }
            Err(err) => {
                log::warn!("cache entry for {namespace}:{key} failed to deserialize: {err}");
                None
            }
        },
        Ok(None) => None,
        Err(err) => {
            log::warn!("cache lookup for {namespace}:{key} failed, treating as miss: {err}");
            None
        }
    }
}

/// Stores `result` for `(namespace, key)` with the given TTL. Failures are
/// logged and swallowed — a cache write never fails the request that
/// produced the result.
pub async fn put(db: &dyn Database, namespace: &str, key: &str, result: &CheckerResult, ttl_seconds: i64) {
    let fp = compute_fingerprint(namespace, key, "");
    let payload = match serde_json::to_value(result) {
        Ok(payload) => payload,
        Err(err) => {
            log::warn!("failed to serialize result for {namespace}:{key}: {err}");
            return;
        }
    };

    if let Err(err) = defarm_database::cache::put(db, &fp, namespace, key, &payload, ttl_seconds).await {
        log::warn!("cache write for {namespace}:{key} failed: {err}");
    }
}
