//! Relational-store-backed [`GeocodeCache`] implementation, so repeated
//! addresses resolve without a provider round-trip.
//!
//! Keyed by the normalized address text the geocoder already computes
//! (see `defarm_geocoder::address::normalize_address`), under the
//! `"geocode"` namespace, so it shares the same `check_cache` table and
//! fingerprinting scheme as checker results without any schema changes.

use std::sync::Arc;

use async_trait::async_trait;
use defarm_geocoder::{GeocodeCache, GeocodedAddress};
use switchy_database::Database;

use crate::fingerprint::fingerprint as compute_fingerprint;

const NAMESPACE: &str = "geocode";

/// Addresses are stable; resolved coordinates don't move, so this cache
/// holds entries for roughly a year rather than the shorter TTLs used for
/// checker results.
const TTL_SECONDS: i64 = 365 * 24 * 60 * 60;

/// A [`GeocodeCache`] backed by the `check_cache` table.
pub struct RelationalGeocodeCache {
    db: Arc<dyn Database>,
}

impl RelationalGeocodeCache {
    /// Wraps a relational store connection for use as a geocode cache.
    #[must_use]
    pub fn new(db: Arc<dyn Database>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl GeocodeCache for RelationalGeocodeCache {
    async fn get(&self, normalized_address: &str) -> Option<GeocodedAddress> {
        let fp = compute_fingerprint(NAMESPACE, normalized_address, "");
        match defarm_database::cache::get(self.db.as_ref(), &fp).await {
            Ok(Some(row)) => match serde_json::from_value::<GeocodedAddress>(row.result) {
                Ok(address) => Some(address),
                Err(err) => {
                    log::warn!("geocode cache entry for {normalized_address:?} failed to deserialize: {err}");
                    None
                }
            },
            Ok(None) => None,
            Err(err) => {
                log::warn!("geocode cache lookup for {normalized_address:?} failed, treating as miss: {err}");
                None
            }
        }
    }

    async fn put(&self, normalized_address: &str, result: &GeocodedAddress) {
        let fp = compute_fingerprint(NAMESPACE, normalized_address, "");
        let payload = match serde_json::to_value(result) {
            Ok(payload) => payload,
            Err(err) => {
                log::warn!("failed to serialize geocode result for {normalized_address:?}: {err}");
                return;
            }
        };

        if let Err(err) =
            defarm_database::cache::put(self.db.as_ref(), &fp, NAMESPACE, normalized_address, &payload, TTL_SECONDS)
                .await
        {
            log::warn!("geocode cache write for {normalized_address:?} failed: {err}");
        }
    }
}
