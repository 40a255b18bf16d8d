#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Address geocoding for Brazilian addresses.
//!
//! Converts free-text addresses into coordinates using a two-tier
//! provider strategy:
//!
//! 1. **Primary** — a free, rate-limited community provider (Nominatim /
//!    `OpenStreetMap`), capped at one request per second per process.
//! 2. **Fallback** — an optional keyed provider, invoked only when the
//!    primary fails to match *and* an API key is configured.
//!
//! Callers that already have a cached result for an address should never
//! reach this crate at all; the cache layer sits in front of [`Geocoder`]
//! (see the [`GeocodeCache`] trait below, implemented elsewhere).

pub mod address;
pub mod nominatim;
pub mod ratelimit;

use std::sync::Arc;

use async_trait::async_trait;
use defarm_input_models::Coordinates;
use ratelimit::RateLimiter;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which stage resolved an address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeocodeSource {
    /// Resolved by the free primary provider.
    Primary,
    /// Resolved by the optional keyed fallback provider.
    Fallback,
    /// Served from the geocode cache.
    Cache,
}

impl GeocodeSource {
    /// The lowercase name used in API responses (`"primary"`/`"fallback"`/`"cache"`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Fallback => "fallback",
            Self::Cache => "cache",
        }
    }
}

/// A geocoding result with coordinates and metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodedAddress {
    /// Resolved coordinates.
    pub coordinates: Coordinates,
    /// The matched/canonical address text returned by the provider.
    pub display_name: Option<String>,
    /// Which stage produced this result.
    pub source: GeocodeSource,
}

/// Errors from geocoding operations.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response parsing failed.
    #[error("parse error: {message}")]
    Parse {
        /// Description of the parsing failure.
        message: String,
    },

    /// Provider returned HTTP 429.
    #[error("rate limit exceeded")]
    RateLimited,

    /// No provider matched the address.
    #[error("address could not be resolved: {0}")]
    NotFound(String),

    /// A provider request exceeded its deadline.
    #[error("geocoding request timed out")]
    Timeout,
}

/// A cache sitting in front of the geocoder, keyed by normalized address
/// text. Implemented against the relational store elsewhere in the
/// workspace; the geocoder itself has no storage dependency.
#[async_trait]
pub trait GeocodeCache: Send + Sync {
    /// Look up a previously geocoded address.
    async fn get(&self, normalized_address: &str) -> Option<GeocodedAddress>;
    /// Store a freshly geocoded address. TTL is the cache's concern.
    async fn put(&self, normalized_address: &str, result: &GeocodedAddress);
}

/// Configuration for the optional keyed fallback provider.
#[derive(Debug, Clone)]
pub struct FallbackConfig {
    /// Base URL of the fallback geocoding API.
    pub base_url: String,
    /// API key, sent as a query parameter.
    pub api_key: String,
}

/// Geocoder configuration, resolved from environment variables by the
/// caller (see `defarm_server`'s startup wiring).
#[derive(Debug, Clone)]
pub struct GeocoderConfig {
    /// Base URL of the primary (Nominatim-shaped) provider.
    pub primary_base_url: String,
    /// Minimum delay between outbound primary-provider requests.
    pub rate_limit_ms: u64,
    /// Optional fallback provider configuration.
    pub fallback: Option<FallbackConfig>,
}

impl GeocoderConfig {
    /// Reads configuration from environment variables, falling back to the
    /// public Nominatim instance and a 1 request/second limit.
    #[must_use]
    pub fn from_env() -> Self {
        let primary_base_url = std::env::var("GEOCODER_PRIMARY_BASE_URL")
            .unwrap_or_else(|_| "https://nominatim.openstreetmap.org/search".to_string());
        let rate_limit_ms = std::env::var("GEOCODER_RATE_LIMIT_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(1000);
        let fallback = match (
            std::env::var("GEOCODER_FALLBACK_BASE_URL").ok(),
            std::env::var("GEOCODER_FALLBACK_API_KEY").ok(),
        ) {
            (Some(base_url), Some(api_key)) if !api_key.is_empty() => {
                Some(FallbackConfig { base_url, api_key })
            }
            _ => None,
        };
        Self {
            primary_base_url,
            rate_limit_ms,
            fallback,
        }
    }
}

/// Resolves addresses to coordinates through the primary/fallback/cache
/// pipeline described at the module level.
pub struct Geocoder {
    client: reqwest::Client,
    config: GeocoderConfig,
    limiter: RateLimiter,
    cache: Option<Arc<dyn GeocodeCache>>,
}

impl Geocoder {
    /// Builds a geocoder from configuration, with no cache attached.
    #[must_use]
    pub fn new(config: GeocoderConfig) -> Self {
        let limiter = RateLimiter::new(config.rate_limit_ms);
        Self {
            client: reqwest::Client::new(),
            config,
            limiter,
            cache: None,
        }
    }

    /// Attaches a cache in front of the provider pipeline.
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<dyn GeocodeCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Geocodes a free-text address.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::NotFound`] if neither provider matches, or
    /// any transport/parse error surfaced by a provider.
    pub async fn geocode(&self, raw_address: &str) -> Result<GeocodedAddress, GeocodeError> {
        let normalized = address::normalize_address(raw_address);

        if let Some(cache) = &self.cache {
            if let Some(mut hit) = cache.get(&normalized).await {
                hit.source = GeocodeSource::Cache;
                return Ok(hit);
            }
        }

        let result = self.geocode_uncached(&normalized).await?;

        if let Some(cache) = &self.cache {
            cache.put(&normalized, &result).await;
        }

        Ok(result)
    }

    async fn geocode_uncached(&self, normalized: &str) -> Result<GeocodedAddress, GeocodeError> {
        self.limiter.wait().await;
        match nominatim::geocode_freeform(&self.client, &self.config.primary_base_url, normalized)
            .await
        {
            Ok(Some(found)) => {
                return Ok(GeocodedAddress {
                    coordinates: found.coordinates,
                    display_name: found.display_name,
                    source: GeocodeSource::Primary,
                });
            }
            Ok(None) => {}
            Err(GeocodeError::RateLimited) => {
                log::warn!("primary geocoder rate-limited us; not retrying within this request");
            }
            Err(other) => return Err(other),
        }

        if let Some(fallback) = &self.config.fallback {
            log::info!("primary geocoder had no match for {normalized:?}, trying fallback");
            if let Some(found) = nominatim::geocode_freeform(
                &self.client,
                &fallback.base_url,
                &format!("{normalized}&api_key={}", fallback.api_key),
            )
            .await?
            {
                return Ok(GeocodedAddress {
                    coordinates: found.coordinates,
                    display_name: found.display_name,
                    source: GeocodeSource::Fallback,
                });
            }
        }

        Err(GeocodeError::NotFound(normalized.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geocode_source_as_str() {
        assert_eq!(GeocodeSource::Primary.as_str(), "primary");
        assert_eq!(GeocodeSource::Fallback.as_str(), "fallback");
        assert_eq!(GeocodeSource::Cache.as_str(), "cache");
    }

    #[test]
    fn config_from_env_defaults_to_nominatim() {
        std::env::remove_var("GEOCODER_PRIMARY_BASE_URL");
        std::env::remove_var("GEOCODER_FALLBACK_BASE_URL");
        std::env::remove_var("GEOCODER_FALLBACK_API_KEY");
        let config = GeocoderConfig::from_env();
        assert!(config.primary_base_url.contains("nominatim"));
        assert!(config.fallback.is_none());
        assert_eq!(config.rate_limit_ms, 1000);
    }
}
