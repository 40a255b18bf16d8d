#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Request input types and their normalized, canonicalized form.
//!
//! A raw request names one of four input kinds (`CPF`, `CNPJ`,
//! `COORDINATES`, `ADDRESS`, `CAR`). Normalization resolves an `ADDRESS`
//! into `COORDINATES` via geocoding, so every [`NormalizedInput`] that
//! leaves the normalizer carries one of the other four types.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Latitude bounds of Brazil's territory, used to reject out-of-range
/// coordinate input before any checker runs.
pub const BRAZIL_LAT_RANGE: (f64, f64) = (-34.0, 6.0);
/// Longitude bounds of Brazil's territory.
pub const BRAZIL_LON_RANGE: (f64, f64) = (-74.0, -34.0);

/// The kind of subject identifier a request names.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum InputType {
    /// 11-digit individual taxpayer registry number.
    Cpf,
    /// 14-digit legal-entity taxpayer registry number.
    Cnpj,
    /// A `{lat, lon}` pair.
    Coordinates,
    /// Free-text address, resolved to coordinates via geocoding.
    Address,
    /// Rural-property registry code (Cadastro Ambiental Rural).
    Car,
}

impl InputType {
    /// All input type variants, in declaration order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Cpf,
            Self::Cnpj,
            Self::Coordinates,
            Self::Address,
            Self::Car,
        ]
    }
}

/// The raw, as-received value for an input, tagged with its declared type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawInput {
    /// Declared input type.
    #[serde(rename = "type")]
    pub input_type: InputType,
    /// Raw value. For `COORDINATES` this is a `{lat, lon}` object; for
    /// everything else it is a string.
    pub value: serde_json::Value,
}

/// A geographic point in WGS84 (EPSG:4326) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude in decimal degrees.
    pub lat: f64,
    /// Longitude in decimal degrees.
    pub lon: f64,
}

impl Coordinates {
    /// Returns `true` if the point falls within Brazil's bounding box.
    #[must_use]
    pub fn in_brazil(&self) -> bool {
        (BRAZIL_LAT_RANGE.0..=BRAZIL_LAT_RANGE.1).contains(&self.lat)
            && (BRAZIL_LON_RANGE.0..=BRAZIL_LON_RANGE.1).contains(&self.lon)
    }

    /// Canonical cache-key form: both components rounded to the configured
    /// precision (6 decimal places, roughly 11cm) and formatted `"lat,lon"`.
    #[must_use]
    pub fn canonical_key(&self) -> String {
        format!("{:.6},{:.6}", self.lat, self.lon)
    }
}

/// Provenance of a geocoding result, carried in [`NormalizedInput::metadata`]
/// when the original request was an `ADDRESS`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeocodingProvenance {
    /// Display name returned by the geocoding provider.
    pub display_name: Option<String>,
    /// Which provider resolved the address (`primary`, `fallback`, `cache`).
    pub source: String,
}

/// Metadata attached to a normalized input, preserving facts lost during
/// canonicalization (in particular, that an input originated as an address).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedMetadata {
    /// The type the client originally submitted, if it differs from
    /// [`NormalizedInput::input_type`] (only `ADDRESS` is ever promoted).
    pub original_type: Option<InputType>,
    /// Original raw address text, kept for display purposes.
    pub original_address: Option<String>,
    /// Geocoding provenance, present only when the input was an address.
    pub geocoding: Option<GeocodingProvenance>,
}

/// The result of normalizing a [`RawInput`]: a canonical value suitable for
/// cache-key fingerprinting, plus resolved coordinates when applicable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedInput {
    /// Effective type after normalization (never `ADDRESS`).
    pub input_type: InputType,
    /// Stable, whitespace/punctuation/case-insensitive canonical value.
    pub canonical_value: String,
    /// Value as originally submitted by the client.
    pub original_value: String,
    /// Resolved coordinates, present for `COORDINATES` and any input that
    /// was geocoded or otherwise has a known location.
    pub coordinates: Option<Coordinates>,
    /// Supplementary provenance metadata.
    pub metadata: NormalizedMetadata,
}

impl NormalizedInput {
    /// Returns `true` if this input's type is in `supported`.
    #[must_use]
    pub fn applies_to(&self, supported: &[InputType]) -> bool {
        supported.contains(&self.input_type)
    }
}

/// Errors raised while validating and normalizing a [`RawInput`].
#[derive(Debug, Clone, thiserror::Error)]
pub enum ValidationError {
    /// The `value` field was not an object/string of the shape required by
    /// `input_type`.
    #[error("malformed value for input type {input_type}: {message}")]
    MalformedValue {
        /// The declared input type.
        input_type: InputType,
        /// Human-readable detail.
        message: String,
    },
    /// A CPF/CNPJ did not have the required digit count after cleanup.
    #[error("{input_type} must have {expected} digits, got {actual}")]
    WrongDigitCount {
        /// The declared input type.
        input_type: InputType,
        /// Required digit count.
        expected: usize,
        /// Digit count actually present.
        actual: usize,
    },
    /// Coordinates fell outside Brazil's bounding box.
    #[error("coordinates ({lat}, {lon}) are outside Brazil's bounding box")]
    OutOfBounds {
        /// Rejected latitude.
        lat: f64,
        /// Rejected longitude.
        lon: f64,
    },
    /// The address could not be geocoded.
    #[error("address could not be resolved to coordinates: {0}")]
    GeocodingFailed(String),
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.lat, self.lon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_brazil_accepts_altamira() {
        let c = Coordinates {
            lat: -3.2,
            lon: -52.2,
        };
        assert!(c.in_brazil());
    }

    #[test]
    fn in_brazil_rejects_new_york() {
        let c = Coordinates {
            lat: 40.7,
            lon: -74.0,
        };
        assert!(!c.in_brazil());
    }

    #[test]
    fn canonical_key_rounds_to_six_decimals() {
        let c = Coordinates {
            lat: -3.123_456_789,
            lon: -52.987_654_321,
        };
        assert_eq!(c.canonical_key(), "-3.123457,-52.987654");
    }

    #[test]
    fn input_type_round_trips_through_strum() {
        for t in InputType::all() {
            let s = t.to_string();
            let parsed: InputType = s.parse().unwrap();
            assert_eq!(*t, parsed);
        }
    }
}
