#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Row types returned by the raw SQL issued in `defarm_database`.
//!
//! These mirror the shapes of the `PostGIS`-backed data stores the service
//! reads from; they are distinct from the externally-facing DTOs in
//! `defarm_server_models` and the checker-facing types in
//! `defarm_checker_models`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A labor-blacklist entry matched by document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaborBlacklistRow {
    /// Canonical CPF/CNPJ digits.
    pub document: String,
    /// Year the entity was listed.
    pub year: i32,
    /// State the listing jurisdiction belongs to.
    pub jurisdiction: String,
    /// Number of workers reported affected.
    pub workers_affected: i32,
}

/// A single environmental embargo record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbargoRow {
    /// Canonical CPF/CNPJ digits of the embargoed entity.
    pub document: String,
    /// Embargoed area, in hectares.
    pub area_hectares: f64,
    /// Date the embargo was issued.
    pub issued_at: DateTime<Utc>,
    /// Issuing environmental agency.
    pub agency: String,
    /// Longitude of the embargoed property, when known.
    pub longitude: Option<f64>,
    /// Latitude of the embargoed property, when known.
    pub latitude: Option<f64>,
}

/// A sanctions-registry entry matched by document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SanctionRow {
    /// Canonical CPF/CNPJ digits.
    pub document: String,
    /// Sanction class (`CEIS`, `CNEP`, `CEAF`, ...).
    pub class: String,
    /// Date the sanction took effect.
    pub start_date: DateTime<Utc>,
    /// Date the sanction ends, if bounded.
    pub end_date: Option<DateTime<Utc>>,
    /// The organ that issued the sanction.
    pub sanctioning_organ: String,
}

/// A protected indigenous-land polygon overlapping a query point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndigenousLandRow {
    /// Land name.
    pub name: String,
    /// Associated ethnic group.
    pub ethnic_group: String,
    /// Demarcation phase (`Declarada`, `Homologada`, `Regularizada`, ...).
    pub phase: String,
    /// State the land is primarily located in.
    pub state: String,
}

/// A conservation-unit polygon overlapping a query point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConservationUnitRow {
    /// Unit name.
    pub name: String,
    /// Protection category (`Proteção Integral` or `Uso Sustentável`).
    pub category_group: String,
    /// Specific unit category (e.g. `Parque Nacional`).
    pub category: String,
    /// Managing jurisdiction (federal, state, municipal).
    pub jurisdiction: String,
}

/// A `PRODES` annual-deforestation polygon containing a query point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnualDeforestationRow {
    /// Reference year the polygon was published for.
    pub year: i32,
    /// Deforested area, in hectares.
    pub area_hectares: f64,
    /// Municipality the polygon falls in.
    pub municipality: String,
}

/// A `DETER` real-time deforestation alert polygon containing a query point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeforestationAlertRow {
    /// Alert classification (e.g. `DESMATAMENTO_VEG`, `CORTE_SELETIVO`).
    pub class_name: String,
    /// Area affected, in hectares.
    pub area_hectares: f64,
    /// Date the alert was published.
    pub published_at: DateTime<Utc>,
}

/// A validated (`MapBiomas`) deforestation polygon within range of a point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatedDeforestationRow {
    /// Reference year.
    pub year: i32,
    /// Deforested area, in hectares.
    pub area_hectares: f64,
    /// Detection timestamp.
    pub detected_at: DateTime<Utc>,
    /// Distance from the query point, in meters.
    pub distance_meters: f64,
    /// Whether this polygon overlaps a protected area.
    pub overlaps_protected_area: bool,
    /// Whether this polygon overlaps an active embargo.
    pub overlaps_embargo: bool,
}

/// A fire hotspot within range of a query point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FireHotspotRow {
    /// Detection timestamp.
    pub detected_at: DateTime<Utc>,
    /// Distance from the query point, in meters.
    pub distance_meters: f64,
    /// Detection confidence, 0-100, when reported.
    pub confidence: Option<i32>,
}

/// A water-use permit within range of a query point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterPermitRow {
    /// Permit holder name.
    pub holder: String,
    /// Permit status (`valid`, `expired`, `suspended`).
    pub status: String,
    /// Authorized withdrawal volume, m³/h, when reported.
    pub authorized_volume_m3h: Option<f64>,
    /// Distance from the query point, in meters.
    pub distance_meters: f64,
}

/// A rural-property (CAR) registry row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuralPropertyRow {
    /// CAR registry code.
    pub car_code: String,
    /// Raw status string as reported by the source state registry.
    pub status_raw: String,
    /// Total declared property area, in hectares.
    pub area_hectares: f64,
    /// State the property is registered in.
    pub state: String,
}

/// A single polygon intersecting a CAR property, used by the
/// CAR × deforestation checker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarDeforestationIntersectionRow {
    /// Deforestation year.
    pub year: i32,
    /// Intersected area, in hectares (precise `ST_Intersection` area).
    pub intersected_area_hectares: f64,
}

/// A data-source freshness/metadata row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSourceRow {
    /// Unique source name, matching a checker's `evidence.dataSource`.
    pub name: String,
    /// When the source was last refreshed.
    pub last_updated: DateTime<Utc>,
    /// Update cadence used to pick a freshness profile (`daily`, `weekly`, `monthly`).
    pub update_cadence: String,
    /// Row count in the source's backing table, if tracked.
    pub total_records: Option<i64>,
}

/// A stored API key record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiKeyRow {
    /// Non-secret lookup prefix (e.g. first 8 chars of the key).
    pub prefix: String,
    /// SHA-256 hex digest of the full key.
    pub key_hash: String,
    /// Permission scopes granted (e.g. `["read"]`).
    pub permissions: Vec<String>,
    /// Requests-per-minute quota.
    pub rate_limit_per_minute: i32,
    /// Whether the key is still active.
    pub enabled: bool,
}

/// A cached checker (or geocode) result row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheRow {
    /// SHA-256 hex fingerprint, the primary key.
    pub fingerprint: String,
    /// Namespace (checker name, or `"geocode"`).
    pub namespace: String,
    /// Canonical input value the entry was computed for.
    pub canonical_value: String,
    /// Serialized result payload.
    pub result: serde_json::Value,
    /// When this entry expires.
    pub expires_at: DateTime<Utc>,
    /// When this entry was written.
    pub cached_at: DateTime<Utc>,
}

/// A persisted audit row for a completed request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRow {
    /// Server-assigned request identifier.
    pub check_id: String,
    /// Raw request input, as received.
    pub raw_input: serde_json::Value,
    /// Normalized canonical value.
    pub normalized_value: String,
    /// Final verdict string.
    pub verdict: String,
    /// Final score, 0-100.
    pub score: i16,
    /// Serialized `sources[]`.
    pub sources: serde_json::Value,
    /// Serialized summary.
    pub summary: serde_json::Value,
    /// Serialized response metadata.
    pub metadata: serde_json::Value,
    /// Total processing time, in milliseconds.
    pub processing_time_ms: i32,
    /// When the request was persisted.
    pub created_at: DateTime<Utc>,
}
