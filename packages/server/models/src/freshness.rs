//! Health-endpoint DTOs and the freshness classification described in
//! §4.9: per-source thresholds are configuration, not hard-coded, mirroring
//! the teacher's `service_registry`'s per-provider TOML loading pattern —
//! here the config is a small table keyed by `update_cadence` rather than
//! an embedded file, since there is only one axis (cadence) to vary on.

use defarm_database_models::DataSourceRow;
use serde::Serialize;
use strum::{AsRefStr, Display, EnumString};

/// How stale a data source's last update is, relative to its cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, EnumString, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FreshnessStatus {
    /// Updated within the warning threshold.
    Fresh,
    /// Past the warning threshold but not yet stale.
    Warning,
    /// Past the stale threshold.
    Stale,
    /// No `last_updated` has ever been recorded for this source.
    NeverUpdated,
}

/// Warning/stale thresholds, in hours since last update, for one update
/// cadence.
#[derive(Debug, Clone, Copy)]
pub struct FreshnessProfile {
    /// Hours since update at which a source moves from `fresh` to `warning`.
    pub warning_hours: f64,
    /// Hours since update at which a source moves to `stale`.
    pub stale_hours: f64,
}

impl FreshnessProfile {
    /// Real-time/daily-refreshed sources (e.g. deforestation alerts).
    pub const DAILY: Self = Self {
        warning_hours: 48.0,
        stale_hours: 96.0,
    };
    /// Weekly-refreshed sources.
    pub const WEEKLY: Self = Self {
        warning_hours: 168.0,
        stale_hours: 336.0,
    };
    /// Monthly-refreshed sources (e.g. PRODES annual deforestation).
    pub const MONTHLY: Self = Self {
        warning_hours: 720.0,
        stale_hours: 1_440.0,
    };

    /// Resolves the profile for a `data_sources.update_cadence` value,
    /// defaulting to [`Self::DAILY`] when the cadence is unrecognized.
    #[must_use]
    pub fn for_cadence(cadence: &str) -> Self {
        match cadence {
            "weekly" => Self::WEEKLY,
            "monthly" => Self::MONTHLY,
            _ => Self::DAILY,
        }
    }

    /// Classifies `hours_since_update` against this profile.
    #[must_use]
    pub fn classify(&self, hours_since_update: f64) -> FreshnessStatus {
        if hours_since_update >= self.stale_hours {
            FreshnessStatus::Stale
        } else if hours_since_update >= self.warning_hours {
            FreshnessStatus::Warning
        } else {
            FreshnessStatus::Fresh
        }
    }
}

/// Freshness report for a single data source.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceFreshness {
    /// Data source name.
    pub name: String,
    /// Classified freshness.
    pub status: FreshnessStatus,
    /// Hours elapsed since the source's last update.
    pub hours_since_update: f64,
    /// Row count in the source's backing table, if tracked.
    pub total_records: Option<i64>,
}

/// Classifies a [`DataSourceRow`] as of `now`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn classify_source(row: &DataSourceRow, now: chrono::DateTime<chrono::Utc>) -> SourceFreshness {
    let hours_since_update = (now - row.last_updated).num_seconds().max(0) as f64 / 3600.0;
    let profile = FreshnessProfile::for_cadence(&row.update_cadence);
    SourceFreshness {
        name: row.name.clone(),
        status: profile.classify(hours_since_update),
        hours_since_update,
        total_records: row.total_records,
    }
}

/// Overall reachability/freshness status for `GET /health`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, EnumString, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum HealthStatus {
    /// Everything reachable and fresh (or only within warning thresholds).
    Ok,
    /// Reachable, but at least one source is stale or never updated.
    Degraded,
    /// Critical infrastructure (database) is unreachable.
    Down,
}

/// Response body for `GET /health`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Overall status.
    pub status: HealthStatus,
    /// Whether the relational store answered a trivial query.
    pub database_reachable: bool,
    /// Per-source freshness.
    pub sources: Vec<SourceFreshness>,
}

impl HealthResponse {
    /// Derives overall `status` from reachability and per-source freshness.
    #[must_use]
    pub fn new(database_reachable: bool, sources: Vec<SourceFreshness>) -> Self {
        let status = if !database_reachable {
            HealthStatus::Down
        } else if sources
            .iter()
            .any(|s| matches!(s.status, FreshnessStatus::Stale | FreshnessStatus::NeverUpdated))
        {
            HealthStatus::Degraded
        } else {
            HealthStatus::Ok
        };

        Self {
            status,
            database_reachable,
            sources,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn daily_profile_classifies_thresholds() {
        let profile = FreshnessProfile::DAILY;
        assert_eq!(profile.classify(10.0), FreshnessStatus::Fresh);
        assert_eq!(profile.classify(60.0), FreshnessStatus::Warning);
        assert_eq!(profile.classify(100.0), FreshnessStatus::Stale);
    }

    #[test]
    #[allow(clippy::float_cmp)]
    fn unknown_cadence_defaults_to_daily() {
        let profile = FreshnessProfile::for_cadence("hourly");
        assert_eq!(profile.warning_hours, FreshnessProfile::DAILY.warning_hours);
    }

    #[test]
    fn overall_status_down_wins_over_stale_sources() {
        let sources = vec![SourceFreshness {
            name: "x".to_string(),
            status: FreshnessStatus::Stale,
            hours_since_update: 200.0,
            total_records: None,
        }];
        let response = HealthResponse::new(false, sources);
        assert_eq!(response.status, HealthStatus::Down);
    }

    #[test]
    fn overall_status_degraded_when_any_source_stale() {
        let sources = vec![
            SourceFreshness {
                name: "a".to_string(),
                status: FreshnessStatus::Fresh,
                hours_since_update: 1.0,
                total_records: None,
            },
            SourceFreshness {
                name: "b".to_string(),
                status: FreshnessStatus::Stale,
                hours_since_update: 200.0,
                total_records: None,
            },
        ];
        let response = HealthResponse::new(true, sources);
        assert_eq!(response.status, HealthStatus::Degraded);
    }

    #[test]
    fn overall_status_ok_when_all_fresh_or_warning() {
        let sources = vec![SourceFreshness {
            name: "a".to_string(),
            status: FreshnessStatus::Warning,
            hours_since_update: 60.0,
            total_records: None,
        }];
        let response = HealthResponse::new(true, sources);
        assert_eq!(response.status, HealthStatus::Ok);
    }
}
