#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Checker taxonomy and result types shared by every checker implementation
//! and by the verdict engine.

use defarm_input_models::InputType;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Top-level grouping a checker belongs to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Category {
    /// Deforestation, fire, water, and protected-area checks.
    Environmental,
    /// Labor practices and human-rights checks.
    Social,
    /// Sanctions, embargoes, and registry-status checks.
    Legal,
    /// Certification/registry standing checks (e.g. CAR status).
    Certification,
}

impl Category {
    /// All category variants.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Environmental,
            Self::Social,
            Self::Legal,
            Self::Certification,
        ]
    }
}

/// How serious a `FAIL` result is. Populated only when `status == Fail`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    /// No severity; only valid alongside a non-`FAIL` status.
    None = 0,
    /// Low severity.
    Low = 1,
    /// Medium severity.
    Medium = 2,
    /// High severity.
    High = 3,
    /// Critical severity.
    Critical = 4,
}

impl Severity {
    /// The weight used in score aggregation (§4.7): `FAIL` contributions
    /// are scaled down by this factor relative to a clean `PASS`.
    #[must_use]
    pub const fn weight(self) -> f64 {
        match self {
            Self::Critical => 1.0,
            Self::High => 0.75,
            Self::Medium => 0.5,
            Self::Low => 0.25,
            Self::None => 0.0,
        }
    }
}

/// The outcome of running a single checker.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    /// No compliance issue found.
    Pass,
    /// A compliance issue was found.
    Fail,
    /// Informational concern that does not constitute a failure.
    Warning,
    /// The checker could not complete (timeout, data-store error, bug).
    Error,
    /// The checker's input type doesn't apply to this request.
    NotApplicable,
}

impl Status {
    /// `true` for `Error`/`NotApplicable`, the two statuses the verdict
    /// engine excludes from scoring (§4.7, §9 "applicable result").
    #[must_use]
    pub const fn is_inapplicable(self) -> bool {
        matches!(self, Self::Error | Self::NotApplicable)
    }
}

/// Where a checker's evidence came from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evidence {
    /// Name of the backing data source (matches `data_sources.name`).
    pub data_source: String,
    /// A reference URL for the source, when one exists.
    pub url: Option<String>,
    /// Last-updated timestamp for the backing source, when known.
    pub last_update: Option<chrono::DateTime<chrono::Utc>>,
    /// Opaque raw evidence payload; shape varies per checker.
    pub raw: Option<serde_json::Value>,
}

/// The result of executing one checker against one normalized input.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckerResult {
    /// Outcome of the check.
    pub status: Status,
    /// Severity, populated iff `status == Fail`.
    pub severity: Option<Severity>,
    /// Human-readable summary.
    pub message: String,
    /// Opaque structured detail; shape varies per checker.
    pub details: serde_json::Value,
    /// Evidence backing this result.
    pub evidence: Evidence,
    /// Wall-clock execution time, in milliseconds.
    pub execution_time_ms: u64,
    /// Whether this result was served from cache.
    pub cached: bool,
}

impl CheckerResult {
    /// `true` for `Error`/`NotApplicable`.
    #[must_use]
    pub const fn is_applicable(&self) -> bool {
        !self.status.is_inapplicable()
    }
}

/// Static metadata describing a checker, independent of any particular
/// request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckerDescriptor {
    /// Globally unique checker name.
    pub name: &'static str,
    /// Human-readable description.
    pub description: &'static str,
    /// Category grouping.
    pub category: Category,
    /// Scheduling priority within `sources[]`; higher runs/sorts first.
    pub priority: u8,
    /// Input types this checker can evaluate.
    pub supported_input_types: &'static [InputType],
    /// How long a cached result for this checker remains valid.
    pub cache_ttl_seconds: i64,
    /// Per-invocation timeout.
    pub timeout_ms: u64,
    /// Whether this checker is active. Individually overridable via
    /// `CHECKER_<NAME>_ENABLED`.
    pub enabled: bool,
}

impl CheckerDescriptor {
    /// Whether this checker declares support for `input_type`.
    #[must_use]
    pub fn applies_to(&self, input_type: InputType) -> bool {
        self.supported_input_types.contains(&input_type)
    }
}

/// A checker's descriptor metadata merged with its result, as presented
/// externally in a response's `sources[]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceResult {
    /// Checker name.
    pub name: String,
    /// Category grouping.
    pub category: Category,
    /// Scheduling priority, carried through for client-side display.
    pub priority: u8,
    /// The checker's result.
    #[serde(flatten)]
    pub result: CheckerResult,
}

/// Errors a checker's `execute` may report outside the ordinary
/// `CheckerResult { status: Error, .. }` path — used internally by the
/// `instrument()` wrapper to build that result.
#[derive(Debug, thiserror::Error)]
pub enum CheckerError {
    /// The backing data store returned an error.
    #[error("data store error: {0}")]
    Store(String),
    /// The checker exceeded its configured timeout.
    #[error("timeout")]
    Timeout,
    /// Anything else unexpected.
    #[error("{0}")]
    Other(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_weight_ordering() {
        assert!(Severity::Critical.weight() > Severity::High.weight());
        assert!(Severity::High.weight() > Severity::Medium.weight());
        assert!(Severity::Medium.weight() > Severity::Low.weight());
        assert!(Severity::Low.weight() > Severity::None.weight());
    }

    #[test]
    fn status_inapplicable_set() {
        assert!(Status::Error.is_inapplicable());
        assert!(Status::NotApplicable.is_inapplicable());
        assert!(!Status::Pass.is_inapplicable());
        assert!(!Status::Fail.is_inapplicable());
        assert!(!Status::Warning.is_inapplicable());
    }

    #[test]
    fn category_round_trips() {
        for c in Category::all() {
            let s = c.to_string();
            let parsed: Category = s.parse().unwrap();
            assert_eq!(*c, parsed);
        }
    }
}
