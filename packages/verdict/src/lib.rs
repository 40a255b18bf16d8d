#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Severity-weighted score aggregation and verdict classification over a
//! set of [`SourceResult`]s.
//!
//! Synchronous and I/O-free by design: every function here is a plain
//! arithmetic/classification helper over already-computed results, the same
//! way the teacher's crime-severity model exposes const-arithmetic helpers
//! rather than performing any lookups itself.

use std::collections::HashMap;

use defarm_checker_models::{SourceResult, Status};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Final compliance verdict for a request.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    /// All applicable checkers passed.
    Compliant,
    /// No failures, but at least one warning or non-pass applicable result.
    Partial,
    /// At least one applicable checker failed.
    NonCompliant,
    /// No applicable checkers ran (every result was `ERROR`/`NOT_APPLICABLE`).
    Unknown,
}

/// Per-status counts over a request's `sources[]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    /// Number of `PASS` results.
    pub pass: usize,
    /// Number of `FAIL` results.
    pub fail: usize,
    /// Number of `WARNING` results.
    pub warning: usize,
    /// Number of `ERROR` results.
    pub error: usize,
    /// Number of `NOT_APPLICABLE` results.
    pub not_applicable: usize,
}

/// The fully-synthesized verdict: score, classification, summary, and
/// cache-hit rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Synthesis {
    /// Aggregate score, 0-100.
    pub score: u8,
    /// Overall verdict.
    pub verdict: Verdict,
    /// Per-status counts.
    pub summary: Summary,
    /// Fraction of applicable results that were served from cache, in [0, 1].
    pub cache_hit_rate: f64,
}

fn severity_weight(severity: Option<defarm_checker_models::Severity>) -> f64 {
    severity.map_or(0.0, defarm_checker_models::Severity::weight)
}

/// Computes the aggregate score over `sources`' applicable results.
///
/// `score = round(Σ contribution / Σ weight)`, where `PASS` contributes
/// `100 · weight`, `WARNING` contributes `50 · weight`, `FAIL` contributes
/// `0`, and `weight` is `1.0` for non-`FAIL` results or the result's
/// severity weight for `FAIL`. Returns `0` if there are no applicable
/// results.
#[must_use]
pub fn score(sources: &[SourceResult]) -> u8 {
    let mut weighted_sum = 0.0;
    let mut weight_total = 0.0;

    for source in sources {
        if !source.result.is_applicable() {
            continue;
        }
        let weight = match source.result.status {
            Status::Fail => severity_weight(source.result.severity),
            _ => 1.0,
        };
        let contribution = match source.result.status {
            Status::Pass => 100.0 * weight,
            Status::Warning => 50.0 * weight,
            Status::Fail => 0.0,
            Status::Error | Status::NotApplicable => unreachable!("filtered above"),
        };
        weighted_sum += contribution;
        weight_total += weight;
    }

    if weight_total <= 0.0 {
        return 0;
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let rounded = (weighted_sum / weight_total).round() as u8;
    rounded
}

/// Classifies the overall verdict for `sources`.
#[must_use]
pub fn classify(sources: &[SourceResult]) -> Verdict {
    let applicable: Vec<_> = sources.iter().filter(|s| s.result.is_applicable()).collect();

    if applicable.is_empty() {
        return Verdict::Unknown;
    }
    if applicable.iter().any(|s| s.result.status == Status::Fail) {
        return Verdict::NonCompliant;
    }
    if applicable.iter().all(|s| s.result.status == Status::Pass) {
        return Verdict::Compliant;
    }
    Verdict::Partial
}

/// Counts results per status.
#[must_use]
pub fn summarize(sources: &[SourceResult]) -> Summary {
    let mut summary = Summary::default();
    for source in sources {
        match source.result.status {
            Status::Pass => summary.pass += 1,
            Status::Fail => summary.fail += 1,
            Status::Warning => summary.warning += 1,
            Status::Error => summary.error += 1,
            Status::NotApplicable => summary.not_applicable += 1,
        }
    }
    summary
}

/// Fraction of applicable results that were served from cache.
#[must_use]
pub fn cache_hit_rate(sources: &[SourceResult]) -> f64 {
    let applicable: Vec<_> = sources.iter().filter(|s| s.result.is_applicable()).collect();
    if applicable.is_empty() {
        return 0.0;
    }
    let hits = applicable.iter().filter(|s| s.result.cached).count();
    #[allow(clippy::cast_precision_loss)]
    let rate = hits as f64 / applicable.len() as f64;
    rate
}

/// Runs [`score`], [`classify`], [`summarize`], and [`cache_hit_rate`]
/// together.
#[must_use]
pub fn synthesize(sources: &[SourceResult]) -> Synthesis {
    Synthesis {
        score: score(sources),
        verdict: classify(sources),
        summary: summarize(sources),
        cache_hit_rate: cache_hit_rate(sources),
    }
}

/// Groups `sources` by category, for clients that want a category-level
/// breakdown alongside the flat list.
#[must_use]
pub fn group_by_category(
    sources: &[SourceResult],
) -> HashMap<defarm_checker_models::Category, Vec<SourceResult>> {
    let mut grouped: HashMap<defarm_checker_models::Category, Vec<SourceResult>> = HashMap::new();
    for source in sources {
        grouped.entry(source.category).or_default().push(source.clone());
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use defarm_checker_models::{Category, Evidence, Severity};

    fn result(status: Status, severity: Option<Severity>, cached: bool) -> SourceResult {
        SourceResult {
            name: "test_checker".to_string(),
            category: Category::Environmental,
            priority: 5,
            result: defarm_checker_models::CheckerResult {
                status,
                severity,
                message: String::new(),
                details: serde_json::Value::Null,
                evidence: Evidence {
                    data_source: "test".to_string(),
                    url: None,
                    last_update: None,
                    raw: None,
                },
                execution_time_ms: 0,
                cached,
            },
        }
    }

    #[test]
    fn all_pass_is_compliant_with_full_score() {
        let sources = vec![
            result(Status::Pass, None, false),
            result(Status::Pass, None, false),
        ];
        assert_eq!(classify(&sources), Verdict::Compliant);
        assert_eq!(score(&sources), 100);
    }

    #[test]
    fn any_fail_is_non_compliant() {
        let sources = vec![
            result(Status::Pass, None, false),
            result(Status::Fail, Some(Severity::Critical), false),
        ];
        assert_eq!(classify(&sources), Verdict::NonCompliant);
        assert_eq!(score(&sources), 50);
    }

    #[test]
    fn low_severity_fail_costs_less_than_critical() {
        let low = vec![result(Status::Fail, Some(Severity::Low), false)];
        let critical = vec![result(Status::Fail, Some(Severity::Critical), false)];
        assert_eq!(score(&low), 0);
        assert_eq!(score(&critical), 0);
        // both score 0 (FAIL always contributes 0), but the critical result
        // dominates the denominator more heavily when mixed with a PASS.
        let mixed_low = vec![
            result(Status::Pass, None, false),
            result(Status::Fail, Some(Severity::Low), false),
        ];
        let mixed_critical = vec![
            result(Status::Pass, None, false),
            result(Status::Fail, Some(Severity::Critical), false),
        ];
        assert!(score(&mixed_low) > score(&mixed_critical));
    }

    #[test]
    fn warning_without_fail_is_partial() {
        let sources = vec![
            result(Status::Pass, None, false),
            result(Status::Warning, None, false),
        ];
        assert_eq!(classify(&sources), Verdict::Partial);
    }

    #[test]
    fn only_inapplicable_results_is_unknown() {
        let sources = vec![
            result(Status::NotApplicable, None, false),
            result(Status::Error, None, false),
        ];
        assert_eq!(classify(&sources), Verdict::Unknown);
        assert_eq!(score(&sources), 0);
    }

    #[test]
    fn error_and_not_applicable_excluded_from_score_denominator() {
        let sources = vec![
            result(Status::Pass, None, false),
            result(Status::Error, None, false),
            result(Status::NotApplicable, None, false),
        ];
        assert_eq!(score(&sources), 100);
    }

    #[test]
    fn cache_hit_rate_counts_only_applicable() {
        let sources = vec![
            result(Status::Pass, None, true),
            result(Status::Pass, None, false),
            result(Status::NotApplicable, None, true),
        ];
        assert!((cache_hit_rate(&sources) - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn verdict_round_trips_through_strum() {
        for v in [
            Verdict::Compliant,
            Verdict::Partial,
            Verdict::NonCompliant,
            Verdict::Unknown,
        ] {
            let s = v.to_string();
            let parsed: Verdict = s.parse().unwrap();
            assert_eq!(v, parsed);
        }
        assert_eq!(Verdict::NonCompliant.to_string(), "NON_COMPLIANT");
    }

    #[test]
    fn summary_counts_each_status() {
        let sources = vec![
            result(Status::Pass, None, false),
            result(Status::Fail, Some(Severity::High), false),
            result(Status::Warning, None, false),
            result(Status::Error, None, false),
            result(Status::NotApplicable, None, false),
        ];
        let summary = summarize(&sources);
        assert_eq!(summary.pass, 1);
        assert_eq!(summary.fail, 1);
        assert_eq!(summary.warning, 1);
        assert_eq!(summary.error, 1);
        assert_eq!(summary.not_applicable, 1);
    }
}
