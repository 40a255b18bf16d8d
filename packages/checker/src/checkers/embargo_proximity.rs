//! Embargo-proximity checker: nearby environmental embargoes by location,
//! extending the document-indexed embargoes checker with a spatial view.

use async_trait::async_trait;
use defarm_checker_models::{CheckerDescriptor, CheckerResult, Evidence, Severity, Status};
use defarm_database::spatial;
use defarm_input_models::NormalizedInput;

use super::{SUPPORTS_SPATIAL, resolve_point};
use crate::{CheckContext, Checker};

const BUFFER_METERS: f64 = 5_000.0;
const NEAR_METERS: f64 = 500.0;
const FAR_METERS: f64 = 2_500.0;

const DESCRIPTOR: CheckerDescriptor = CheckerDescriptor {
    name: "embargo_proximity",
    description: "Checks for environmental embargoes within 5km of a point, severity scaled by distance",
    category: defarm_checker_models::Category::Environmental,
    priority: 7,
    supported_input_types: SUPPORTS_SPATIAL,
    cache_ttl_seconds: 7 * 24 * 60 * 60,
    timeout_ms: 5_000,
    enabled: true,
};

/// Proximity view of environmental embargoes, complementing the
/// document-indexed embargoes checker.
pub struct EmbargoProximityChecker;

#[async_trait]
impl Checker for EmbargoProximityChecker {
    fn descriptor(&self) -> &'static CheckerDescriptor {
        &DESCRIPTOR
    }

    async fn execute(&self, input: &NormalizedInput, ctx: &CheckContext) -> CheckerResult {
        let evidence_base = Evidence {
            data_source: "environmental_embargoes".to_string(),
            url: None,
            last_update: None,
            raw: None,
        };

        let (lon, lat) = match resolve_point(input, ctx.db.as_ref()).await {
            Ok(Some(point)) => point,
            Ok(None) => {
                return CheckerResult {
                    status: Status::Pass,
                    severity: None,
                    message: "no known location for this input".to_string(),
                    details: serde_json::Value::Null,
                    evidence: evidence_base,
                    execution_time_ms: 0,
                    cached: false,
                };
            }
            Err(err) => {
                return CheckerResult {
                    status: Status::Error,
                    severity: None,
                    message: err.to_string(),
                    details: serde_json::Value::Null,
                    evidence: evidence_base,
                    execution_time_ms: 0,
                    cached: false,
                };
            }
        };

        match spatial::embargoes_nearby(ctx.db.as_ref(), lon, lat, BUFFER_METERS).await {
            Ok(nearby) if nearby.is_empty() => CheckerResult {
                status: Status::Pass,
                severity: None,
                message: format!("no environmental embargoes within {BUFFER_METERS:.0}m"),
                details: serde_json::Value::Null,
                evidence: evidence_base,
                execution_time_ms: 0,
                cached: false,
            },
            Ok(nearby) => {
                let closest_distance = nearby[0].1;
                let severity = if closest_distance <= NEAR_METERS {
                    Severity::Critical
                } else if closest_distance <= FAR_METERS {
                    Severity::High
                } else {
                    Severity::Medium
                };

                let rows: Vec<_> = nearby.iter().map(|(row, _)| row).collect();
                CheckerResult {
                    status: Status::Fail,
                    severity: Some(severity),
                    message: format!(
                        "{} environmental embargo(es) within {BUFFER_METERS:.0}m, closest {closest_distance:.0}m away",
                        nearby.len()
                    ),
                    details: serde_json::json!({ "embargoes": rows, "closestDistanceMeters": closest_distance }),
                    evidence: evidence_base,
                    execution_time_ms: 0,
                    cached: false,
                }
            }
            Err(err) => CheckerResult {
                status: Status::Error,
                severity: None,
                message: err.to_string(),
                details: serde_json::Value::Null,
                evidence: evidence_base,
                execution_time_ms: 0,
                cached: false,
            },
        }
    }
}
