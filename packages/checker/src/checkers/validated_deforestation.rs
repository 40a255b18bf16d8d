//! Validated-deforestation proximity checker (`MapBiomas`).

use async_trait::async_trait;
use defarm_checker_models::{CheckerDescriptor, CheckerResult, Evidence, Severity, Status};
use defarm_database::spatial;
use defarm_input_models::NormalizedInput;

use super::{SUPPORTS_SPATIAL, resolve_point};
use crate::{CheckContext, Checker};

const BUFFER_METERS: f64 = 1_000.0;
const WITHIN_DAYS: i32 = 365 * 2;
const RECENT_ALERT_MONTHS_DAYS: i64 = 180;
const SIGNIFICANT_AREA_HECTARES: f64 = 25.0;

const DESCRIPTOR: CheckerDescriptor = CheckerDescriptor {
    name: "validated_deforestation",
    description: "Checks for validated (MapBiomas) deforestation within 1km of a point, over the last 2 years",
    category: defarm_checker_models::Category::Environmental,
    priority: 7,
    supported_input_types: SUPPORTS_SPATIAL,
    cache_ttl_seconds: 24 * 60 * 60,
    timeout_ms: 5_000,
    enabled: true,
};

/// Proximity check against validated deforestation polygons.
pub struct ValidatedDeforestationChecker;

#[async_trait]
impl Checker for ValidatedDeforestationChecker {
    fn descriptor(&self) -> &'static CheckerDescriptor {
        &DESCRIPTOR
    }

    async fn execute(&self, input: &NormalizedInput, ctx: &CheckContext) -> CheckerResult {
        let evidence_base = Evidence {
            data_source: "validated_deforestation".to_string(),
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

        match spatial::validated_deforestation_nearby(ctx.db.as_ref(), lon, lat, BUFFER_METERS, WITHIN_DAYS)
            .await
        {
            Ok(polygons) if polygons.is_empty() => CheckerResult {
                status: Status::Pass,
                severity: None,
                message: format!(
                    "no validated deforestation within {BUFFER_METERS:.0}m in the last 2 years"
                ),
                details: serde_json::Value::Null,
                evidence: evidence_base,
                execution_time_ms: 0,
                cached: false,
            },
            Ok(polygons) => {
                let has_overlap_or_large = polygons.iter().any(|p| {
                    p.overlaps_protected_area || p.overlaps_embargo || p.area_hectares >= SIGNIFICANT_AREA_HECTARES
                });
                let has_recent = polygons.iter().any(|p| {
                    chrono::Utc::now().signed_duration_since(p.detected_at).num_days()
                        <= RECENT_ALERT_MONTHS_DAYS
                });

                let severity = if has_overlap_or_large {
                    Severity::Critical
                } else if has_recent {
                    Severity::High
                } else {
                    Severity::Medium
                };

                CheckerResult {
                    status: Status::Fail,
                    severity: Some(severity),
                    message: format!(
                        "{} validated deforestation polygon(s) within {BUFFER_METERS:.0}m, closest {:.0}m away",
                        polygons.len(),
                        polygons[0].distance_meters
                    ),
                    details: serde_json::json!({ "polygons": polygons }),
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
