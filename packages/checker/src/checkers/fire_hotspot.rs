//! Fire-hotspot proximity checker.

use async_trait::async_trait;
use defarm_checker_models::{CheckerDescriptor, CheckerResult, Evidence, Severity, Status};
use defarm_database::spatial;
use defarm_input_models::NormalizedInput;

use super::{SUPPORTS_SPATIAL, resolve_point};
use crate::{CheckContext, Checker};

const BUFFER_METERS: f64 = 2_000.0;
const WITHIN_DAYS: i32 = 90;

const DESCRIPTOR: CheckerDescriptor = CheckerDescriptor {
    name: "fire_hotspot",
    description: "Checks for active-fire hotspots within a buffer of a point, over the last 90 days",
    category: defarm_checker_models::Category::Environmental,
    priority: 6,
    supported_input_types: SUPPORTS_SPATIAL,
    cache_ttl_seconds: 60 * 60,
    timeout_ms: 5_000,
    enabled: true,
};

/// Proximity check against recent fire hotspot detections.
pub struct FireHotspotChecker;

#[async_trait]
impl Checker for FireHotspotChecker {
    fn descriptor(&self) -> &'static CheckerDescriptor {
        &DESCRIPTOR
    }

    async fn execute(&self, input: &NormalizedInput, ctx: &CheckContext) -> CheckerResult {
        let evidence_base = Evidence {
            data_source: "fire_hotspots".to_string(),
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

        match spatial::fire_hotspots_nearby(ctx.db.as_ref(), lon, lat, BUFFER_METERS, WITHIN_DAYS).await {
            Ok(hotspots) if hotspots.is_empty() => CheckerResult {
                status: Status::Pass,
                severity: None,
                message: format!(
                    "no fire hotspots within {BUFFER_METERS:.0}m in the last {WITHIN_DAYS} days"
                ),
                details: serde_json::Value::Null,
                evidence: evidence_base,
                execution_time_ms: 0,
                cached: false,
            },
            Ok(hotspots) => CheckerResult {
                status: Status::Fail,
                severity: Some(Severity::Medium),
                message: format!(
                    "{} fire hotspot(s) within {BUFFER_METERS:.0}m, closest {:.0}m away",
                    hotspots.len(),
                    hotspots[0].distance_meters
                ),
                details: serde_json::json!({ "hotspots": hotspots }),
                evidence: evidence_base,
                execution_time_ms: 0,
                cached: false,
            },
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
