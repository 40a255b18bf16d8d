//! Annual-deforestation containment checker (`PRODES`).

use async_trait::async_trait;
use defarm_checker_models::{CheckerDescriptor, CheckerResult, Evidence, Severity, Status};
use defarm_database::spatial;
use defarm_input_models::NormalizedInput;

use super::{SUPPORTS_SPATIAL, resolve_point};
use crate::{CheckContext, Checker};

const DESCRIPTOR: CheckerDescriptor = CheckerDescriptor {
    name: "annual_deforestation",
    description: "Checks whether a point falls within a PRODES annual deforestation polygon",
    category: defarm_checker_models::Category::Environmental,
    priority: 7,
    supported_input_types: SUPPORTS_SPATIAL,
    cache_ttl_seconds: 7 * 24 * 60 * 60,
    timeout_ms: 5_000,
    enabled: true,
};

/// Point-in-polygon check against `PRODES` annual-deforestation polygons.
pub struct AnnualDeforestationChecker;

#[async_trait]
impl Checker for AnnualDeforestationChecker {
    fn descriptor(&self) -> &'static CheckerDescriptor {
        &DESCRIPTOR
    }

    async fn execute(&self, input: &NormalizedInput, ctx: &CheckContext) -> CheckerResult {
        let evidence_base = Evidence {
            data_source: "deforestation_annual".to_string(),
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

        match spatial::annual_deforestation_containing(ctx.db.as_ref(), lon, lat).await {
            Ok(polygons) if polygons.is_empty() => CheckerResult {
                status: Status::Pass,
                severity: None,
                message: "point is not within any annual deforestation polygon".to_string(),
                details: serde_json::Value::Null,
                evidence: evidence_base,
                execution_time_ms: 0,
                cached: false,
            },
            Ok(polygons) => {
                let most_recent = &polygons[0];
                CheckerResult {
                    status: Status::Fail,
                    severity: Some(Severity::High),
                    message: format!(
                        "point is within a {} ({} ha, {})",
                        most_recent.year, most_recent.area_hectares, most_recent.municipality
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
