//! Indigenous-land overlap checker.

use async_trait::async_trait;
use defarm_checker_models::{CheckerDescriptor, CheckerResult, Evidence, Severity, Status};
use defarm_database::spatial;
use defarm_input_models::NormalizedInput;

use super::{SUPPORTS_SPATIAL, resolve_point};
use crate::{CheckContext, Checker};

const DESCRIPTOR: CheckerDescriptor = CheckerDescriptor {
    name: "indigenous_land",
    description: "Checks whether a point falls within a demarcated indigenous land",
    category: defarm_checker_models::Category::Environmental,
    priority: 9,
    supported_input_types: SUPPORTS_SPATIAL,
    cache_ttl_seconds: 30 * 24 * 60 * 60,
    timeout_ms: 5_000,
    enabled: true,
};

/// Point-in-polygon check against demarcated indigenous lands.
pub struct IndigenousLandChecker;

#[async_trait]
impl Checker for IndigenousLandChecker {
    fn descriptor(&self) -> &'static CheckerDescriptor {
        &DESCRIPTOR
    }

    async fn execute(&self, input: &NormalizedInput, ctx: &CheckContext) -> CheckerResult {
        let evidence_base = Evidence {
            data_source: "indigenous_lands".to_string(),
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

        match spatial::indigenous_lands_containing(ctx.db.as_ref(), lon, lat).await {
            Ok(lands) if lands.is_empty() => CheckerResult {
                status: Status::Pass,
                severity: None,
                message: "point does not overlap any demarcated indigenous land".to_string(),
                details: serde_json::Value::Null,
                evidence: evidence_base,
                execution_time_ms: 0,
                cached: false,
            },
            Ok(lands) => {
                let critical = lands
                    .iter()
                    .any(|l| matches!(l.phase.as_str(), "Regularizada" | "Homologada"));
                let severity = if critical { Severity::Critical } else { Severity::High };

                CheckerResult {
                    status: Status::Fail,
                    severity: Some(severity),
                    message: format!(
                        "point overlaps {} indigenous land(s): {}",
                        lands.len(),
                        lands
                            .iter()
                            .map(|l| l.name.as_str())
                            .collect::<Vec<_>>()
                            .join(", ")
                    ),
                    details: serde_json::json!({ "lands": lands }),
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
