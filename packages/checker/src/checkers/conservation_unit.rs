//! Conservation-unit overlap checker.

use async_trait::async_trait;
use defarm_checker_models::{CheckerDescriptor, CheckerResult, Evidence, Severity, Status};
use defarm_database::spatial;
use defarm_input_models::NormalizedInput;

use super::{SUPPORTS_SPATIAL, resolve_point};
use crate::{CheckContext, Checker};

const DESCRIPTOR: CheckerDescriptor = CheckerDescriptor {
    name: "conservation_unit",
    description: "Checks whether a point falls within a conservation unit",
    category: defarm_checker_models::Category::Environmental,
    priority: 8,
    supported_input_types: SUPPORTS_SPATIAL,
    cache_ttl_seconds: 30 * 24 * 60 * 60,
    timeout_ms: 5_000,
    enabled: true,
};

/// Point-in-polygon check against conservation units, severity keyed on
/// protection group.
pub struct ConservationUnitChecker;

#[async_trait]
impl Checker for ConservationUnitChecker {
    fn descriptor(&self) -> &'static CheckerDescriptor {
        &DESCRIPTOR
    }

    async fn execute(&self, input: &NormalizedInput, ctx: &CheckContext) -> CheckerResult {
        let evidence_base = Evidence {
            data_source: "conservation_units".to_string(),
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

        match spatial::conservation_units_containing(ctx.db.as_ref(), lon, lat).await {
            Ok(units) if units.is_empty() => CheckerResult {
                status: Status::Pass,
                severity: None,
                message: "point does not overlap any conservation unit".to_string(),
                details: serde_json::Value::Null,
                evidence: evidence_base,
                execution_time_ms: 0,
                cached: false,
            },
            Ok(units) => {
                let severity = if units
                    .iter()
                    .any(|u| u.category_group == "Uso Sustentável")
                    && !units.iter().any(|u| u.category_group == "Proteção Integral")
                {
                    Severity::High
                } else {
                    Severity::Critical
                };

                CheckerResult {
                    status: Status::Fail,
                    severity: Some(severity),
                    message: format!(
                        "point overlaps {} conservation unit(s): {}",
                        units.len(),
                        units
                            .iter()
                            .map(|u| u.name.as_str())
                            .collect::<Vec<_>>()
                            .join(", ")
                    ),
                    details: serde_json::json!({ "units": units }),
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
