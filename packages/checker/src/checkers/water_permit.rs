//! Water-use-permit proximity checker.
//!
//! Always informational: reports nearby permits without ever failing.

use async_trait::async_trait;
use defarm_checker_models::{CheckerDescriptor, CheckerResult, Evidence, Status};
use defarm_database::spatial;
use defarm_input_models::NormalizedInput;

use super::{SUPPORTS_SPATIAL, resolve_point};
use crate::{CheckContext, Checker};

const BUFFER_METERS: f64 = 5_000.0;

const DESCRIPTOR: CheckerDescriptor = CheckerDescriptor {
    name: "water_permit",
    description: "Reports water-use permits within 5km of a point",
    category: defarm_checker_models::Category::Environmental,
    priority: 3,
    supported_input_types: SUPPORTS_SPATIAL,
    cache_ttl_seconds: 7 * 24 * 60 * 60,
    timeout_ms: 5_000,
    enabled: true,
};

/// Informational proximity report of water-use permits.
pub struct WaterPermitChecker;

#[async_trait]
impl Checker for WaterPermitChecker {
    fn descriptor(&self) -> &'static CheckerDescriptor {
        &DESCRIPTOR
    }

    async fn execute(&self, input: &NormalizedInput, ctx: &CheckContext) -> CheckerResult {
        let evidence_base = Evidence {
            data_source: "water_permits".to_string(),
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

        match spatial::water_permits_nearby(ctx.db.as_ref(), lon, lat, BUFFER_METERS).await {
            Ok(permits) => {
                let valid = permits.iter().filter(|p| p.status == "valid").count();
                let expired = permits.iter().filter(|p| p.status == "expired").count();
                let total_volume: f64 = permits.iter().filter_map(|p| p.authorized_volume_m3h).sum();

                CheckerResult {
                    status: Status::Pass,
                    severity: None,
                    message: format!(
                        "{} water-use permit(s) within {BUFFER_METERS:.0}m ({valid} valid, {expired} expired)",
                        permits.len()
                    ),
                    details: serde_json::json!({
                        "permits": permits,
                        "validCount": valid,
                        "expiredCount": expired,
                        "totalAuthorizedVolumeM3h": total_volume,
                    }),
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
