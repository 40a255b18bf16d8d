//! Real-time deforestation alert checker (`DETER`).

use async_trait::async_trait;
use defarm_checker_models::{CheckerDescriptor, CheckerResult, Evidence, Severity, Status};
use defarm_database::spatial;
use defarm_input_models::NormalizedInput;

use super::{SUPPORTS_SPATIAL, resolve_point};
use crate::{CheckContext, Checker};

const WITHIN_DAYS: i32 = 90;
const FORCE_CRITICAL_WITHIN_DAYS: i64 = 7;

const DESCRIPTOR: CheckerDescriptor = CheckerDescriptor {
    name: "deforestation_alert",
    description: "Checks whether a point falls within a recent DETER real-time deforestation alert",
    category: defarm_checker_models::Category::Environmental,
    priority: 10,
    supported_input_types: SUPPORTS_SPATIAL,
    cache_ttl_seconds: 60 * 60,
    timeout_ms: 5_000,
    enabled: true,
};

fn severity_for(class_name: &str, published_at: chrono::DateTime<chrono::Utc>) -> Severity {
    let age_days = (chrono::Utc::now() - published_at).num_days();
    if age_days <= FORCE_CRITICAL_WITHIN_DAYS {
        return Severity::Critical;
    }
    match class_name {
        "DESMATAMENTO_VEG" | "DESMATAMENTO_CR" | "CORTE_SELETIVO" => Severity::Critical,
        _ => Severity::High,
    }
}

/// Point-in-polygon check against `DETER` alerts published within the last
/// [`WITHIN_DAYS`] days.
pub struct DeforestationAlertChecker;

#[async_trait]
impl Checker for DeforestationAlertChecker {
    fn descriptor(&self) -> &'static CheckerDescriptor {
        &DESCRIPTOR
    }

    async fn execute(&self, input: &NormalizedInput, ctx: &CheckContext) -> CheckerResult {
        let evidence_base = Evidence {
            data_source: "deforestation_alerts".to_string(),
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

        match spatial::deforestation_alerts_containing(ctx.db.as_ref(), lon, lat, WITHIN_DAYS).await {
            Ok(alerts) if alerts.is_empty() => CheckerResult {
                status: Status::Pass,
                severity: None,
                message: format!(
                    "no real-time deforestation alerts in the last {WITHIN_DAYS} days at this point"
                ),
                details: serde_json::Value::Null,
                evidence: evidence_base,
                execution_time_ms: 0,
                cached: false,
            },
            Ok(alerts) => {
                let most_recent = &alerts[0];
                let severity = severity_for(&most_recent.class_name, most_recent.published_at);

                CheckerResult {
                    status: Status::Fail,
                    severity: Some(severity),
                    message: format!(
                        "{} active alert(s), most recent {} on {}",
                        alerts.len(),
                        most_recent.class_name,
                        most_recent.published_at.date_naive()
                    ),
                    details: serde_json::json!({ "alerts": alerts }),
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
