//! Environmental-embargoes-by-document checker.

use async_trait::async_trait;
use defarm_checker_models::{CheckerDescriptor, CheckerResult, Evidence, Severity, Status};
use defarm_database::documents;
use defarm_input_models::NormalizedInput;

use crate::{CheckContext, Checker};
use super::SUPPORTS_DOCUMENT;

const FIRST_K: u32 = 5;

const DESCRIPTOR: CheckerDescriptor = CheckerDescriptor {
    name: "environmental_embargoes",
    description: "Checks a document against IBAMA's registry of environmental embargoes",
    category: defarm_checker_models::Category::Environmental,
    priority: 8,
    supported_input_types: SUPPORTS_DOCUMENT,
    cache_ttl_seconds: 7 * 24 * 60 * 60,
    timeout_ms: 3_000,
    enabled: true,
};

/// Exact-match check of a document against environmental embargoes,
/// severity scaled by aggregate embargoed area.
pub struct EnvironmentalEmbargoesChecker;

#[async_trait]
impl Checker for EnvironmentalEmbargoesChecker {
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

        match documents::lookup_embargoes(ctx.db.as_ref(), &input.canonical_value, FIRST_K).await {
            Ok(embargoes) if embargoes.is_empty() => CheckerResult {
                status: Status::Pass,
                severity: None,
                message: "no environmental embargoes found for this document".to_string(),
                details: serde_json::Value::Null,
                evidence: evidence_base,
                execution_time_ms: 0,
                cached: false,
            },
            Ok(embargoes) => {
                let total_area: f64 = embargoes.iter().map(|e| e.area_hectares).sum();
                let severity = if total_area > 1000.0 {
                    Severity::Critical
                } else if total_area >= 100.0 {
                    Severity::High
                } else {
                    Severity::Medium
                };

                CheckerResult {
                    status: Status::Fail,
                    severity: Some(severity),
                    message: format!(
                        "{} environmental embargo(es) totalling {total_area:.1} ha",
                        embargoes.len()
                    ),
                    details: serde_json::json!({ "embargoes": embargoes, "totalAreaHectares": total_area }),
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
