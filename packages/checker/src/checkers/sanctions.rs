//! Sanctions-registry checker (`CEIS`/`CNEP`/`CEAF`).

use async_trait::async_trait;
use defarm_checker_models::{CheckerDescriptor, CheckerResult, Evidence, Severity, Status};
use defarm_database::documents;
use defarm_input_models::NormalizedInput;

use crate::{CheckContext, Checker};
use super::SUPPORTS_DOCUMENT;

const DESCRIPTOR: CheckerDescriptor = CheckerDescriptor {
    name: "sanctions",
    description: "Checks a document against the federal sanctions registries (CEIS, CNEP, CEAF)",
    category: defarm_checker_models::Category::Legal,
    priority: 8,
    supported_input_types: SUPPORTS_DOCUMENT,
    cache_ttl_seconds: 7 * 24 * 60 * 60,
    timeout_ms: 3_000,
    enabled: true,
};

/// Exact-match check of a document against the sanctions registry.
pub struct SanctionsChecker;

#[async_trait]
impl Checker for SanctionsChecker {
    fn descriptor(&self) -> &'static CheckerDescriptor {
        &DESCRIPTOR
    }

    async fn execute(&self, input: &NormalizedInput, ctx: &CheckContext) -> CheckerResult {
        let evidence_base = Evidence {
            data_source: "sanctions_registry".to_string(),
            url: None,
            last_update: None,
            raw: None,
        };

        match documents::lookup_sanctions(ctx.db.as_ref(), &input.canonical_value).await {
            Ok(sanctions) if sanctions.is_empty() => CheckerResult {
                status: Status::Pass,
                severity: None,
                message: "no active sanctions found for this document".to_string(),
                details: serde_json::Value::Null,
                evidence: evidence_base,
                execution_time_ms: 0,
                cached: false,
            },
            Ok(sanctions) => {
                let active = sanctions
                    .iter()
                    .filter(|s| s.end_date.is_none_or(|end| end > chrono::Utc::now()))
                    .count();
                let severity = if active > 0 {
                    Severity::Critical
                } else {
                    Severity::Medium
                };
                let classes: Vec<&str> = sanctions.iter().map(|s| s.class.as_str()).collect();

                CheckerResult {
                    status: Status::Fail,
                    severity: Some(severity),
                    message: format!(
                        "{} sanction record(s) found ({})",
                        sanctions.len(),
                        classes.join(", ")
                    ),
                    details: serde_json::json!({ "sanctions": sanctions, "activeCount": active }),
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
