//! Labor-blacklist (`Lista Suja`) checker.

use async_trait::async_trait;
use defarm_checker_models::{CheckerDescriptor, CheckerResult, Evidence, Severity, Status};
use defarm_database::documents;
use defarm_input_models::NormalizedInput;

use crate::{CheckContext, Checker};
use super::SUPPORTS_DOCUMENT;

const DESCRIPTOR: CheckerDescriptor = CheckerDescriptor {
    name: "labor_blacklist",
    description: "Checks a document against the Ministry of Labor's blacklist of employers found using conditions analogous to slave labor",
    category: defarm_checker_models::Category::Social,
    priority: 9,
    supported_input_types: SUPPORTS_DOCUMENT,
    cache_ttl_seconds: 30 * 24 * 60 * 60,
    timeout_ms: 3_000,
    enabled: true,
};

/// Exact-match check of a document against the labor blacklist.
pub struct LaborBlacklistChecker;

#[async_trait]
impl Checker for LaborBlacklistChecker {
    fn descriptor(&self) -> &'static CheckerDescriptor {
        &DESCRIPTOR
    }

    async fn execute(&self, input: &NormalizedInput, ctx: &CheckContext) -> CheckerResult {
        let evidence_base = Evidence {
            data_source: "labor_blacklist".to_string(),
            url: None,
            last_update: None,
            raw: None,
        };

        match documents::lookup_labor_blacklist(ctx.db.as_ref(), &input.canonical_value).await {
            Ok(None) => CheckerResult {
                status: Status::Pass,
                severity: None,
                message: "document not found on the labor blacklist".to_string(),
                details: serde_json::Value::Null,
                evidence: evidence_base,
                execution_time_ms: 0,
                cached: false,
            },
            Ok(Some(row)) => CheckerResult {
                status: Status::Fail,
                severity: Some(Severity::Critical),
                message: format!(
                    "listed on the labor blacklist in {} ({}, {} workers affected)",
                    row.year, row.jurisdiction, row.workers_affected
                ),
                details: serde_json::json!({
                    "year": row.year,
                    "jurisdiction": row.jurisdiction,
                    "workersAffected": row.workers_affected,
                }),
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
