#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Ties the normalizer, checker registry, cache layer, and verdict engine
//! into the single `execute(request) -> Response` operation the server
//! exposes over HTTP.

pub mod auth;
pub mod ratelimit;

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use defarm_checker::{CheckContext, Checker, CheckerRegistry, instrument};
use defarm_checker_models::{SourceResult, Status};
use defarm_database_models::{ApiKeyRow, AuditRow};
use defarm_geocoder::Geocoder;
use defarm_input_models::{NormalizedInput, RawInput, ValidationError};
use defarm_verdict::Synthesis;
use ratelimit::RateLimiter;
use switchy_database::Database;

/// Options accompanying a check request.
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// Restrict execution to these checker names, when present. Checkers
    /// not in this set are simply not run (not reported as
    /// `NOT_APPLICABLE`).
    pub sources: Option<Vec<String>>,
}

/// The fully-assembled outcome of one `/check` request.
#[derive(Debug, Clone)]
pub struct CheckOutcome {
    /// Server-assigned request identifier.
    pub check_id: String,
    /// The normalized input the checkers ran against.
    pub input: NormalizedInput,
    /// Per-checker results, ordered by descending priority then name.
    pub sources: Vec<SourceResult>,
    /// Score, verdict, summary, and cache-hit rate.
    pub synthesis: Synthesis,
    /// Total wall-clock time for the request, in milliseconds.
    pub processing_time_ms: u64,
}

/// Errors that stop a request before (or instead of) producing a
/// [`CheckOutcome`].
#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    /// The API key was missing, unknown, disabled, or mismatched.
    #[error("invalid API key")]
    InvalidApiKey,
    /// The caller exceeded their per-minute request quota.
    #[error("rate limit exceeded")]
    RateLimited,
    /// The request failed normalization.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
    /// An unexpected infrastructure failure.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Coordinates authentication, rate limiting, checker fan-out, verdict
/// synthesis, and audit persistence for one deployment of the service.
pub struct Orchestrator {
    db: Arc<dyn Database>,
    registry: Arc<CheckerRegistry>,
    geocoder: Arc<Geocoder>,
    singleflight: Arc<defarm_cache::SingleFlight>,
    limiter: RateLimiter,
}

impl Orchestrator {
    /// Builds an orchestrator over the given store, registry, and geocoder.
    #[must_use]
    pub fn new(db: Arc<dyn Database>, registry: Arc<CheckerRegistry>, geocoder: Arc<Geocoder>) -> Self {
        Self {
            db,
            registry,
            geocoder,
            singleflight: Arc::new(defarm_cache::SingleFlight::new()),
            limiter: RateLimiter::new(),
        }
    }

    /// Authenticates `raw_key`, enforces its rate limit, normalizes
    /// `raw_input`, fans out to applicable checkers, synthesizes a verdict,
    /// and persists an audit row (detached, best-effort).
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError`] for auth failures, rate limiting, or
    /// normalization failures. Individual checker failures never surface
    /// here — they appear as `ERROR` entries in `sources[]`.
    pub async fn execute(
        &self,
        raw_key: &str,
        raw_input: RawInput,
        options: CheckOptions,
    ) -> Result<CheckOutcome, OrchestratorError> {
        let started = Instant::now();

        let api_key = auth::authenticate(self.db.as_ref(), raw_key).await?;
        if !self.limiter.check(&api_key.prefix, api_key.rate_limit_per_minute).await {
            return Err(OrchestratorError::RateLimited);
        }

        let normalized = defarm_input::normalize(&raw_input, self.geocoder.as_ref()).await?;

        let mut applicable = self.registry.get_applicable(normalized.input_type);
        if let Some(names) = &options.sources {
            applicable.retain(|c| names.iter().any(|n| n == c.descriptor().name));
        }

        let ctx = CheckContext {
            db: Arc::clone(&self.db),
        };

        let handles: Vec<_> = applicable
            .into_iter()
            .map(|checker| {
                let input = normalized.clone();
                let ctx = CheckContext {
                    db: Arc::clone(&ctx.db),
                };
                let singleflight = Arc::clone(&self.singleflight);
                tokio::spawn(async move { run_one(checker, input, ctx, singleflight).await })
            })
            .collect();

        let mut sources: Vec<SourceResult> = futures::future::join_all(handles)
            .await
            .into_iter()
            .map(|joined| joined.unwrap_or_else(|err| error_source_result(&err.to_string())))
            .collect();

        sources.sort_by(|a, b| b.priority.cmp(&a.priority).then_with(|| a.name.cmp(&b.name)));

        let synthesis = defarm_verdict::synthesize(&sources);
        let processing_time_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        let check_id = uuid::Uuid::new_v4().to_string();

        let outcome = CheckOutcome {
            check_id,
            input: normalized,
            sources,
            synthesis,
            processing_time_ms,
        };

        self.spawn_audit(&raw_input, &outcome, &api_key);

        Ok(outcome)
    }

    fn spawn_audit(&self, raw_input: &RawInput, outcome: &CheckOutcome, api_key: &ApiKeyRow) {
        let db = Arc::clone(&self.db);
        let row = build_audit_row(raw_input, outcome, api_key);
        tokio::spawn(async move {
            if let Err(err) = defarm_database::audit::insert(db.as_ref(), &row).await {
                log::error!("failed to persist audit row {}: {err}", row.check_id);
            }
        });
    }
}

fn build_audit_row(raw_input: &RawInput, outcome: &CheckOutcome, api_key: &ApiKeyRow) -> AuditRow {
    AuditRow {
        check_id: outcome.check_id.clone(),
        raw_input: serde_json::to_value(raw_input).unwrap_or(serde_json::Value::Null),
        normalized_value: outcome.input.canonical_value.clone(),
        verdict: outcome.synthesis.verdict.to_string(),
        score: i16::from(outcome.synthesis.score),
        sources: serde_json::to_value(&outcome.sources).unwrap_or(serde_json::Value::Null),
        summary: serde_json::to_value(outcome.synthesis.summary).unwrap_or(serde_json::Value::Null),
        metadata: serde_json::json!({ "apiKeyPrefix": api_key.prefix }),
        processing_time_ms: i32::try_from(outcome.processing_time_ms).unwrap_or(i32::MAX),
        created_at: Utc::now(),
    }
}

async fn run_one(
    checker: Arc<dyn Checker>,
    input: NormalizedInput,
    ctx: CheckContext,
    singleflight: Arc<defarm_cache::SingleFlight>,
) -> SourceResult {
    let descriptor = checker.descriptor();

    if !checker.applies_to(input.input_type) {
        let result = instrument(checker.as_ref(), &input, &ctx).await;
        return to_source_result(descriptor, result);
    }

    if let Some(cached) = defarm_cache::get(ctx.db.as_ref(), descriptor.name, &input.canonical_value).await {
        return to_source_result(descriptor, cached);
    }

    let fingerprint = defarm_cache::fingerprint::fingerprint(descriptor.name, &input.canonical_value, "");
    let db_for_compute = Arc::clone(&ctx.db);
    let result = singleflight
        .run(&fingerprint, move || async move {
            let ctx = CheckContext { db: db_for_compute };
            instrument(checker.as_ref(), &input, &ctx).await
        })
        .await;

    if matches!(result.status, Status::Pass | Status::Fail | Status::Warning) {
        defarm_cache::put(
            ctx.db.as_ref(),
            descriptor.name,
            &input.canonical_value,
            &result,
            descriptor.cache_ttl_seconds,
        )
        .await;
    }

    to_source_result(descriptor, result)
}

fn to_source_result(
    descriptor: &'static defarm_checker_models::CheckerDescriptor,
    result: defarm_checker_models::CheckerResult,
) -> SourceResult {
    SourceResult {
        name: descriptor.name.to_string(),
        category: descriptor.category,
        priority: descriptor.priority,
        result,
    }
}

fn error_source_result(message: &str) -> SourceResult {
    SourceResult {
        name: "unknown".to_string(),
        category: defarm_checker_models::Category::Legal,
        priority: 0,
        result: defarm_checker_models::CheckerResult {
            status: Status::Error,
            severity: None,
            message: format!("checker task panicked: {message}"),
            details: serde_json::Value::Null,
            evidence: defarm_checker_models::Evidence {
                data_source: "unknown".to_string(),
                url: None,
                last_update: None,
                raw: None,
            },
            execution_time_ms: 0,
            cached: false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_source_result_is_not_applicable_to_scoring() {
        let result = error_source_result("boom");
        assert_eq!(result.result.status, Status::Error);
        assert!(!result.result.is_applicable());
    }
}
