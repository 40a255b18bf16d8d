#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! HTTP request/response envelopes, the closed `ApiError` taxonomy, and
//! health/freshness DTOs for the defarm compliance server.

pub mod freshness;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use chrono::{DateTime, Utc};
use defarm_checker_models::SourceResult;
use defarm_input_models::{NormalizedInput, RawInput};
use defarm_verdict::{Summary, Verdict};
use serde::{Deserialize, Serialize};

/// Body of `POST /check`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckRequestBody {
    /// The subject to check.
    pub input: RawInput,
    /// Optional execution options.
    #[serde(default)]
    pub options: CheckOptionsBody,
}

/// `options` field of [`CheckRequestBody`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckOptionsBody {
    /// Restrict execution to these checker names, when present.
    pub sources: Option<Vec<String>>,
}

/// Response metadata accompanying every `CheckResponse`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMetadata {
    /// Total processing time, in milliseconds.
    pub processing_time_ms: u64,
    /// Fraction of applicable results served from cache, in `[0, 1]`.
    pub cache_hit_rate: f64,
    /// Server's reported API version (`API_VERSION` env var).
    pub api_version: String,
}

/// The Response Envelope returned by `POST /check`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResponse {
    /// Server-assigned request identifier.
    pub check_id: String,
    /// The normalized input the checkers ran against.
    pub input: NormalizedInput,
    /// When the response was produced.
    pub timestamp: DateTime<Utc>,
    /// Overall compliance verdict.
    pub verdict: Verdict,
    /// Aggregate score, 0-100.
    pub score: u8,
    /// Per-checker results.
    pub sources: Vec<SourceResult>,
    /// Per-status counts.
    pub summary: Summary,
    /// Processing metadata.
    pub metadata: ResponseMetadata,
}

impl CheckResponse {
    /// Builds a response envelope from an orchestrator outcome.
    #[must_use]
    pub fn new(
        check_id: String,
        input: NormalizedInput,
        verdict: Verdict,
        score: u8,
        sources: Vec<SourceResult>,
        summary: Summary,
        processing_time_ms: u64,
        cache_hit_rate: f64,
        api_version: String,
    ) -> Self {
        Self {
            check_id,
            input,
            timestamp: Utc::now(),
            verdict,
            score,
            sources,
            summary,
            metadata: ResponseMetadata {
                processing_time_ms,
                cache_hit_rate,
                api_version,
            },
        }
    }
}

/// The closed error taxonomy for request-level failures (§7). Checker-local
/// failures never reach this type — they surface as `ERROR` entries inside
/// a 200 response instead.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request body or its `input` failed validation/normalization.
    #[error("{0}")]
    Validation(String),
    /// The API key was missing, unknown, disabled, or mismatched.
    #[error("invalid or missing API key")]
    Unauthorized,
    /// The caller exceeded their per-minute request quota.
    #[error("rate limit exceeded")]
    RateLimited,
    /// The named resource (checker, category, sample) does not exist.
    #[error("not found: {0}")]
    NotFound(String),
    /// Critical infrastructure (database, cache) is unreachable.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "error": self.to_string(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_match_taxonomy() {
        assert_eq!(
            ApiError::Validation("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::RateLimited.status_code(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(ApiError::NotFound("x".into()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::ServiceUnavailable("x".into()).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
