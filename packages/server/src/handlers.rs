//! HTTP handler functions for the compliance API.

use actix_web::{HttpRequest, HttpResponse, web};
use chrono::Utc;
use defarm_checker_models::Category;
use defarm_orchestrator::{CheckOptions, OrchestratorError};
use defarm_server_models::freshness::{HealthResponse, classify_source};
use defarm_server_models::{ApiError, CheckRequestBody, CheckResponse};

use crate::AppState;

/// `POST /check`
///
/// # Errors
///
/// Returns [`ApiError::Unauthorized`] for a missing `X-API-Key` header,
/// and whatever [`ApiError`] the orchestrator's failure mode maps to.
pub async fn check(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<CheckRequestBody>,
) -> Result<HttpResponse, ApiError> {
    let api_key = req
        .headers()
        .get("X-API-Key")
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError::Unauthorized)?;

    let body = body.into_inner();
    let options = CheckOptions {
        sources: body.options.sources,
    };

    let outcome = state
        .orchestrator
        .execute(api_key, body.input, options)
        .await
        .map_err(|err| match err {
            OrchestratorError::InvalidApiKey => ApiError::Unauthorized,
            OrchestratorError::RateLimited => ApiError::RateLimited,
            OrchestratorError::Validation(validation) => ApiError::Validation(validation.to_string()),
            OrchestratorError::Internal(message) => ApiError::ServiceUnavailable(message),
        })?;

    let response = CheckResponse::new(
        outcome.check_id,
        outcome.input,
        outcome.synthesis.verdict,
        outcome.synthesis.score,
        outcome.sources,
        outcome.synthesis.summary,
        outcome.processing_time_ms,
        outcome.synthesis.cache_hit_rate,
        state.api_version.clone(),
    );

    Ok(HttpResponse::Ok().json(response))
}

/// `GET /sources`
///
/// Lists every registered checker's public descriptor fields.
pub async fn sources(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(descriptor_list(&state, None))
}

/// `GET /sources/{category}`
///
/// # Errors
///
/// Returns [`ApiError::Validation`] if `category` is not one of
/// `environmental`/`social`/`legal`/`certification`.
pub async fn sources_by_category(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let category: Category = path
        .parse()
        .map_err(|_| ApiError::Validation(format!("unknown category: {}", path.as_str())))?;

    Ok(HttpResponse::Ok().json(descriptor_list(&state, Some(category))))
}

fn descriptor_list(state: &AppState, category: Option<Category>) -> Vec<serde_json::Value> {
    state
        .registry
        .all()
        .iter()
        .map(|checker| checker.descriptor())
        .filter(|descriptor| category.is_none_or(|c| descriptor.category == c))
        .map(|descriptor| {
            serde_json::json!({
                "name": descriptor.name,
                "description": descriptor.description,
                "category": descriptor.category,
                "priority": descriptor.priority,
                "enabled": descriptor.enabled,
            })
        })
        .collect()
}

/// `GET /samples/{checkerName}`
///
/// # Errors
///
/// Returns [`ApiError::NotFound`] if no sample fixture is embedded for
/// that checker name.
pub async fn sample(state: web::Data<AppState>, path: web::Path<String>) -> Result<HttpResponse, ApiError> {
    let checker_name = path.into_inner();
    let contents = state
        .samples
        .get(&checker_name)
        .ok_or_else(|| ApiError::NotFound(format!("no sample for checker {checker_name:?}")))?;

    let value: toml::Value = toml::from_str(contents)
        .map_err(|err| ApiError::ServiceUnavailable(format!("malformed embedded sample: {err}")))?;

    Ok(HttpResponse::Ok().json(value))
}

/// `GET /health`
pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    let database_reachable = state.db.query_raw_params("SELECT 1", &[]).await.is_ok();

    let sources = if database_reachable {
        match defarm_database::freshness::list_sources(state.db.as_ref()).await {
            Ok(rows) => {
                let now = Utc::now();
                rows.iter().map(|row| classify_source(row, now)).collect()
            }
            Err(err) => {
                log::warn!("health check failed to read data source freshness: {err}");
                Vec::new()
            }
        }
    } else {
        Vec::new()
    };

    let response = HealthResponse::new(database_reachable, sources);
    let status = if response.database_reachable {
        actix_web::http::StatusCode::OK
    } else {
        actix_web::http::StatusCode::SERVICE_UNAVAILABLE
    };

    HttpResponse::build(status).json(response)
}
