//! Write-only persistence of completed request/response envelopes.

use defarm_database_models::AuditRow;
use switchy_database::{Database, DatabaseValue};

use crate::DbError;

/// Persists a completed request's audit row.
///
/// Best-effort from the caller's perspective: the orchestrator logs and
/// discards any error returned here rather than failing the response.
///
/// # Errors
///
/// Returns [`DbError`] if the insert fails.
pub async fn insert(db: &dyn Database, row: &AuditRow) -> Result<(), DbError> {
    db.exec_raw_params(
        "INSERT INTO audit_requests (
            check_id, raw_input, normalized_value, verdict, score,
            sources, summary, metadata, processing_time_ms, created_at
         ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        &[
            DatabaseValue::String(row.check_id.clone()),
            DatabaseValue::String(row.raw_input.to_string()),
            DatabaseValue::String(row.normalized_value.clone()),
            DatabaseValue::String(row.verdict.clone()),
            DatabaseValue::Int32(i32::from(row.score)),
            DatabaseValue::String(row.sources.to_string()),
            DatabaseValue::String(row.summary.to_string()),
            DatabaseValue::String(row.metadata.to_string()),
            DatabaseValue::Int32(row.processing_time_ms),
            DatabaseValue::DateTime(row.created_at.naive_utc()),
        ],
    )
    .await?;

    Ok(())
}
