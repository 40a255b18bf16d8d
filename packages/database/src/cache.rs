//! Relational storage for the fingerprinted checker/geocode result cache.
//!
//! This module only knows how to read and write `check_cache` rows; the
//! fingerprinting scheme and singleflight coordination live in
//! `defarm_cache`, which is the only expected caller.

use chrono::{DateTime, Utc};
use defarm_database_models::CacheRow;
use moosicbox_json_utils::database::ToValue as _;
use switchy_database::{Database, DatabaseValue};

use crate::DbError;

/// Looks up a non-expired cache row by fingerprint.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub async fn get(db: &dyn Database, fingerprint: &str) -> Result<Option<CacheRow>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT fingerprint, namespace, canonical_value, result, expires_at, cached_at
             FROM check_cache WHERE fingerprint = $1 AND expires_at > NOW()",
            &[DatabaseValue::String(fingerprint.to_string())],
        )
        .await?;

    let Some(row) = rows.first() else {
        return Ok(None);
    };

    let result_text: String = row.to_value("result").map_err(conv)?;
    let result: serde_json::Value = serde_json::from_str(&result_text).map_err(conv)?;

    Ok(Some(CacheRow {
        fingerprint: row.to_value("fingerprint").map_err(conv)?,
        namespace: row.to_value("namespace").map_err(conv)?,
        canonical_value: row.to_value("canonical_value").map_err(conv)?,
        result,
        expires_at: timestamp(row, "expires_at")?,
        cached_at: timestamp(row, "cached_at")?,
    }))
}

/// Writes (or overwrites) a cache entry.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub async fn put(
    db: &dyn Database,
    fingerprint: &str,
    namespace: &str,
    canonical_value: &str,
    result: &serde_json::Value,
    ttl_seconds: i64,
) -> Result<(), DbError> {
    db.exec_raw_params(
        "INSERT INTO check_cache (fingerprint, namespace, canonical_value, result, expires_at, cached_at)
         VALUES ($1, $2, $3, $4, NOW() + ($5 || ' seconds')::interval, NOW())
         ON CONFLICT (fingerprint) DO UPDATE SET
             result = EXCLUDED.result,
             expires_at = EXCLUDED.expires_at,
             cached_at = EXCLUDED.cached_at",
        &[
            DatabaseValue::String(fingerprint.to_string()),
            DatabaseValue::String(namespace.to_string()),
            DatabaseValue::String(canonical_value.to_string()),
            DatabaseValue::String(result.to_string()),
            DatabaseValue::Int64(ttl_seconds),
        ],
    )
    .await?;

    Ok(())
}

fn conv(e: impl std::fmt::Display) -> DbError {
    DbError::Conversion {
        message: e.to_string(),
    }
}

fn timestamp(row: &switchy_database::Row, column: &str) -> Result<DateTime<Utc>, DbError> {
    let naive: chrono::NaiveDateTime = row.to_value(column).map_err(conv)?;
    Ok(DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc))
}
