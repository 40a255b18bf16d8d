//! API-key lookup for request authentication.
//!
//! Keys are stored as `(prefix, sha256-hash, permissions, rate limit)`.
//! Issuing new keys (including bcrypt-adjacent hashing policy, if any) is
//! an operator script outside this service; this module only reads.

use defarm_database_models::ApiKeyRow;
use moosicbox_json_utils::database::ToValue as _;
use switchy_database::{Database, DatabaseValue};

use crate::DbError;

/// Looks up an API key record by its non-secret prefix.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub async fn lookup_by_prefix(
    db: &dyn Database,
    prefix: &str,
) -> Result<Option<ApiKeyRow>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT prefix, key_hash, permissions, rate_limit_per_minute, enabled
             FROM api_keys WHERE prefix = $1",
            &[DatabaseValue::String(prefix.to_string())],
        )
        .await?;

    let Some(row) = rows.first() else {
        return Ok(None);
    };

    let permissions_text: String = row.to_value("permissions").map_err(conv)?;
    let permissions: Vec<String> = permissions_text
        .split(',')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    Ok(Some(ApiKeyRow {
        prefix: row.to_value("prefix").map_err(conv)?,
        key_hash: row.to_value("key_hash").map_err(conv)?,
        permissions,
        rate_limit_per_minute: row.to_value("rate_limit_per_minute").map_err(conv)?,
        enabled: row.to_value("enabled").map_err(conv)?,
    }))
}

fn conv(e: impl std::fmt::Display) -> DbError {
    DbError::Conversion {
        message: e.to_string(),
    }
}
