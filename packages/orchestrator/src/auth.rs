//! API-key authentication: prefix lookup plus constant-time-ish hash
//! comparison against the stored SHA-256 digest.

use defarm_database_models::ApiKeyRow;
use sha2::{Digest, Sha256};
use switchy_database::Database;

use crate::OrchestratorError;

/// Length of the non-secret prefix used for the initial row lookup.
const PREFIX_LEN: usize = 8;

/// Authenticates `raw_key` against the `api_keys` table.
///
/// # Errors
///
/// Returns [`OrchestratorError::InvalidApiKey`] if the key is malformed,
/// unknown, disabled, or its hash doesn't match; [`OrchestratorError::Internal`]
/// if the lookup itself fails.
pub async fn authenticate(
    db: &dyn Database,
    raw_key: &str,
) -> Result<ApiKeyRow, OrchestratorError> {
    if raw_key.len() < PREFIX_LEN {
        return Err(OrchestratorError::InvalidApiKey);
    }
    let prefix = &raw_key[..PREFIX_LEN];

    let row = defarm_database::auth::lookup_by_prefix(db, prefix)
        .await
        .map_err(|e| OrchestratorError::Internal(e.to_string()))?
        .ok_or(OrchestratorError::InvalidApiKey)?;

    if !row.enabled {
        return Err(OrchestratorError::InvalidApiKey);
    }

    let mut hasher = Sha256::new();
    hasher.update(raw_key.as_bytes());
    let computed = hex::encode(hasher.finalize());

    if computed != row.key_hash {
        return Err(OrchestratorError::InvalidApiKey);
    }

    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::PREFIX_LEN;

    #[test]
    fn prefix_len_matches_hash_convention() {
        // The prefix must be short enough to be non-secret on its own but
        // long enough to keep per-prefix collisions rare.
        assert_eq!(PREFIX_LEN, 8);
    }
}
