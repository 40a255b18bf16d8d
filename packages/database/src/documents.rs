//! Exact-match lookups against document-indexed (CPF/CNPJ) tables.

use defarm_database_models::{EmbargoRow, LaborBlacklistRow, SanctionRow};
use moosicbox_json_utils::database::ToValue as _;
use switchy_database::{Database, DatabaseValue};

use crate::DbError;

/// Looks up a canonical document on the labor blacklist (`Lista Suja`).
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub async fn lookup_labor_blacklist(
    db: &dyn Database,
    canonical_document: &str,
) -> Result<Option<LaborBlacklistRow>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT document, year, jurisdiction, workers_affected
             FROM labor_blacklist WHERE document = $1",
            &[DatabaseValue::String(canonical_document.to_string())],
        )
        .await?;

    let Some(row) = rows.first() else {
        return Ok(None);
    };

    Ok(Some(LaborBlacklistRow {
        document: row.to_value("document").map_err(conv)?,
        year: row.to_value("year").map_err(conv)?,
        jurisdiction: row.to_value("jurisdiction").map_err(conv)?,
        workers_affected: row.to_value("workers_affected").map_err(conv)?,
    }))
}

/// Looks up environmental embargoes against a canonical document, newest
/// first, limited to the first `limit` rows.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub async fn lookup_embargoes(
    db: &dyn Database,
    canonical_document: &str,
    limit: u32,
) -> Result<Vec<EmbargoRow>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT document, area_hectares, issued_at, agency,
                    ST_X(location::geometry) as longitude,
                    ST_Y(location::geometry) as latitude
             FROM environmental_embargoes
             WHERE document = $1
             ORDER BY issued_at DESC
             LIMIT $2",
            &[
                DatabaseValue::String(canonical_document.to_string()),
                DatabaseValue::Int64(i64::from(limit)),
            ],
        )
        .await?;

    rows.iter()
        .map(|row| {
            Ok(EmbargoRow {
                document: row.to_value("document").map_err(conv)?,
                area_hectares: row.to_value("area_hectares").map_err(conv)?,
                issued_at: parse_timestamp(row, "issued_at")?,
                agency: row.to_value("agency").map_err(conv)?,
                longitude: row.to_value("longitude").unwrap_or(None),
                latitude: row.to_value("latitude").unwrap_or(None),
            })
        })
        .collect()
}

/// Looks up sanctions-registry entries for a canonical document.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub async fn lookup_sanctions(
    db: &dyn Database,
    canonical_document: &str,
) -> Result<Vec<SanctionRow>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT document, class, start_date, end_date, sanctioning_organ
             FROM sanctions_registry WHERE document = $1
             ORDER BY start_date DESC",
            &[DatabaseValue::String(canonical_document.to_string())],
        )
        .await?;

    rows.iter()
        .map(|row| {
            Ok(SanctionRow {
                document: row.to_value("document").map_err(conv)?,
                class: row.to_value("class").map_err(conv)?,
                start_date: parse_timestamp(row, "start_date")?,
                end_date: parse_timestamp_opt(row, "end_date")?,
                sanctioning_organ: row.to_value("sanctioning_organ").map_err(conv)?,
            })
        })
        .collect()
}

fn conv(e: impl std::fmt::Display) -> DbError {
    DbError::Conversion {
        message: e.to_string(),
    }
}

fn parse_timestamp(
    row: &switchy_database::Row,
    column: &str,
) -> Result<chrono::DateTime<chrono::Utc>, DbError> {
    let naive: chrono::NaiveDateTime = row.to_value(column).map_err(conv)?;
    Ok(chrono::DateTime::<chrono::Utc>::from_naive_utc_and_offset(
        naive,
        chrono::Utc,
    ))
}

fn parse_timestamp_opt(
    row: &switchy_database::Row,
    column: &str,
) -> Result<Option<chrono::DateTime<chrono::Utc>>, DbError> {
    let naive: Option<chrono::NaiveDateTime> = row.to_value(column).unwrap_or(None);
    Ok(naive.map(|n| chrono::DateTime::<chrono::Utc>::from_naive_utc_and_offset(n, chrono::Utc)))
}
