//! Data-source metadata reads for the health/freshness monitor.

use defarm_database_models::DataSourceRow;
use moosicbox_json_utils::database::ToValue as _;
use switchy_database::Database;

use crate::DbError;

/// Returns metadata for every known data source.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub async fn list_sources(db: &dyn Database) -> Result<Vec<DataSourceRow>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT name, last_updated, update_cadence, total_records FROM data_sources
             ORDER BY name ASC",
            &[],
        )
        .await?;

    rows.iter()
        .map(|row| {
            let naive: chrono::NaiveDateTime = row.to_value("last_updated").map_err(conv)?;
            Ok(DataSourceRow {
                name: row.to_value("name").map_err(conv)?,
                last_updated: chrono::DateTime::<chrono::Utc>::from_naive_utc_and_offset(
                    naive,
                    chrono::Utc,
                ),
                update_cadence: row.to_value("update_cadence").map_err(conv)?,
                total_records: row.to_value("total_records").unwrap_or(None),
            })
        })
        .collect()
}

fn conv(e: impl std::fmt::Display) -> DbError {
    DbError::Conversion {
        message: e.to_string(),
    }
}
