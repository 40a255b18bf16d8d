//! Spatial (`PostGIS`) queries: containment and distance checks against a
//! query point, and polygon-intersection area for the CAR × deforestation
//! checker.
//!
//! All geometries are stored in EPSG:4326 (`geography` columns), so
//! distance-based queries use `ST_DWithin` in meters directly and
//! containment uses `ST_Contains`/`ST_Intersects` against the point cast to
//! `geography`.

use defarm_database_models::{
    AnnualDeforestationRow, CarDeforestationIntersectionRow, ConservationUnitRow,
    DeforestationAlertRow, EmbargoRow, FireHotspotRow, IndigenousLandRow, RuralPropertyRow,
    ValidatedDeforestationRow, WaterPermitRow,
};
use moosicbox_json_utils::database::ToValue as _;
use switchy_database::{Database, DatabaseValue, Row};

use crate::DbError;

fn point_param(lon: f64, lat: f64) -> (DatabaseValue, DatabaseValue) {
    (DatabaseValue::Real64(lon), DatabaseValue::Real64(lat))
}

fn conv(e: impl std::fmt::Display) -> DbError {
    DbError::Conversion {
        message: e.to_string(),
    }
}

fn timestamp(row: &Row, column: &str) -> Result<chrono::DateTime<chrono::Utc>, DbError> {
    let naive: chrono::NaiveDateTime = row.to_value(column).map_err(conv)?;
    Ok(chrono::DateTime::<chrono::Utc>::from_naive_utc_and_offset(
        naive,
        chrono::Utc,
    ))
}

/// Returns indigenous-land polygons containing the query point.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub async fn indigenous_lands_containing(
    db: &dyn Database,
    lon: f64,
    lat: f64,
) -> Result<Vec<IndigenousLandRow>, DbError> {
    let (plon, plat) = point_param(lon, lat);
    let rows = db
        .query_raw_params(
            "SELECT name, ethnic_group, phase, state FROM indigenous_lands
             WHERE ST_Contains(geom, ST_SetSRID(ST_MakePoint($1, $2), 4326))",
            &[plon, plat],
        )
        .await?;

    rows.iter()
        .map(|row| {
            Ok(IndigenousLandRow {
                name: row.to_value("name").map_err(conv)?,
                ethnic_group: row.to_value("ethnic_group").map_err(conv)?,
                phase: row.to_value("phase").map_err(conv)?,
                state: row.to_value("state").map_err(conv)?,
            })
        })
        .collect()
}

/// Returns conservation-unit polygons containing the query point.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub async fn conservation_units_containing(
    db: &dyn Database,
    lon: f64,
    lat: f64,
) -> Result<Vec<ConservationUnitRow>, DbError> {
    let (plon, plat) = point_param(lon, lat);
    let rows = db
        .query_raw_params(
            "SELECT name, category_group, category, jurisdiction FROM conservation_units
             WHERE ST_Contains(geom, ST_SetSRID(ST_MakePoint($1, $2), 4326))",
            &[plon, plat],
        )
        .await?;

    rows.iter()
        .map(|row| {
            Ok(ConservationUnitRow {
                name: row.to_value("name").map_err(conv)?,
                category_group: row.to_value("category_group").map_err(conv)?,
                category: row.to_value("category").map_err(conv)?,
                jurisdiction: row.to_value("jurisdiction").map_err(conv)?,
            })
        })
        .collect()
}

/// Returns `PRODES` annual-deforestation polygons containing the query
/// point, newest year first.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub async fn annual_deforestation_containing(
    db: &dyn Database,
    lon: f64,
    lat: f64,
) -> Result<Vec<AnnualDeforestationRow>, DbError> {
    let (plon, plat) = point_param(lon, lat);
    let rows = db
        .query_raw_params(
            "SELECT year, area_hectares, municipality FROM deforestation_annual
             WHERE ST_Contains(geom, ST_SetSRID(ST_MakePoint($1, $2), 4326))
             ORDER BY year DESC",
            &[plon, plat],
        )
        .await?;

    rows.iter()
        .map(|row| {
            Ok(AnnualDeforestationRow {
                year: row.to_value("year").map_err(conv)?,
                area_hectares: row.to_value("area_hectares").map_err(conv)?,
                municipality: row.to_value("municipality").map_err(conv)?,
            })
        })
        .collect()
}

/// Returns `DETER` real-time alerts published within `within_days` days
/// containing the query point, newest first.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub async fn deforestation_alerts_containing(
    db: &dyn Database,
    lon: f64,
    lat: f64,
    within_days: i32,
) -> Result<Vec<DeforestationAlertRow>, DbError> {
    let (plon, plat) = point_param(lon, lat);
    let rows = db
        .query_raw_params(
            "SELECT class_name, area_hectares, published_at FROM deforestation_alerts
             WHERE ST_Contains(geom, ST_SetSRID(ST_MakePoint($1, $2), 4326))
               AND published_at >= NOW() - ($3 || ' days')::interval
             ORDER BY published_at DESC",
            &[plon, plat, DatabaseValue::Int32(within_days)],
        )
        .await?;

    rows.iter()
        .map(|row| {
            Ok(DeforestationAlertRow {
                class_name: row.to_value("class_name").map_err(conv)?,
                area_hectares: row.to_value("area_hectares").map_err(conv)?,
                published_at: timestamp(row, "published_at")?,
            })
        })
        .collect()
}

/// Returns validated (`MapBiomas`) deforestation polygons within
/// `buffer_meters` of the query point and published within `within_days`
/// days, nearest first.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub async fn validated_deforestation_nearby(
    db: &dyn Database,
    lon: f64,
    lat: f64,
    buffer_meters: f64,
    within_days: i32,
) -> Result<Vec<ValidatedDeforestationRow>, DbError> {
    let (plon, plat) = point_param(lon, lat);
    let rows = db
        .query_raw_params(
            "SELECT year, area_hectares, detected_at,
                    ST_Distance(geom::geography, ST_SetSRID(ST_MakePoint($1, $2), 4326)::geography) as distance_meters,
                    overlaps_protected_area, overlaps_embargo
             FROM validated_deforestation
             WHERE ST_DWithin(geom::geography, ST_SetSRID(ST_MakePoint($1, $2), 4326)::geography, $3)
               AND detected_at >= NOW() - ($4 || ' days')::interval
             ORDER BY distance_meters ASC",
            &[plon, plat, DatabaseValue::Real64(buffer_meters), DatabaseValue::Int32(within_days)],
        )
        .await?;

    rows.iter()
        .map(|row| {
            Ok(ValidatedDeforestationRow {
                year: row.to_value("year").map_err(conv)?,
                area_hectares: row.to_value("area_hectares").map_err(conv)?,
                detected_at: timestamp(row, "detected_at")?,
                distance_meters: row.to_value("distance_meters").map_err(conv)?,
                overlaps_protected_area: row.to_value("overlaps_protected_area").unwrap_or(false),
                overlaps_embargo: row.to_value("overlaps_embargo").unwrap_or(false),
            })
        })
        .collect()
}

/// Returns fire hotspots within `buffer_meters` of the query point and
/// detected within `within_days` days, nearest first.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub async fn fire_hotspots_nearby(
    db: &dyn Database,
    lon: f64,
    lat: f64,
    buffer_meters: f64,
    within_days: i32,
) -> Result<Vec<FireHotspotRow>, DbError> {
    let (plon, plat) = point_param(lon, lat);
    let rows = db
        .query_raw_params(
            "SELECT detected_at, confidence,
                    ST_Distance(geom::geography, ST_SetSRID(ST_MakePoint($1, $2), 4326)::geography) as distance_meters
             FROM fire_hotspots
             WHERE ST_DWithin(geom::geography, ST_SetSRID(ST_MakePoint($1, $2), 4326)::geography, $3)
               AND detected_at >= NOW() - ($4 || ' days')::interval
             ORDER BY distance_meters ASC",
            &[plon, plat, DatabaseValue::Real64(buffer_meters), DatabaseValue::Int32(within_days)],
        )
        .await?;

    rows.iter()
        .map(|row| {
            Ok(FireHotspotRow {
                detected_at: timestamp(row, "detected_at")?,
                distance_meters: row.to_value("distance_meters").map_err(conv)?,
                confidence: row.to_value("confidence").unwrap_or(None),
            })
        })
        .collect()
}

/// Returns water-use permits within `buffer_meters` of the query point,
/// nearest first.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub async fn water_permits_nearby(
    db: &dyn Database,
    lon: f64,
    lat: f64,
    buffer_meters: f64,
) -> Result<Vec<WaterPermitRow>, DbError> {
    let (plon, plat) = point_param(lon, lat);
    let rows = db
        .query_raw_params(
            "SELECT holder, status, authorized_volume_m3h,
                    ST_Distance(geom::geography, ST_SetSRID(ST_MakePoint($1, $2), 4326)::geography) as distance_meters
             FROM water_permits
             WHERE ST_DWithin(geom::geography, ST_SetSRID(ST_MakePoint($1, $2), 4326)::geography, $3)
             ORDER BY distance_meters ASC",
            &[plon, plat, DatabaseValue::Real64(buffer_meters)],
        )
        .await?;

    rows.iter()
        .map(|row| {
            Ok(WaterPermitRow {
                holder: row.to_value("holder").map_err(conv)?,
                status: row.to_value("status").map_err(conv)?,
                authorized_volume_m3h: row.to_value("authorized_volume_m3h").unwrap_or(None),
                distance_meters: row.to_value("distance_meters").map_err(conv)?,
            })
        })
        .collect()
}

/// Returns environmental embargoes whose recorded location is within
/// `buffer_meters` of the query point, nearest first. Embargoes without a
/// recorded location are excluded (the document-indexed checker already
/// covers those).
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub async fn embargoes_nearby(
    db: &dyn Database,
    lon: f64,
    lat: f64,
    buffer_meters: f64,
) -> Result<Vec<(EmbargoRow, f64)>, DbError> {
    let (plon, plat) = point_param(lon, lat);
    let rows = db
        .query_raw_params(
            "SELECT document, area_hectares, issued_at, agency,
                    ST_X(location::geometry) as longitude,
                    ST_Y(location::geometry) as latitude,
                    ST_Distance(location, ST_SetSRID(ST_MakePoint($1, $2), 4326)::geography) as distance_meters
             FROM environmental_embargoes
             WHERE location IS NOT NULL
               AND ST_DWithin(location, ST_SetSRID(ST_MakePoint($1, $2), 4326)::geography, $3)
             ORDER BY distance_meters ASC",
            &[plon, plat, DatabaseValue::Real64(buffer_meters)],
        )
        .await?;

    rows.iter()
        .map(|row| {
            let row_val = EmbargoRow {
                document: row.to_value("document").map_err(conv)?,
                area_hectares: row.to_value("area_hectares").map_err(conv)?,
                issued_at: timestamp(row, "issued_at")?,
                agency: row.to_value("agency").map_err(conv)?,
                longitude: row.to_value("longitude").unwrap_or(None),
                latitude: row.to_value("latitude").unwrap_or(None),
            };
            let distance_meters: f64 = row.to_value("distance_meters").map_err(conv)?;
            Ok((row_val, distance_meters))
        })
        .collect()
}

/// Looks up a rural-property (CAR) record by its registry code.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub async fn rural_property_by_car_code(
    db: &dyn Database,
    car_code: &str,
) -> Result<Option<RuralPropertyRow>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT car_code, status_raw, area_hectares, state FROM rural_properties
             WHERE car_code = $1",
            &[DatabaseValue::String(car_code.to_string())],
        )
        .await?;

    let Some(row) = rows.first() else {
        return Ok(None);
    };

    Ok(Some(RuralPropertyRow {
        car_code: row.to_value("car_code").map_err(conv)?,
        status_raw: row.to_value("status_raw").map_err(conv)?,
        area_hectares: row.to_value("area_hectares").map_err(conv)?,
        state: row.to_value("state").map_err(conv)?,
    }))
}

/// Finds the rural-property polygon containing the query point, if any.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub async fn rural_property_containing(
    db: &dyn Database,
    lon: f64,
    lat: f64,
) -> Result<Option<RuralPropertyRow>, DbError> {
    let (plon, plat) = point_param(lon, lat);
    let rows = db
        .query_raw_params(
            "SELECT car_code, status_raw, area_hectares, state FROM rural_properties
             WHERE ST_Contains(geom, ST_SetSRID(ST_MakePoint($1, $2), 4326))
             LIMIT 1",
            &[plon, plat],
        )
        .await?;

    let Some(row) = rows.first() else {
        return Ok(None);
    };

    Ok(Some(RuralPropertyRow {
        car_code: row.to_value("car_code").map_err(conv)?,
        status_raw: row.to_value("status_raw").map_err(conv)?,
        area_hectares: row.to_value("area_hectares").map_err(conv)?,
        state: row.to_value("state").map_err(conv)?,
    }))
}

/// Returns the centroid `(lon, lat)` of a CAR property's polygon, used by
/// spatial checkers that accept `CAR` input by resolving a representative
/// point first.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub async fn rural_property_centroid(
    db: &dyn Database,
    car_code: &str,
) -> Result<Option<(f64, f64)>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT ST_X(ST_Centroid(geom)) as longitude, ST_Y(ST_Centroid(geom)) as latitude
             FROM rural_properties WHERE car_code = $1",
            &[DatabaseValue::String(car_code.to_string())],
        )
        .await?;

    let Some(row) = rows.first() else {
        return Ok(None);
    };

    let lon: f64 = row.to_value("longitude").map_err(conv)?;
    let lat: f64 = row.to_value("latitude").map_err(conv)?;
    Ok(Some((lon, lat)))
}

/// Computes the precise intersected area (in hectares) between a CAR
/// property's polygon and each intersecting annual-deforestation polygon,
/// grouped by year, limited to the first `limit` intersections.
///
/// Uses `ST_Intersection(...)::geography` so the area is computed on the
/// sphere rather than in degrees, matching the precision `ST_Area` expects.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub async fn car_deforestation_intersections(
    db: &dyn Database,
    car_code: &str,
    limit: u32,
) -> Result<Vec<CarDeforestationIntersectionRow>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT d.year,
                    ST_Area(ST_Intersection(d.geom, p.geom)::geography) / 10000.0
                        as intersected_area_hectares
             FROM rural_properties p
             JOIN deforestation_annual d ON ST_Intersects(d.geom, p.geom)
             WHERE p.car_code = $1
             ORDER BY d.year DESC
             LIMIT $2",
            &[
                DatabaseValue::String(car_code.to_string()),
                DatabaseValue::Int64(i64::from(limit)),
            ],
        )
        .await?;

    rows.iter()
        .map(|row| {
            Ok(CarDeforestationIntersectionRow {
                year: row.to_value("year").map_err(conv)?,
                intersected_area_hectares: row
                    .to_value("intersected_area_hectares")
                    .map_err(conv)?,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_param_preserves_order() {
        let (lon, lat) = point_param(-52.2, -3.2);
        assert!(matches!(lon, DatabaseValue::Real64(v) if (v - -52.2).abs() < f64::EPSILON));
        assert!(matches!(lat, DatabaseValue::Real64(v) if (v - -3.2).abs() < f64::EPSILON));
    }
}
