//! The 13 compliance checker implementations.

pub mod annual_deforestation;
pub mod car_deforestation;
pub mod conservation_unit;
pub mod deforestation_alert;
pub mod embargo_proximity;
pub mod environmental_embargoes;
pub mod fire_hotspot;
pub mod indigenous_land;
pub mod labor_blacklist;
pub mod rural_property;
pub mod sanctions;
pub mod validated_deforestation;
pub mod water_permit;

use defarm_database::DbError;
use defarm_input_models::{InputType, NormalizedInput};
use switchy_database::Database;

/// Resolves a representative `(lon, lat)` point for checkers that accept
/// both `COORDINATES` and `CAR` input: `COORDINATES` carries its own point,
/// `CAR` resolves to its registered polygon's centroid.
///
/// Returns `Ok(None)` when the input type isn't one of these two, or when a
/// CAR code has no matching property (the caller treats that as `PASS`, not
/// `ERROR`, since an unregistered property simply has no known location).
pub(crate) async fn resolve_point(
    input: &NormalizedInput,
    db: &dyn Database,
) -> Result<Option<(f64, f64)>, DbError> {
    match input.input_type {
        InputType::Coordinates => Ok(input.coordinates.map(|c| (c.lon, c.lat))),
        InputType::Car => defarm_database::spatial::rural_property_centroid(db, &input.canonical_value).await,
        _ => Ok(None),
    }
}

pub(crate) const SUPPORTS_DOCUMENT: &[InputType] = &[InputType::Cpf, InputType::Cnpj];
pub(crate) const SUPPORTS_SPATIAL: &[InputType] = &[InputType::Coordinates, InputType::Car];
