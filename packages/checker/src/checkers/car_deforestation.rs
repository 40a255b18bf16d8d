//! CAR × annual-deforestation intersection checker.

use async_trait::async_trait;
use defarm_checker_models::{CheckerDescriptor, CheckerResult, Evidence, Severity, Status};
use defarm_database::spatial;
use defarm_input_models::{InputType, NormalizedInput};

use crate::{CheckContext, Checker};

const INTERSECTION_LIMIT: u32 = 50;
const CRITICAL_RECENT_YEARS: i32 = 2;
const HIGH_RECENT_YEARS: i32 = 5;
const CRITICAL_AREA_HECTARES: f64 = 100.0;
const HIGH_AREA_HECTARES: f64 = 25.0;
const HIGH_POLYGON_COUNT: usize = 5;

const DESCRIPTOR: CheckerDescriptor = CheckerDescriptor {
    name: "car_deforestation_intersection",
    description: "Computes deforested area within a CAR property by polygon intersection against PRODES",
    category: defarm_checker_models::Category::Environmental,
    priority: 9,
    supported_input_types: &[InputType::Car, InputType::Coordinates],
    cache_ttl_seconds: 7 * 24 * 60 * 60,
    timeout_ms: 8_000,
    enabled: true,
};

/// Computes total deforested area inside a CAR property, by intersecting
/// its polygon with annual deforestation polygons.
pub struct CarDeforestationChecker;

#[async_trait]
impl Checker for CarDeforestationChecker {
    fn descriptor(&self) -> &'static CheckerDescriptor {
        &DESCRIPTOR
    }

    async fn execute(&self, input: &NormalizedInput, ctx: &CheckContext) -> CheckerResult {
        let evidence_base = Evidence {
            data_source: "deforestation_annual".to_string(),
            url: None,
            last_update: None,
            raw: None,
        };

        let car_code = match input.input_type {
            InputType::Car => Some(input.canonical_value.clone()),
            InputType::Coordinates => {
                let Some(coordinates) = input.coordinates else {
                    return CheckerResult {
                        status: Status::Error,
                        severity: None,
                        message: "coordinates input missing coordinates".to_string(),
                        details: serde_json::Value::Null,
                        evidence: evidence_base,
                        execution_time_ms: 0,
                        cached: false,
                    };
                };
                match spatial::rural_property_containing(ctx.db.as_ref(), coordinates.lon, coordinates.lat)
                    .await
                {
                    Ok(property) => property.map(|p| p.car_code),
                    Err(err) => {
                        return CheckerResult {
                            status: Status::Error,
                            severity: None,
                            message: err.to_string(),
                            details: serde_json::Value::Null,
                            evidence: evidence_base,
                            execution_time_ms: 0,
                            cached: false,
                        };
                    }
                }
            }
            _ => unreachable!("instrument() filters unsupported input types"),
        };

        let Some(car_code) = car_code else {
            return CheckerResult {
                status: Status::Pass,
                severity: None,
                message: "no registered rural property at this point".to_string(),
                details: serde_json::Value::Null,
                evidence: evidence_base,
                execution_time_ms: 0,
                cached: false,
            };
        };

        match spatial::car_deforestation_intersections(ctx.db.as_ref(), &car_code, INTERSECTION_LIMIT).await
        {
            Ok(intersections) if intersections.is_empty() => CheckerResult {
                status: Status::Pass,
                severity: None,
                message: format!("no deforestation intersects CAR {car_code}"),
                details: serde_json::Value::Null,
                evidence: evidence_base,
                execution_time_ms: 0,
                cached: false,
            },
            Ok(intersections) => {
                let newest_year = intersections.iter().map(|i| i.year).max().unwrap_or(0);
                let total_area: f64 = intersections.iter().map(|i| i.intersected_area_hectares).sum();
                let polygon_count = intersections.len();
                let current_year = chrono::Utc::now().date_naive().format("%Y").to_string().parse::<i32>().unwrap_or(newest_year);

                let severity = if newest_year >= current_year - CRITICAL_RECENT_YEARS
                    || total_area >= CRITICAL_AREA_HECTARES
                {
                    Severity::Critical
                } else if newest_year >= current_year - HIGH_RECENT_YEARS
                    || total_area >= HIGH_AREA_HECTARES
                    || polygon_count >= HIGH_POLYGON_COUNT
                {
                    Severity::High
                } else {
                    Severity::Medium
                };

                CheckerResult {
                    status: Status::Fail,
                    severity: Some(severity),
                    message: format!(
                        "CAR {car_code} intersects {polygon_count} deforestation polygon(s) totalling {total_area:.1} ha, newest in {newest_year}"
                    ),
                    details: serde_json::json!({
                        "carCode": car_code,
                        "intersections": intersections,
                        "totalAreaHectares": total_area,
                        "newestYear": newest_year,
                    }),
                    evidence: evidence_base,
                    execution_time_ms: 0,
                    cached: false,
                }
            }
            Err(err) => CheckerResult {
                status: Status::Error,
                severity: None,
                message: err.to_string(),
                details: serde_json::Value::Null,
                evidence: evidence_base,
                execution_time_ms: 0,
                cached: false,
            },
        }
    }
}
