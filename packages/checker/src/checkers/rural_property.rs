//! Rural-property registration (CAR status) checker.

use async_trait::async_trait;
use defarm_checker_models::{CheckerDescriptor, CheckerResult, Evidence, Severity, Status};
use defarm_database::spatial;
use defarm_input_models::{InputType, NormalizedInput};

use crate::{CheckContext, Checker};

/// Canonical CAR registration status, normalized from whatever shape the
/// source data uses (full Portuguese words, 2-letter codes, or accented
/// variants) so the FAIL/PASS decision never depends on raw string
/// matching at the call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CarStatus {
    Ativo,
    Pendente,
    Suspenso,
    Cancelado,
    Analise,
}

impl CarStatus {
    /// `true` for the statuses SPEC §4.4 fails a CAR lookup on.
    const fn is_failing(self) -> bool {
        matches!(self, Self::Cancelado | Self::Suspenso | Self::Pendente)
    }
}

impl std::str::FromStr for CarStatus {
    type Err = ();

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = strip_accents(raw.trim()).to_uppercase();
        match normalized.as_str() {
            "ATIVO" | "AT" | "A" => Ok(Self::Ativo),
            "PENDENTE" | "PE" | "P" => Ok(Self::Pendente),
            "SUSPENSO" | "SU" | "S" => Ok(Self::Suspenso),
            "CANCELADO" | "CA" | "C" => Ok(Self::Cancelado),
            "ANALISE" | "EM ANALISE" | "AN" => Ok(Self::Analise),
            _ => Err(()),
        }
    }
}

/// Strips the Portuguese accented characters `CarStatus` needs to
/// normalize; not a general-purpose Unicode folder.
fn strip_accents(input: &str) -> String {
    input
        .chars()
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ã' | 'Á' | 'À' | 'Â' | 'Ã' => 'a',
            'é' | 'ê' | 'É' | 'Ê' => 'e',
            'í' | 'Í' => 'i',
            'ó' | 'ô' | 'õ' | 'Ó' | 'Ô' | 'Õ' => 'o',
            'ú' | 'Ú' => 'u',
            'ç' | 'Ç' => 'c',
            other => other,
        })
        .collect()
}

const DESCRIPTOR: CheckerDescriptor = CheckerDescriptor {
    name: "rural_property",
    description: "Checks the registration status of a rural property (CAR)",
    category: defarm_checker_models::Category::Certification,
    priority: 6,
    supported_input_types: &[InputType::Car, InputType::Coordinates],
    cache_ttl_seconds: 7 * 24 * 60 * 60,
    timeout_ms: 5_000,
    enabled: true,
};

/// Looks up a CAR property's registration status, either by code directly
/// or by the polygon containing a query point.
pub struct RuralPropertyChecker;

#[async_trait]
impl Checker for RuralPropertyChecker {
    fn descriptor(&self) -> &'static CheckerDescriptor {
        &DESCRIPTOR
    }

    async fn execute(&self, input: &NormalizedInput, ctx: &CheckContext) -> CheckerResult {
        let evidence_base = Evidence {
            data_source: "rural_properties".to_string(),
            url: None,
            last_update: None,
            raw: None,
        };

        let lookup = match input.input_type {
            InputType::Car => {
                spatial::rural_property_by_car_code(ctx.db.as_ref(), &input.canonical_value).await
            }
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
                spatial::rural_property_containing(ctx.db.as_ref(), coordinates.lon, coordinates.lat).await
            }
            _ => unreachable!("instrument() filters unsupported input types"),
        };

        match lookup {
            Ok(None) => CheckerResult {
                status: Status::Pass,
                severity: None,
                message: "no registered rural property found".to_string(),
                details: serde_json::Value::Null,
                evidence: evidence_base,
                execution_time_ms: 0,
                cached: false,
            },
            Ok(Some(property)) => match property.status_raw.parse::<CarStatus>() {
                Ok(status) if status.is_failing() => CheckerResult {
                    status: Status::Fail,
                    severity: Some(Severity::High),
                    message: format!(
                        "CAR {} has registration status {}",
                        property.car_code, property.status_raw
                    ),
                    details: serde_json::json!({ "property": property }),
                    evidence: evidence_base,
                    execution_time_ms: 0,
                    cached: false,
                },
                Ok(_) => CheckerResult {
                    status: Status::Pass,
                    severity: None,
                    message: format!(
                        "CAR {} is registered with status {}",
                        property.car_code, property.status_raw
                    ),
                    details: serde_json::json!({ "property": property }),
                    evidence: evidence_base,
                    execution_time_ms: 0,
                    cached: false,
                },
                Err(()) => CheckerResult {
                    status: Status::Warning,
                    severity: None,
                    message: format!(
                        "CAR {} has unrecognized registration status {:?}",
                        property.car_code, property.status_raw
                    ),
                    details: serde_json::json!({ "property": property }),
                    evidence: evidence_base,
                    execution_time_ms: 0,
                    cached: false,
                },
            },
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
