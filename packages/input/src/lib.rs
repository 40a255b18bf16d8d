#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Validates and canonicalizes a raw request input into a
//! [`NormalizedInput`], resolving addresses to coordinates along the way.

use defarm_geocoder::{GeocodeError, Geocoder};
use defarm_input_models::{
    Coordinates, GeocodingProvenance, InputType, NormalizedInput, NormalizedMetadata, RawInput,
    ValidationError,
};

/// Normalizes a raw input.
///
/// For `ADDRESS` inputs this geocodes the address and promotes the result
/// to `COORDINATES`, recording provenance in `metadata`. All other input
/// types are validated and canonicalized without any I/O.
///
/// # Errors
///
/// Returns [`ValidationError`] if the value doesn't match the shape its
/// declared type requires, or if geocoding an address fails.
pub async fn normalize(raw: &RawInput, geocoder: &Geocoder) -> Result<NormalizedInput, ValidationError> {
    match raw.input_type {
        InputType::Cpf => normalize_document(raw, 11),
        InputType::Cnpj => normalize_document(raw, 14),
        InputType::Coordinates => normalize_coordinates(raw),
        InputType::Car => normalize_car(raw),
        InputType::Address => normalize_address(raw, geocoder).await,
    }
}

fn normalize_document(raw: &RawInput, expected_digits: usize) -> Result<NormalizedInput, ValidationError> {
    let original = raw
        .value
        .as_str()
        .ok_or_else(|| ValidationError::MalformedValue {
            input_type: raw.input_type,
            message: "expected a string value".to_string(),
        })?
        .to_string();

    let digits: String = original.chars().filter(char::is_ascii_digit).collect();
    if digits.len() != expected_digits {
        return Err(ValidationError::WrongDigitCount {
            input_type: raw.input_type,
            expected: expected_digits,
            actual: digits.len(),
        });
    }

    Ok(NormalizedInput {
        input_type: raw.input_type,
        canonical_value: digits,
        original_value: original,
        coordinates: None,
        metadata: NormalizedMetadata::default(),
    })
}

fn normalize_coordinates(raw: &RawInput) -> Result<NormalizedInput, ValidationError> {
    let lat = raw.value.get("lat").and_then(serde_json::Value::as_f64);
    let lon = raw.value.get("lon").and_then(serde_json::Value::as_f64);
    let (Some(lat), Some(lon)) = (lat, lon) else {
        return Err(ValidationError::MalformedValue {
            input_type: raw.input_type,
            message: "expected an object with numeric lat/lon fields".to_string(),
        });
    };

    let coordinates = Coordinates { lat, lon };
    if !coordinates.in_brazil() {
        return Err(ValidationError::OutOfBounds { lat, lon });
    }

    Ok(NormalizedInput {
        input_type: InputType::Coordinates,
        canonical_value: coordinates.canonical_key(),
        original_value: raw.value.to_string(),
        coordinates: Some(coordinates),
        metadata: NormalizedMetadata::default(),
    })
}

fn normalize_car(raw: &RawInput) -> Result<NormalizedInput, ValidationError> {
    let original = raw
        .value
        .as_str()
        .ok_or_else(|| ValidationError::MalformedValue {
            input_type: raw.input_type,
            message: "expected a string value".to_string(),
        })?
        .to_string();

    let canonical = original.trim().to_uppercase();
    if canonical.is_empty() {
        return Err(ValidationError::MalformedValue {
            input_type: raw.input_type,
            message: "CAR code must not be empty".to_string(),
        });
    }

    Ok(NormalizedInput {
        input_type: InputType::Car,
        canonical_value: canonical,
        original_value: original,
        coordinates: None,
        metadata: NormalizedMetadata::default(),
    })
}

async fn normalize_address(
    raw: &RawInput,
    geocoder: &Geocoder,
) -> Result<NormalizedInput, ValidationError> {
    let original = raw
        .value
        .as_str()
        .ok_or_else(|| ValidationError::MalformedValue {
            input_type: raw.input_type,
            message: "expected a string value".to_string(),
        })?
        .to_string();

    let geocoded = geocoder.geocode(&original).await.map_err(|err| {
        let detail = match err {
            GeocodeError::NotFound(addr) => format!("no match for {addr:?}"),
            other => other.to_string(),
        };
        ValidationError::GeocodingFailed(detail)
    })?;

    Ok(NormalizedInput {
        input_type: InputType::Coordinates,
        canonical_value: geocoded.coordinates.canonical_key(),
        original_value: original.clone(),
        coordinates: Some(geocoded.coordinates),
        metadata: NormalizedMetadata {
            original_type: Some(InputType::Address),
            original_address: Some(original),
            geocoding: Some(GeocodingProvenance {
                display_name: geocoded.display_name,
                source: geocoded.source.as_str().to_string(),
            }),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use defarm_geocoder::GeocoderConfig;

    fn geocoder() -> Geocoder {
        Geocoder::new(GeocoderConfig {
            primary_base_url: "http://127.0.0.1:1/unused".to_string(),
            rate_limit_ms: 1,
            fallback: None,
        })
    }

    #[test]
    fn strips_cpf_punctuation() {
        let raw = RawInput {
            input_type: InputType::Cpf,
            value: serde_json::json!("123.456.789-01"),
        };
        let normalized = normalize_document(&raw, 11).unwrap();
        assert_eq!(normalized.canonical_value, "12345678901");
    }

    #[test]
    fn rejects_wrong_cpf_length() {
        let raw = RawInput {
            input_type: InputType::Cpf,
            value: serde_json::json!("123"),
        };
        assert!(matches!(
            normalize_document(&raw, 11),
            Err(ValidationError::WrongDigitCount { expected: 11, actual: 3, .. })
        ));
    }

    #[test]
    fn strips_cnpj_punctuation() {
        let raw = RawInput {
            input_type: InputType::Cnpj,
            value: serde_json::json!("12.345.678/0001-90"),
        };
        let normalized = normalize_document(&raw, 14).unwrap();
        assert_eq!(normalized.canonical_value, "12345678000190");
    }

    #[test]
    fn accepts_valid_coordinates() {
        let raw = RawInput {
            input_type: InputType::Coordinates,
            value: serde_json::json!({"lat": -10.5, "lon": -62.5}),
        };
        let normalized = normalize_coordinates(&raw).unwrap();
        assert_eq!(normalized.canonical_value, "-10.500000,-62.500000");
    }

    #[test]
    fn rejects_out_of_bounds_coordinates() {
        let raw = RawInput {
            input_type: InputType::Coordinates,
            value: serde_json::json!({"lat": 40.7, "lon": -74.0}),
        };
        assert!(matches!(
            normalize_coordinates(&raw),
            Err(ValidationError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn uppercases_car_code() {
        let raw = RawInput {
            input_type: InputType::Car,
            value: serde_json::json!("mt-5103403-xyz"),
        };
        let normalized = normalize_car(&raw).unwrap();
        assert_eq!(normalized.canonical_value, "MT-5103403-XYZ");
    }

    #[tokio::test]
    async fn dispatches_by_input_type() {
        let raw = RawInput {
            input_type: InputType::Cpf,
            value: serde_json::json!("12345678901"),
        };
        let normalized = normalize(&raw, &geocoder()).await.unwrap();
        assert_eq!(normalized.input_type, InputType::Cpf);
    }
}
