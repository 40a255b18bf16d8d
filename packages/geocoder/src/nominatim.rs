//! Nominatim / `OpenStreetMap`-shaped geocoder client.
//!
//! Used as the free primary provider and, with a different base URL and an
//! extra `api_key` query parameter, as the shape of the optional keyed
//! fallback provider. Nominatim's public instance has a strict rate limit:
//! **1 request per second** maximum; the caller ([`crate::Geocoder`]) is
//! responsible for pacing calls, this module issues exactly one request
//! per call.
//!
//! See <https://nominatim.org/release-docs/develop/api/Search/>

use std::time::Duration;

use defarm_input_models::Coordinates;

use crate::GeocodeError;

/// Per-request deadline for a single provider call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// A raw match returned by a provider, before provenance is attached.
pub struct ProviderMatch {
    /// Resolved coordinates.
    pub coordinates: Coordinates,
    /// Display name from the provider response, if present.
    pub display_name: Option<String>,
}

/// Geocodes a free-form query restricted to Brazil.
///
/// `query` may already contain a trailing `&key=value` fragment (used by
/// the keyed fallback provider to append its API key); it is appended to
/// the query string as-is.
///
/// # Errors
///
/// Returns [`GeocodeError`] if the HTTP request or response parsing fails,
/// or [`GeocodeError::RateLimited`] if the provider returns HTTP 429.
pub async fn geocode_freeform(
    client: &reqwest::Client,
    base_url: &str,
    query: &str,
) -> Result<Option<ProviderMatch>, GeocodeError> {
    let resp = client
        .get(base_url)
        .query(&[
            ("q", query),
            ("countrycodes", "br"),
            ("format", "jsonv2"),
            ("limit", "1"),
        ])
        .timeout(REQUEST_TIMEOUT)
        .send()
        .await
        .map_err(|err| if err.is_timeout() { GeocodeError::Timeout } else { err.into() })?;

    if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(GeocodeError::RateLimited);
    }

    let body: serde_json::Value = resp.json().await?;
    parse_response(&body)
}

/// Parses a Nominatim-shaped JSON response (an array of match objects).
fn parse_response(body: &serde_json::Value) -> Result<Option<ProviderMatch>, GeocodeError> {
    let results = body.as_array().ok_or_else(|| GeocodeError::Parse {
        message: "geocoder response is not an array".to_string(),
    })?;

    let Some(first) = results.first() else {
        return Ok(None);
    };

    let lat = first["lat"]
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| GeocodeError::Parse {
            message: "missing lat in geocoder response".to_string(),
        })?;

    let lon = first["lon"]
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| GeocodeError::Parse {
            message: "missing lon in geocoder response".to_string(),
        })?;

    let display_name = first["display_name"].as_str().map(String::from);

    Ok(Some(ProviderMatch {
        coordinates: Coordinates { lat, lon },
        display_name,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_result() {
        let body = serde_json::json!([{
            "lat": "-3.2028",
            "lon": "-52.2067",
            "display_name": "Altamira, Pará, Brazil"
        }]);
        let result = parse_response(&body).unwrap().unwrap();
        assert!((result.coordinates.lat - -3.2028).abs() < 1e-4);
        assert!((result.coordinates.lon - -52.2067).abs() < 1e-4);
        assert_eq!(result.display_name.as_deref(), Some("Altamira, Pará, Brazil"));
    }

    #[test]
    fn parses_empty() {
        let body = serde_json::json!([]);
        assert!(parse_response(&body).unwrap().is_none());
    }

    #[test]
    fn rejects_non_array_body() {
        let body = serde_json::json!({"error": "bad request"});
        assert!(parse_response(&body).is_err());
    }
}
