//! Address normalization for Brazilian geocoding requests.
//!
//! Free-text addresses arrive in many shapes — missing the country suffix,
//! using state abbreviations, extra whitespace. This module canonicalizes
//! them into a form that both maximizes geocoder hit rate and is stable
//! enough to use as a cache key.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

/// Collapses runs of whitespace to a single space.
static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Brazilian state abbreviations mapped to their full names, used to expand
/// `"SP"` to `"São Paulo"` etc. for better geocoder hit rates.
static STATE_NAMES: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        ("AC", "Acre"),
        ("AL", "Alagoas"),
        ("AP", "Amapá"),
        ("AM", "Amazonas"),
        ("BA", "Bahia"),
        ("CE", "Ceará"),
        ("DF", "Distrito Federal"),
        ("ES", "Espírito Santo"),
        ("GO", "Goiás"),
        ("MA", "Maranhão"),
        ("MT", "Mato Grosso"),
        ("MS", "Mato Grosso do Sul"),
        ("MG", "Minas Gerais"),
        ("PA", "Pará"),
        ("PB", "Paraíba"),
        ("PR", "Paraná"),
        ("PE", "Pernambuco"),
        ("PI", "Piauí"),
        ("RJ", "Rio de Janeiro"),
        ("RN", "Rio Grande do Norte"),
        ("RS", "Rio Grande do Sul"),
        ("RO", "Rondônia"),
        ("RR", "Roraima"),
        ("SC", "Santa Catarina"),
        ("SP", "São Paulo"),
        ("SE", "Sergipe"),
        ("TO", "Tocantins"),
    ])
});

const COUNTRY_SUFFIX: &str = "Brazil";

/// Normalizes a raw address for geocoding: trims and collapses whitespace,
/// expands a trailing two-letter state abbreviation to its full name, and
/// appends `", Brazil"` if the country isn't already named.
///
/// The result is also used verbatim as the geocode cache key, so it must be
/// stable for inputs that only differ in case or incidental whitespace.
#[must_use]
pub fn normalize_address(raw: &str) -> String {
    let collapsed = WHITESPACE_RE.replace_all(raw.trim(), " ");
    let expanded = expand_trailing_state(&collapsed);

    if expanded.to_lowercase().contains("brazil") || expanded.to_lowercase().contains("brasil") {
        expanded
    } else {
        format!("{expanded}, {COUNTRY_SUFFIX}")
    }
}

/// Expands a trailing `", XX"` state abbreviation to its full name.
fn expand_trailing_state(addr: &str) -> String {
    let Some((prefix, candidate)) = addr.rsplit_once(',') else {
        return addr.to_string();
    };
    let candidate_trimmed = candidate.trim();
    if candidate_trimmed.len() == 2 {
        if let Some(full) = STATE_NAMES.get(candidate_trimmed.to_uppercase().as_str()) {
            return format!("{prefix}, {full}");
        }
    }
    addr.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_country_when_missing() {
        assert_eq!(
            normalize_address("Altamira, PA"),
            "Altamira, Pará, Brazil"
        );
    }

    #[test]
    fn leaves_brazil_present_alone() {
        assert_eq!(
            normalize_address("Av. Paulista, São Paulo, Brazil"),
            "Av. Paulista, São Paulo, Brazil"
        );
    }

    #[test]
    fn collapses_whitespace() {
        assert_eq!(
            normalize_address("Rua   das  Flores,   Manaus,   AM"),
            "Rua das Flores, Manaus, Amazonas, Brazil"
        );
    }

    #[test]
    fn leaves_unknown_two_letter_suffix_alone() {
        assert_eq!(
            normalize_address("Some Place, ZZ"),
            "Some Place, ZZ, Brazil"
        );
    }

    #[test]
    fn accepts_brasil_spelling() {
        assert_eq!(
            normalize_address("Manaus, Brasil"),
            "Manaus, Brasil"
        );
    }
}
