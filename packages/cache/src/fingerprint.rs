//! Deterministic cache-key fingerprinting.

use sha2::{Digest, Sha256};

/// Computes the SHA-256 hex digest of `"{namespace}:{key}:{subkey}"`.
///
/// `subkey` is typically empty for single-valued caches (e.g. the geocoder)
/// and the checker name for the per-checker result cache, where `key` is
/// the normalized input's canonical value.
#[must_use]
pub fn fingerprint(namespace: &str, key: &str, subkey: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(namespace.as_bytes());
    hasher.update(b":");
    hasher.update(key.as_bytes());
    hasher.update(b":");
    hasher.update(subkey.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::fingerprint;

    #[test]
    fn is_deterministic() {
        let a = fingerprint("labor_blacklist", "12345678901", "");
        let b = fingerprint("labor_blacklist", "12345678901", "");
        assert_eq!(a, b);
    }

    #[test]
    fn differs_by_namespace() {
        let a = fingerprint("labor_blacklist", "12345678901", "");
        let b = fingerprint("sanctions", "12345678901", "");
        assert_ne!(a, b);
    }

    #[test]
    fn is_a_64_char_hex_digest() {
        let f = fingerprint("geocode", "rua x, 123", "");
        assert_eq!(f.len(), 64);
        assert!(f.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
