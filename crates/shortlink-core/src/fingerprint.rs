use sha2::{Digest, Sha256};
use std::fmt::Display;

/// Length of a rendered fingerprint: SHA-256 as lowercase hex.
pub const FINGERPRINT_LEN: usize = 64;

/// Deterministic digest of a URL, used as the dedup lookup key.
///
/// Never exposed to clients; it only ever appears inside store keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Computes the fingerprint of `url`.
pub fn fingerprint(url: &str) -> Fingerprint {
    let digest = Sha256::digest(url.as_bytes());
    Fingerprint(hex::encode(digest))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_deterministic() {
        assert_eq!(
            fingerprint("https://example.com"),
            fingerprint("https://example.com")
        );
    }

    #[test]
    fn has_fixed_length_hex_output() {
        let long = "x".repeat(10_000);
        for url in ["", "https://example.com", long.as_str()] {
            let fp = fingerprint(url);
            assert_eq!(fp.as_str().len(), FINGERPRINT_LEN);
            assert!(fp
                .as_str()
                .chars()
                .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        }
    }

    #[test]
    fn distinct_urls_differ() {
        assert_ne!(
            fingerprint("https://example.com"),
            fingerprint("https://example.com/")
        );
        assert_ne!(
            fingerprint("https://example.com"),
            fingerprint("http://example.com")
        );
    }

    #[test]
    fn matches_known_sha256() {
        assert_eq!(
            fingerprint("").as_str(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
