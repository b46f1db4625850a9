//! Directional value-transform tests for origin detection.
//!
//! A transform test asks: could `derived` have been produced from `source`
//! by a deterministic operation? Each transform carries a confidence weight;
//! the detector keeps the best passing evidence per ordered pair and
//! compares its weight against the configured threshold.

use data_encoding::{BASE64, BASE64URL, BASE64URL_NOPAD, BASE64_NOPAD, HEXLOWER};
use md5::Md5;
use percent_encoding::{percent_decode_str, utf8_percent_encode, NON_ALPHANUMERIC};
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transform {
    Identity,
    Md5,
    Sha256,
    Base64,
    Base64Decode,
    Hex,
    PercentEncode,
    PercentDecode,
    Contains,
}

impl Transform {
    pub fn label(&self) -> &'static str {
        match self {
            Transform::Identity => "identity",
            Transform::Md5 => "md5",
            Transform::Sha256 => "sha256",
            Transform::Base64 => "base64",
            Transform::Base64Decode => "base64-decode",
            Transform::Hex => "hex",
            Transform::PercentEncode => "url-encode",
            Transform::PercentDecode => "url-decode",
            Transform::Contains => "substring",
        }
    }

    /// Confidence that a passing test really indicates value flow.
    pub fn weight(&self) -> f64 {
        match self {
            Transform::Identity | Transform::Md5 | Transform::Sha256 => 1.0,
            Transform::Base64
            | Transform::Base64Decode
            | Transform::Hex
            | Transform::PercentEncode
            | Transform::PercentDecode => 0.9,
            Transform::Contains => 0.6,
        }
    }
}

/// One passing transform test between two concrete values.
#[derive(Debug, Clone)]
pub struct OriginEvidence {
    pub transform: Transform,
    pub source_value: String,
    pub derived_value: String,
}

impl OriginEvidence {
    pub fn weight(&self) -> f64 {
        self.transform.weight()
    }
}

/// Test whether `derived` could have been produced from `source`.
/// Values shorter than `min_len` are too ambiguous to test at all.
pub fn test_pair(source: &str, derived: &str, min_len: usize) -> Option<Transform> {
    if source.len() < min_len || derived.is_empty() {
        return None;
    }
    if source == derived {
        return Some(Transform::Identity);
    }
    if is_hex_eq(&md5_hex(source), derived) {
        return Some(Transform::Md5);
    }
    if is_hex_eq(&sha256_hex(source), derived) {
        return Some(Transform::Sha256);
    }
    if base64_encodings(source).iter().any(|enc| enc == derived) {
        return Some(Transform::Base64);
    }
    if base64_decode(source).as_deref() == Some(derived) {
        return Some(Transform::Base64Decode);
    }
    if is_hex_eq(&HEXLOWER.encode(source.as_bytes()), derived) {
        return Some(Transform::Hex);
    }
    if utf8_percent_encode(source, NON_ALPHANUMERIC).to_string() == derived {
        return Some(Transform::PercentEncode);
    }
    if derived != source
        && percent_decode_str(source)
            .decode_utf8()
            .map(|d| d == derived)
            .unwrap_or(false)
    {
        return Some(Transform::PercentDecode);
    }
    if derived.contains(source) {
        return Some(Transform::Contains);
    }
    None
}

/// Best passing evidence across two value sets: the highest-weight transform
/// from any source value to any derived value.
pub fn best_evidence(
    source_values: &[&str],
    derived_values: &[&str],
    min_len: usize,
) -> Option<OriginEvidence> {
    let mut best: Option<OriginEvidence> = None;
    for source in source_values {
        for derived in derived_values {
            if let Some(transform) = test_pair(source, derived, min_len) {
                let evidence = OriginEvidence {
                    transform,
                    source_value: (*source).to_string(),
                    derived_value: (*derived).to_string(),
                };
                let better = best
                    .as_ref()
                    .map(|b| evidence.weight() > b.weight())
                    .unwrap_or(true);
                if better {
                    best = Some(evidence);
                }
            }
        }
    }
    best
}

fn md5_hex(value: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(value.as_bytes());
    HEXLOWER.encode(&hasher.finalize())
}

fn sha256_hex(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    HEXLOWER.encode(&hasher.finalize())
}

fn is_hex_eq(expected_lower: &str, candidate: &str) -> bool {
    candidate.len() == expected_lower.len() && candidate.eq_ignore_ascii_case(expected_lower)
}

fn base64_encodings(value: &str) -> [String; 4] {
    let bytes = value.as_bytes();
    [
        BASE64.encode(bytes),
        BASE64_NOPAD.encode(bytes),
        BASE64URL.encode(bytes),
        BASE64URL_NOPAD.encode(bytes),
    ]
}

fn base64_decode(value: &str) -> Option<String> {
    let decoded = BASE64
        .decode(value.as_bytes())
        .or_else(|_| BASE64_NOPAD.decode(value.as_bytes()))
        .or_else(|_| BASE64URL.decode(value.as_bytes()))
        .or_else(|_| BASE64URL_NOPAD.decode(value.as_bytes()))
        .ok()?;
    String::from_utf8(decoded).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity() {
        assert_eq!(test_pair("secret1", "secret1", 6), Some(Transform::Identity));
    }

    #[test]
    fn test_md5() {
        // md5("secret1")
        assert_eq!(
            test_pair("secret1", "694c0b12a42279a27ador", 6),
            None,
            "near-miss digest must not match"
        );
        let digest = md5_hex("secret1");
        assert_eq!(test_pair("secret1", &digest, 6), Some(Transform::Md5));
    }

    #[test]
    fn test_sha256_case_insensitive() {
        let digest = sha256_hex("supersecret").to_uppercase();
        assert_eq!(test_pair("supersecret", &digest, 6), Some(Transform::Sha256));
    }

    #[test]
    fn test_base64_directions() {
        let encoded = BASE64.encode(b"supersecret");
        assert_eq!(
            test_pair("supersecret", &encoded, 6),
            Some(Transform::Base64)
        );
        assert_eq!(
            test_pair(&encoded, "supersecret", 6),
            Some(Transform::Base64Decode)
        );
    }

    #[test]
    fn test_percent_encode() {
        assert_eq!(
            test_pair("a b&c=d", "a%20b%26c%3Dd", 6),
            Some(Transform::PercentEncode)
        );
    }

    #[test]
    fn test_containment_requires_min_len() {
        assert_eq!(
            test_pair("secret1", "secret1-derived", 6),
            Some(Transform::Contains)
        );
        assert_eq!(test_pair("ab", "ab-derived", 6), None);
    }

    #[test]
    fn test_best_evidence_prefers_stronger_transform() {
        let digest = sha256_hex("supersecret");
        let sources = ["supersecret"];
        let derived = [digest.as_str(), "supersecret-suffix"];
        let best = best_evidence(&sources, &derived, 6).unwrap();
        assert_eq!(best.transform, Transform::Sha256);
    }

    #[test]
    fn test_no_reverse_containment() {
        // "secret1-derived" does not flow into "secret1".
        assert_eq!(test_pair("secret1-derived", "secret1", 6), None);
    }
}
