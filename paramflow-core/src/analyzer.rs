//! Single-pass correlation of parameter observations.

use crate::correlated::{CorrelatedParam, ParamKey};
use crate::traffic::TrafficSource;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Parameter names that mark a value as likely sensitive.
const SENSITIVE_NAME_WORDS: &[&str] = &[
    "token", "session", "password", "passwd", "pwd", "auth", "apikey", "api_key", "key", "secret",
    "csrf", "xsrf", "jwt", "bearer", "sid", "credential",
];

/// Shannon entropy (bits per character) above which a value is treated as
/// machine-generated secret material.
const ENTROPY_THRESHOLD: f64 = 3.5;
const ENTROPY_MIN_LEN: usize = 16;

/// Scans a traffic source and groups observations into correlated
/// parameters. Each call re-scans from scratch; there is no incremental
/// merge across runs.
pub struct Paramalyzer;

impl Paramalyzer {
    /// Single pass over all captured records. Every parameter observation is
    /// appended to the correlated entry matching its `(name, type)` key,
    /// creating the entry on first sight. An empty source yields an empty
    /// map.
    pub fn analyze(source: &dyn TrafficSource) -> BTreeMap<ParamKey, CorrelatedParam> {
        let mut correlated: BTreeMap<ParamKey, CorrelatedParam> = BTreeMap::new();
        let mut observations = 0usize;

        source.for_each_record(&mut |record| {
            for instance in &record.instances {
                observations += 1;
                let key = ParamKey::new(instance.name.clone(), instance.param_type);
                correlated
                    .entry(key.clone())
                    .or_insert_with(|| CorrelatedParam::new(key))
                    .add_instance(instance.clone());
            }
        });

        info!(
            "Correlated {} observations across {} records into {} parameters",
            observations,
            source.record_count(),
            correlated.len()
        );
        correlated
    }

    /// The subset of correlated parameters that look like secret material:
    /// sensitive name, or at least one long high-entropy value.
    pub fn param_secrets(
        correlated: &BTreeMap<ParamKey, CorrelatedParam>,
    ) -> Vec<&CorrelatedParam> {
        let secrets: Vec<&CorrelatedParam> = correlated
            .values()
            .filter(|param| Self::is_secret(param))
            .collect();
        debug!("{} of {} parameters look sensitive", secrets.len(), correlated.len());
        secrets
    }

    fn is_secret(param: &CorrelatedParam) -> bool {
        let name = param.name().to_ascii_lowercase();
        if SENSITIVE_NAME_WORDS.iter().any(|w| name.contains(w)) {
            return true;
        }
        param
            .unique_values()
            .iter()
            .any(|v| v.len() >= ENTROPY_MIN_LEN && shannon_entropy(v) >= ENTROPY_THRESHOLD)
    }
}

/// Shannon entropy in bits per character.
fn shannon_entropy(value: &str) -> f64 {
    if value.is_empty() {
        return 0.0;
    }
    let mut counts = [0usize; 256];
    let bytes = value.as_bytes();
    for &b in bytes {
        counts[b as usize] += 1;
    }
    let len = bytes.len() as f64;
    counts
        .iter()
        .filter(|&&c| c > 0)
        .map(|&c| {
            let p = c as f64 / len;
            -p * p.log2()
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entropy_of_uniform_string_is_zero() {
        assert_eq!(shannon_entropy("aaaaaaaa"), 0.0);
    }

    #[test]
    fn test_entropy_of_random_token_is_high() {
        assert!(shannon_entropy("q8Zx2PvKm9Rt4Wl7Yn3Bd6") > 3.5);
    }

    #[test]
    fn test_entropy_of_empty_is_zero() {
        assert_eq!(shannon_entropy(""), 0.0);
    }
}
