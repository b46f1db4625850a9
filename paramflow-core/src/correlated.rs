use crate::format;
use crate::instance::{ParamInstance, ParamType};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Correlation key: parameters with the same name and type are treated as
/// observations of one logical parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ParamKey {
    pub name: String,
    pub param_type: ParamType,
}

impl ParamKey {
    pub fn new(name: impl Into<String>, param_type: ParamType) -> Self {
        Self {
            name: name.into(),
            param_type,
        }
    }
}

/// All observed instances of one logical parameter, in observation order.
///
/// Statistics are always derived from the instance list at read time. The
/// `stats()` snapshot exists so a consumer rendering several columns for one
/// row computes the aggregates once per read cycle; it holds no state that
/// could diverge from the instances.
#[derive(Debug, Clone)]
pub struct CorrelatedParam {
    key: ParamKey,
    instances: Vec<ParamInstance>,
}

impl CorrelatedParam {
    pub fn new(key: ParamKey) -> Self {
        Self {
            key,
            instances: Vec::new(),
        }
    }

    pub fn key(&self) -> &ParamKey {
        &self.key
    }

    pub fn name(&self) -> &str {
        &self.key.name
    }

    pub fn param_type(&self) -> ParamType {
        self.key.param_type
    }

    pub fn add_instance(&mut self, instance: ParamInstance) {
        self.instances.push(instance);
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn all_instances(&self) -> &[ParamInstance] {
        &self.instances
    }

    /// Instances filtered for counting.
    ///
    /// With `sent_requests_only` set, returns one instance per originating
    /// request: the length is the number of requests the parameter was sent
    /// in. Otherwise deduplicates by raw value: the length is the number of
    /// distinct values observed.
    pub fn instances(&self, sent_requests_only: bool) -> Vec<&ParamInstance> {
        let mut seen_requests = HashSet::new();
        let mut seen_values = HashSet::new();
        let mut out = Vec::new();
        for inst in &self.instances {
            let keep = if sent_requests_only {
                seen_requests.insert(inst.request_id)
            } else {
                seen_values.insert(inst.raw_value.as_str())
            };
            if keep {
                out.push(inst);
            }
        }
        out
    }

    /// Distinct source URLs across all instances.
    pub fn unique_urls(&self) -> HashSet<&str> {
        self.instances
            .iter()
            .map(|i| i.source_url.as_str())
            .collect()
    }

    /// Distinct decoded values, sorted. Origin detection works over this set.
    pub fn unique_values(&self) -> Vec<&str> {
        let set: HashSet<&str> = self
            .instances
            .iter()
            .map(|i| i.decoded_value.as_str())
            .collect();
        let mut values: Vec<&str> = set.into_iter().collect();
        values.sort_unstable();
        values
    }

    pub fn reflected_count(&self) -> usize {
        self.instances.iter().filter(|i| i.reflected).count()
    }

    pub fn decoded_reflected_count(&self) -> usize {
        self.instances.iter().filter(|i| i.reflected_decoded).count()
    }

    /// Coarse classification of the value shape, e.g. "numeric" or "base64".
    ///
    /// Classification runs over the sorted unique value set, so the result
    /// does not depend on insertion order.
    pub fn format_signature(&self) -> &'static str {
        format::classify_values(&self.unique_values())
    }

    /// Deterministic representative for display: the first observation.
    pub fn sample(&self) -> Option<&ParamInstance> {
        self.instances.first()
    }

    /// Earliest request this parameter was observed in. Used as the temporal
    /// ordering key for origin detection.
    pub fn first_seen(&self) -> Option<u64> {
        self.instances.iter().map(|i| i.request_id).min()
    }

    /// Aggregate snapshot, recomputed on every call.
    pub fn stats(&self) -> ParamStats {
        let request_count = self.instances(true).len();
        let reflected = self.reflected_count();
        ParamStats {
            request_count,
            unique_url_count: self.unique_urls().len(),
            unique_value_count: self.instances(false).len(),
            reflected_count: reflected,
            decoded_reflected_count: self.decoded_reflected_count(),
            reflect_percent: if request_count == 0 {
                0
            } else {
                (100 * reflected / request_count).min(100) as u8
            },
            format: self.format_signature(),
        }
    }
}

/// Per-read-cycle statistics snapshot over a `CorrelatedParam`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParamStats {
    pub request_count: usize,
    pub unique_url_count: usize,
    pub unique_value_count: usize,
    pub reflected_count: usize,
    pub decoded_reflected_count: usize,
    /// `100 * reflected_count / request_count`, 0 when no requests.
    pub reflect_percent: u8,
    pub format: &'static str,
}
