use paramflow_core::{CorrelatedParam, ParamKey};
use std::collections::HashSet;
use std::hash::{Hash, Hasher};

/// A correlated parameter participating in the origin-dependency graph.
///
/// `origins` holds arena indices into the detector's vertex vector rather
/// than references to other tracked parameters, so many-origins /
/// many-dependents relationships and cycles never create reference cycles.
/// Identity delegates to the underlying correlation key.
#[derive(Debug, Clone)]
pub struct TrackedParameter {
    param: CorrelatedParam,
    /// Indices of parameters whose value appears to flow into this one.
    /// Written only by the origin detector, read after it completes.
    pub origins: HashSet<usize>,
}

impl TrackedParameter {
    pub fn new(param: CorrelatedParam) -> Self {
        Self {
            param,
            origins: HashSet::new(),
        }
    }

    pub fn param(&self) -> &CorrelatedParam {
        &self.param
    }

    pub fn key(&self) -> &ParamKey {
        self.param.key()
    }

    pub fn name(&self) -> &str {
        self.param.name()
    }

    pub fn type_name(&self) -> &'static str {
        self.param.param_type().label()
    }

    pub fn first_seen(&self) -> Option<u64> {
        self.param.first_seen()
    }
}

impl PartialEq for TrackedParameter {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for TrackedParameter {}

impl Hash for TrackedParameter {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl std::fmt::Display for TrackedParameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name(), self.type_name())
    }
}
