use serde::{Deserialize, Serialize};

/// Where a parameter was observed inside a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ParamType {
    Url,
    Body,
    Cookie,
    Other,
}

impl ParamType {
    pub fn label(&self) -> &'static str {
        match self {
            ParamType::Url => "URL",
            ParamType::Body => "Body",
            ParamType::Cookie => "Cookie",
            ParamType::Other => "Other",
        }
    }
}

/// A single observed occurrence of a parameter in one captured request.
///
/// Instances are created once per occurrence and never mutated; the
/// `CorrelatedParam` that groups them owns them. `request_id` is assigned in
/// capture order, so it also serves as the temporal ordering key for origin
/// detection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamInstance {
    pub name: String,
    pub param_type: ParamType,
    pub raw_value: String,
    pub decoded_value: String,
    pub request_id: u64,
    pub source_url: String,
    /// Raw value reappears verbatim in the response body.
    pub reflected: bool,
    /// Decoded value reappears in the response body.
    pub reflected_decoded: bool,
}

impl ParamInstance {
    pub fn new(
        name: impl Into<String>,
        param_type: ParamType,
        raw_value: impl Into<String>,
        decoded_value: impl Into<String>,
        request_id: u64,
        source_url: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            param_type,
            raw_value: raw_value.into(),
            decoded_value: decoded_value.into(),
            request_id,
            source_url: source_url.into(),
            reflected: false,
            reflected_decoded: false,
        }
    }

    pub fn with_reflection(mut self, reflected: bool, reflected_decoded: bool) -> Self {
        self.reflected = reflected;
        self.reflected_decoded = reflected_decoded;
        self
    }
}
