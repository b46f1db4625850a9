//! Captured-traffic input.
//!
//! The analyzer consumes any `TrafficSource`; the concrete implementation
//! here reads a JSON capture file exported by a proxy: an array of
//! request/response records with the raw URL, body, cookie header and
//! response body.

use crate::error::Result;
use crate::instance::{ParamInstance, ParamType};
use percent_encoding::percent_decode_str;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};
use url::Url;

/// Values shorter than this are too common to count as reflected.
const MIN_REFLECT_LEN: usize = 4;

/// Enumeration interface the analyzer consumes.
pub trait TrafficSource {
    fn record_count(&self) -> usize;
    fn for_each_record(&self, visit: &mut dyn FnMut(&TrafficRecord));
}

/// One captured request/response with its parameters already extracted.
#[derive(Debug, Clone)]
pub struct TrafficRecord {
    pub request_id: u64,
    pub url: String,
    pub instances: Vec<ParamInstance>,
}

/// Raw on-disk shape of one capture entry.
#[derive(Debug, Deserialize)]
struct CapturedRecord {
    #[serde(default = "default_method")]
    method: String,
    url: String,
    #[serde(default)]
    body: Option<String>,
    /// Request `Cookie` header value.
    #[serde(default)]
    cookies: Option<String>,
    #[serde(default)]
    response_body: Option<String>,
}

fn default_method() -> String {
    "GET".to_string()
}

/// A parsed capture file. Request ids are assigned in capture order, which
/// downstream origin detection relies on for temporal ordering.
#[derive(Debug)]
pub struct CapturedTraffic {
    records: Vec<TrafficRecord>,
}

impl CapturedTraffic {
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let raw: Vec<serde_json::Value> = serde_json::from_str(content)?;
        let mut records = Vec::new();
        for (idx, entry) in raw.into_iter().enumerate() {
            let captured: CapturedRecord = match serde_json::from_value(entry) {
                Ok(c) => c,
                Err(e) => {
                    warn!("Skipping malformed capture entry {}: {}", idx, e);
                    continue;
                }
            };
            match parse_record(idx as u64, &captured) {
                Ok(record) => records.push(record),
                Err(e) => {
                    warn!("Skipping capture entry {} ({}): {}", idx, captured.url, e);
                }
            }
        }
        debug!("Loaded {} capture records", records.len());
        Ok(Self { records })
    }
}

impl TrafficSource for CapturedTraffic {
    fn record_count(&self) -> usize {
        self.records.len()
    }

    fn for_each_record(&self, visit: &mut dyn FnMut(&TrafficRecord)) {
        for record in &self.records {
            visit(record);
        }
    }
}

fn parse_record(request_id: u64, captured: &CapturedRecord) -> Result<TrafficRecord> {
    let parsed = Url::parse(&captured.url)
        .map_err(|e| crate::error::AnalysisError::InvalidUrl(format!("{}: {}", captured.url, e)))?;

    // Normalized source URL without query or fragment, so unique-URL counts
    // group by endpoint rather than by exact request.
    let mut source = parsed.clone();
    source.set_query(None);
    source.set_fragment(None);
    let source_url = source.to_string();

    let mut instances = Vec::new();

    if let Some(query) = parsed.query() {
        extract_form_params(
            query,
            ParamType::Url,
            request_id,
            &source_url,
            &mut instances,
        );
    }

    if let Some(body) = captured.body.as_deref() {
        let trimmed = body.trim_start();
        if trimmed.starts_with('{') {
            extract_json_params(trimmed, request_id, &source_url, &mut instances);
        } else if !body.is_empty() && !captured.method.eq_ignore_ascii_case("GET") {
            extract_form_params(body, ParamType::Body, request_id, &source_url, &mut instances);
        }
    }

    if let Some(cookies) = captured.cookies.as_deref() {
        extract_cookie_params(cookies, request_id, &source_url, &mut instances);
    }

    if let Some(response) = captured.response_body.as_deref() {
        for inst in &mut instances {
            inst.reflected =
                inst.raw_value.len() >= MIN_REFLECT_LEN && response.contains(&inst.raw_value);
            inst.reflected_decoded = inst.decoded_value.len() >= MIN_REFLECT_LEN
                && response.contains(&inst.decoded_value);
        }
    }

    Ok(TrafficRecord {
        request_id,
        url: captured.url.clone(),
        instances,
    })
}

fn extract_form_params(
    encoded: &str,
    param_type: ParamType,
    request_id: u64,
    source_url: &str,
    out: &mut Vec<ParamInstance>,
) {
    for pair in encoded.split('&') {
        if pair.is_empty() {
            continue;
        }
        let (name, raw_value) = match pair.split_once('=') {
            Some((n, v)) => (n, v),
            None => (pair, ""),
        };
        let name = form_decode(name);
        if name.is_empty() {
            continue;
        }
        let decoded = form_decode(raw_value);
        out.push(ParamInstance::new(
            name, param_type, raw_value, decoded, request_id, source_url,
        ));
    }
}

fn extract_json_params(
    body: &str,
    request_id: u64,
    source_url: &str,
    out: &mut Vec<ParamInstance>,
) {
    let parsed: serde_json::Value = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(e) => {
            warn!("Unparseable JSON body, skipping body parameters: {}", e);
            return;
        }
    };
    if let Some(object) = parsed.as_object() {
        for (name, value) in object {
            let text = match value {
                serde_json::Value::String(s) => s.clone(),
                serde_json::Value::Number(n) => n.to_string(),
                serde_json::Value::Bool(b) => b.to_string(),
                // Nested structures are out of correlation scope.
                _ => continue,
            };
            out.push(ParamInstance::new(
                name.clone(),
                ParamType::Body,
                text.clone(),
                text,
                request_id,
                source_url,
            ));
        }
    }
}

fn extract_cookie_params(
    header: &str,
    request_id: u64,
    source_url: &str,
    out: &mut Vec<ParamInstance>,
) {
    for pair in header.split(';') {
        let pair = pair.trim();
        if pair.is_empty() {
            continue;
        }
        let (name, raw_value) = match pair.split_once('=') {
            Some((n, v)) => (n.trim(), v.trim()),
            None => (pair, ""),
        };
        if name.is_empty() {
            continue;
        }
        let decoded = percent_decode_str(raw_value)
            .decode_utf8()
            .map(|c| c.into_owned())
            .unwrap_or_else(|_| raw_value.to_string());
        out.push(ParamInstance::new(
            name,
            ParamType::Cookie,
            raw_value,
            decoded,
            request_id,
            source_url,
        ));
    }
}

/// Decode a form-encoded component: `+` is a space, then percent-decode.
fn form_decode(component: &str) -> String {
    let plus_replaced = component.replace('+', " ");
    percent_decode_str(&plus_replaced)
        .decode_utf8()
        .map(|c| c.into_owned())
        .unwrap_or(plus_replaced)
}
