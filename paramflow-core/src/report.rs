//! Parameter statistics reports.
//!
//! The table mirrors what the analysis UI renders: one row per correlated
//! parameter with the aggregate columns computed from its instances.

use crate::correlated::{CorrelatedParam, ParamKey};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ReportFormat {
    Text,
    Json,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            _ => None,
        }
    }
}

/// One table row, serializable for the JSON format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamRow {
    pub name: String,
    pub param_type: String,
    pub requests: usize,
    pub unique_urls: usize,
    pub unique_values: usize,
    pub format: String,
    pub reflect_percent: u8,
    pub decoded: bool,
    pub example_value: String,
}

pub fn build_rows<'a>(params: impl IntoIterator<Item = &'a CorrelatedParam>) -> Vec<ParamRow> {
    params
        .into_iter()
        .map(|param| {
            let stats = param.stats();
            let example = param
                .sample()
                .map(|s| s.decoded_value.clone())
                .unwrap_or_default();
            ParamRow {
                name: param.name().to_string(),
                param_type: param.param_type().label().to_string(),
                requests: stats.request_count,
                unique_urls: stats.unique_url_count,
                unique_values: stats.unique_value_count,
                format: stats.format.to_string(),
                reflect_percent: stats.reflect_percent,
                decoded: stats.decoded_reflected_count > 0,
                example_value: example,
            }
        })
        .collect()
}

pub fn generate_param_report(
    correlated: &BTreeMap<ParamKey, CorrelatedParam>,
    format: &ReportFormat,
) -> String {
    let rows = build_rows(correlated.values());
    match format {
        ReportFormat::Json => {
            serde_json::to_string_pretty(&rows).unwrap_or_else(|_| "[]".to_string())
        }
        ReportFormat::Text => render_text_table(&rows),
    }
}

fn render_text_table(rows: &[ParamRow]) -> String {
    let mut report = String::new();
    report.push_str(
        "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n",
    );
    report.push_str(&format!("  {} correlated parameters\n\n", rows.len()));
    report.push_str(&format!(
        "{:<20} {:<7} {:>8} {:>11} {:>13} {:<8} {:>9}  {:<8} {}\n",
        "Name", "Type", "Requests", "Unique URLs", "Unique Values", "Format", "Reflect %", "Decoded?", "Example Value"
    ));
    report.push_str(&format!("{}\n", "-".repeat(110)));

    for row in rows {
        let example = truncate(&row.example_value, 32);
        report.push_str(&format!(
            "{:<20} {:<7} {:>8} {:>11} {:>13} {:<8} {:>8}%  {:<8} {}\n",
            truncate(&row.name, 20),
            row.param_type,
            row.requests,
            row.unique_urls,
            row.unique_values,
            row.format,
            row.reflect_percent,
            if row.decoded { "yes" } else { "no" },
            example,
        ));
    }

    report.push_str(
        "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n",
    );
    report
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}
