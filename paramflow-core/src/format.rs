//! Format signature classification for observed parameter values.
//!
//! Patterns are tested in a fixed precedence order and the first match wins,
//! so a value set never classifies ambiguously. A set classifies as a format
//! only when every non-empty value in it matches.

const FORMAT_EMPTY: &str = "empty";
const FORMAT_NUMERIC: &str = "numeric";
const FORMAT_UUID: &str = "uuid";
const FORMAT_HEX: &str = "hex";
const FORMAT_BASE64: &str = "base64";
const FORMAT_TEXT: &str = "text";
const FORMAT_BINARY: &str = "binary";

/// Classify a set of values. Callers pass the sorted unique value set so the
/// result is independent of observation order.
pub fn classify_values(values: &[&str]) -> &'static str {
    let non_empty: Vec<&str> = values.iter().copied().filter(|v| !v.is_empty()).collect();
    if non_empty.is_empty() {
        return FORMAT_EMPTY;
    }
    if non_empty.iter().all(|v| is_numeric(v)) {
        return FORMAT_NUMERIC;
    }
    if non_empty.iter().all(|v| is_uuid(v)) {
        return FORMAT_UUID;
    }
    if non_empty.iter().all(|v| is_hex(v)) {
        return FORMAT_HEX;
    }
    if non_empty.iter().all(|v| is_base64(v)) {
        return FORMAT_BASE64;
    }
    if non_empty.iter().all(|v| is_printable(v)) {
        return FORMAT_TEXT;
    }
    FORMAT_BINARY
}

fn is_numeric(v: &str) -> bool {
    let digits = v.strip_prefix('-').unwrap_or(v);
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit() || c == '.')
}

fn is_uuid(v: &str) -> bool {
    // 8-4-4-4-12 hex groups
    let groups: Vec<&str> = v.split('-').collect();
    groups.len() == 5
        && [8, 4, 4, 4, 12]
            .iter()
            .zip(&groups)
            .all(|(len, g)| g.len() == *len && g.chars().all(|c| c.is_ascii_hexdigit()))
}

fn is_hex(v: &str) -> bool {
    v.len() >= 8 && v.len() % 2 == 0 && v.chars().all(|c| c.is_ascii_hexdigit())
}

fn is_base64(v: &str) -> bool {
    // Short or alphabet-poor strings are plain words, not encodings.
    if v.len() < 8 {
        return false;
    }
    let trimmed = v.trim_end_matches('=');
    if v.len() % 4 != 0 || v.len() - trimmed.len() > 2 {
        return false;
    }
    let alphabet_ok = trimmed
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '/' || c == '-' || c == '_');
    let has_mixed_case = trimmed.chars().any(|c| c.is_ascii_uppercase())
        && trimmed.chars().any(|c| c.is_ascii_lowercase());
    let has_digit = trimmed.chars().any(|c| c.is_ascii_digit());
    alphabet_ok && (has_mixed_case || has_digit)
}

fn is_printable(v: &str) -> bool {
    v.chars().all(|c| !c.is_control())
}
