//! Field coercion for loosely typed JSON.

use serde_json::{Map, Value};

/// Converts a JSON value to trimmed text. Blank and null become `None`;
/// arrays are joined with ", ".
pub fn text(value: Option<&Value>) -> Option<String> {
    let s = match value? {
        Value::Null => return None,
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(items) => items
            .iter()
            .filter_map(|v| text(Some(v)))
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(_) => return None,
    };
    (!s.is_empty()).then_some(s)
}

/// First present key among `keys`, coerced to text, or `default`.
pub fn text_or(obj: &Map<String, Value>, keys: &[&str], default: &str) -> String {
    keys.iter()
        .find_map(|k| text(obj.get(*k)))
        .unwrap_or_else(|| default.to_string())
}

/// A list of strings from an array, or from a comma separated string.
pub fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items.iter().filter_map(|v| text(Some(v))).collect(),
        Some(Value::String(s)) => s
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect(),
        _ => Vec::new(),
    }
}

pub fn list_from(obj: &Map<String, Value>, keys: &[&str]) -> Vec<String> {
    keys.iter()
        .map(|k| string_list(obj.get(*k)))
        .find(|list| !list.is_empty())
        .unwrap_or_default()
}

/// A number, or a string that parses as one.
pub fn number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

pub fn char_len(s: &str) -> usize {
    s.chars().count()
}
