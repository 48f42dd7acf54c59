use super::defaults::{default_settings, API_KEYS};
use super::record::{Candidate, SettingValue, SettingsRecord, ValueKind};
use serde_json::Value;
use std::collections::BTreeMap;

/// Outcome of parsing one candidate value against the kind of its default.
#[derive(Debug, Clone, PartialEq)]
pub enum Coercion {
    Parsed(SettingValue),
    Fallback,
}

/// Keys whose candidate value was replaced by the default, and candidate keys
/// that are not settings at all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizeReport {
    pub fallbacks: Vec<String>,
    pub ignored: Vec<String>,
}

impl NormalizeReport {
    pub fn is_clean(&self) -> bool {
        self.fallbacks.is_empty() && self.ignored.is_empty()
    }
}

pub fn normalize(candidate: &Candidate) -> SettingsRecord {
    normalize_with_report(candidate).0
}

/// Fills missing keys with defaults and parses present ones to the default's
/// kind. Never fails: an unparseable value becomes the default.
pub fn normalize_with_report(candidate: &Candidate) -> (SettingsRecord, NormalizeReport) {
    let defaults = default_settings();
    let mut report = NormalizeReport::default();
    let mut entries = BTreeMap::new();

    for (key, default) in defaults.iter() {
        let value = match candidate.get(key) {
            None => default.clone(),
            Some(raw) => match coerce(default.kind(), raw) {
                Coercion::Parsed(value) => value,
                Coercion::Fallback => {
                    report.fallbacks.push(key.to_string());
                    default.clone()
                }
            },
        };
        let value = if key == API_KEYS {
            lowercase_keys(value)
        } else {
            value
        };
        entries.insert(key.to_string(), value);
    }

    report.ignored = candidate
        .keys()
        .filter(|key| !defaults.contains_key(key))
        .cloned()
        .collect();
    (SettingsRecord::from_entries(entries), report)
}

pub fn coerce(kind: ValueKind, raw: &Value) -> Coercion {
    let parsed = match kind {
        ValueKind::Text => parse_text(raw).map(SettingValue::Text),
        ValueKind::Integer => parse_integer(raw).map(SettingValue::Integer),
        ValueKind::Float => parse_float(raw).map(SettingValue::Float),
        ValueKind::Map => parse_map(raw).map(SettingValue::Map),
    };
    match parsed {
        Some(value) => Coercion::Parsed(value),
        None => Coercion::Fallback,
    }
}

fn parse_text(raw: &Value) -> Option<String> {
    match raw {
        Value::String(value) => Some(value.clone()),
        Value::Number(value) => Some(value.to_string()),
        Value::Bool(value) => Some(value.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn parse_integer(raw: &Value) -> Option<i64> {
    match raw {
        Value::Number(value) => value.as_i64().or_else(|| {
            let float = value.as_f64()?;
            truncate_to_i64(float)
        }),
        Value::String(value) => value.trim().parse::<i64>().ok(),
        _ => None,
    }
}

fn truncate_to_i64(value: f64) -> Option<i64> {
    let truncated = value.trunc();
    if truncated.is_finite() && truncated >= i64::MIN as f64 && truncated < i64::MAX as f64 {
        Some(truncated as i64)
    } else {
        None
    }
}

fn parse_float(raw: &Value) -> Option<f64> {
    let value = match raw {
        Value::Number(value) => value.as_f64()?,
        Value::String(value) => value.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    value.is_finite().then_some(value)
}

fn parse_map(raw: &Value) -> Option<BTreeMap<String, String>> {
    let Value::Object(entries) = raw else {
        return None;
    };
    entries
        .iter()
        .map(|(key, value)| {
            let value = match value {
                Value::String(value) => value.clone(),
                Value::Number(value) => value.to_string(),
                Value::Bool(value) => value.to_string(),
                _ => return None,
            };
            Some((key.clone(), value))
        })
        .collect()
}

fn lowercase_keys(value: SettingValue) -> SettingValue {
    match value {
        SettingValue::Map(entries) => SettingValue::Map(
            entries
                .into_iter()
                .map(|(key, value)| (key.trim().to_ascii_lowercase(), value))
                .collect(),
        ),
        other => other,
    }
}
