use serde::Serialize;
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;

/// Raw, not yet normalized settings: whatever a caller, a form merge or the
/// durable file supplied.
pub type Candidate = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Text,
    Integer,
    Float,
    Map,
}

impl ValueKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Map => "map",
        }
    }
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SettingValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Map(BTreeMap<String, String>),
}

impl SettingValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Text(_) => ValueKind::Text,
            Self::Integer(_) => ValueKind::Integer,
            Self::Float(_) => ValueKind::Float,
            Self::Map(_) => ValueKind::Map,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Self::Text(value) => Value::String(value.clone()),
            Self::Integer(value) => Value::Number((*value).into()),
            // Non-finite floats never survive normalization.
            Self::Float(value) => Number::from_f64(*value)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Self::Map(entries) => Value::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                    .collect(),
            ),
        }
    }
}

/// A complete, well-typed settings record. Only normalization builds one, so
/// every required key is present with the type of its default.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SettingsRecord(BTreeMap<String, SettingValue>);

impl SettingsRecord {
    pub(crate) fn from_entries(entries: BTreeMap<String, SettingValue>) -> Self {
        Self(entries)
    }

    pub(crate) fn replace(&mut self, key: &str, value: SettingValue) {
        if let Some(slot) = self.0.get_mut(key) {
            *slot = value;
        }
    }

    pub fn get(&self, key: &str) -> Option<&SettingValue> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SettingValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn text(&self, key: &str) -> &str {
        match self.0.get(key) {
            Some(SettingValue::Text(value)) => value,
            _ => "",
        }
    }

    pub fn integer(&self, key: &str) -> i64 {
        match self.0.get(key) {
            Some(SettingValue::Integer(value)) => *value,
            _ => 0,
        }
    }

    pub fn float(&self, key: &str) -> f64 {
        match self.0.get(key) {
            Some(SettingValue::Float(value)) => *value,
            _ => 0.0,
        }
    }

    pub fn map(&self, key: &str) -> BTreeMap<String, String> {
        match self.0.get(key) {
            Some(SettingValue::Map(entries)) => entries.clone(),
            _ => BTreeMap::new(),
        }
    }

    pub fn to_candidate(&self) -> Candidate {
        self.0.iter().map(|(k, v)| (k.clone(), v.to_json())).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn values_serialize_as_plain_json() {
        let mut entries = BTreeMap::new();
        entries.insert("name".to_string(), SettingValue::Text("gpt".to_string()));
        entries.insert("limit".to_string(), SettingValue::Integer(60));
        entries.insert("temperature".to_string(), SettingValue::Float(0.5));
        entries.insert(
            "kwargs".to_string(),
            SettingValue::Map(BTreeMap::from([("a".to_string(), "b".to_string())])),
        );
        let record = SettingsRecord::from_entries(entries);

        let encoded = serde_json::to_value(&record).expect("encode");
        assert_eq!(
            encoded,
            json!({"kwargs": {"a": "b"}, "limit": 60, "name": "gpt", "temperature": 0.5})
        );
        assert_eq!(Value::Object(record.to_candidate()), encoded);
    }

    #[test]
    fn typed_accessors_tolerate_mismatches() {
        let record = SettingsRecord::from_entries(BTreeMap::from([(
            "name".to_string(),
            SettingValue::Text("x".to_string()),
        )]));
        assert_eq!(record.text("name"), "x");
        assert_eq!(record.integer("name"), 0);
        assert_eq!(record.text("missing"), "");
        assert!(record.map("missing").is_empty());
    }
}
