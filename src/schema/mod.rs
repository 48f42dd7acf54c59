//! Section/field description of the settings record, as rendered and edited
//! by a presentation layer.

pub mod catalog;
pub mod form;

pub use catalog::{catalog, CatalogOptions, API_KEY_FIELD_PREFIX, CREDENTIAL_PROVIDERS};
pub use form::{merge_form, FormProjector};

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    #[default]
    #[serde(alias = "input")]
    Text,
    Number,
    Select,
    Range,
    Textarea,
    Password,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOption {
    pub value: String,
    pub label: String,
}

impl FieldOption {
    pub fn same(value: &str) -> Self {
        Self {
            value: value.to_string(),
            label: value.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsField {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(rename = "type", default)]
    pub field_type: FieldType,
    #[serde(default)]
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<FieldOption>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsSection {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub fields: Vec<SettingsField>,
}

/// Payload exchanged with the presentation layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettingsForm {
    pub sections: Vec<SettingsSection>,
}

impl SettingsForm {
    pub fn fields(&self) -> impl Iterator<Item = &SettingsField> {
        self.sections.iter().flat_map(|section| section.fields.iter())
    }

    pub fn field(&self, id: &str) -> Option<&SettingsField> {
        self.fields().find(|field| field.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn form_payload_parses_with_sparse_fields() {
        let form: SettingsForm = serde_json::from_value(json!({
            "sections": [
                {"title": "Auth", "fields": [
                    {"id": "auth_login", "type": "input", "value": "alice"},
                    {"id": "chat_model_temperature", "type": "range", "value": 0.3,
                     "min": 0, "max": 1, "step": 0.01}
                ]},
                {"title": "Empty"}
            ]
        }))
        .expect("parse form");

        let login = form.field("auth_login").expect("login field");
        assert_eq!(login.field_type, FieldType::Text);
        assert_eq!(login.value, json!("alice"));
        assert_eq!(form.field("chat_model_temperature").and_then(|f| f.max), Some(1.0));
        assert!(form.sections[1].fields.is_empty());
    }

    #[test]
    fn optional_descriptor_parts_are_omitted_when_absent() {
        let field = SettingsField {
            id: "api_key_openai".to_string(),
            title: "OpenAI API Key".to_string(),
            description: String::new(),
            field_type: FieldType::Password,
            value: json!(""),
            min: None,
            max: None,
            step: None,
            options: None,
        };
        assert_eq!(
            serde_json::to_value(&field).expect("encode"),
            json!({"id": "api_key_openai", "title": "OpenAI API Key", "type": "password", "value": ""})
        );
    }
}
