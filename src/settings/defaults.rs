use super::record::{SettingValue, SettingsRecord, ValueKind};
use crate::provider::ModelProvider;
use std::collections::BTreeMap;

pub const API_KEYS: &str = "api_keys";
pub const AUTH_LOGIN: &str = "auth_login";
pub const AUTH_PASSWORD: &str = "auth_password";
pub const RFC_URL: &str = "rfc_url";
pub const RFC_PASSWORD: &str = "rfc_password";

fn text(value: &str) -> SettingValue {
    SettingValue::Text(value.to_string())
}

fn empty_map() -> SettingValue {
    SettingValue::Map(BTreeMap::new())
}

pub fn default_settings() -> SettingsRecord {
    let openai = ModelProvider::OpenAi.id();
    let entries = [
        ("chat_model_provider", text(openai)),
        ("chat_model_name", text("gpt-4o-mini")),
        ("chat_model_temperature", SettingValue::Float(0.0)),
        ("chat_model_kwargs", empty_map()),
        ("chat_model_ctx_length", SettingValue::Integer(120_000)),
        ("chat_model_ctx_history", SettingValue::Float(0.7)),
        ("chat_model_rl_requests", SettingValue::Integer(0)),
        ("chat_model_rl_input", SettingValue::Integer(0)),
        ("chat_model_rl_output", SettingValue::Integer(0)),
        ("util_model_provider", text(openai)),
        ("util_model_name", text("gpt-4o-mini")),
        ("util_model_temperature", SettingValue::Float(0.0)),
        ("util_model_kwargs", empty_map()),
        ("util_model_ctx_length", SettingValue::Integer(120_000)),
        ("util_model_ctx_input", SettingValue::Float(0.7)),
        ("util_model_rl_requests", SettingValue::Integer(60)),
        ("util_model_rl_input", SettingValue::Integer(0)),
        ("util_model_rl_output", SettingValue::Integer(0)),
        ("embed_model_provider", text(openai)),
        ("embed_model_name", text("text-embedding-3-small")),
        ("embed_model_kwargs", empty_map()),
        ("embed_model_rl_requests", SettingValue::Integer(0)),
        ("embed_model_rl_input", SettingValue::Integer(0)),
        (API_KEYS, empty_map()),
        (AUTH_LOGIN, text("")),
        (AUTH_PASSWORD, text("")),
        ("agent_prompts_subdir", text("default")),
        ("agent_memory_subdir", text("default")),
        ("agent_knowledge_subdir", text("custom")),
        (RFC_URL, text("http://localhost:55080")),
        (RFC_PASSWORD, text("")),
    ];
    SettingsRecord::from_entries(
        entries
            .into_iter()
            .map(|(key, value)| (key.to_string(), value))
            .collect(),
    )
}

/// Kind of `key` in the default record; `None` for unknown keys.
pub fn kind_of(key: &str) -> Option<ValueKind> {
    default_settings().get(key).map(SettingValue::kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let defaults = default_settings();
        assert_eq!(defaults.len(), 31);
        assert_eq!(defaults.text("chat_model_provider"), "OPENAI");
        assert_eq!(defaults.float("chat_model_temperature"), 0.0);
        assert_eq!(defaults.integer("util_model_rl_requests"), 60);
        assert_eq!(defaults.text("agent_knowledge_subdir"), "custom");
        assert_eq!(defaults.text(RFC_URL), "http://localhost:55080");
    }

    #[test]
    fn kind_of_reports_default_types() {
        assert_eq!(kind_of("chat_model_kwargs"), Some(ValueKind::Map));
        assert_eq!(kind_of("chat_model_ctx_history"), Some(ValueKind::Float));
        assert_eq!(kind_of("embed_model_rl_input"), Some(ValueKind::Integer));
        assert_eq!(kind_of("nope"), None);
    }
}
