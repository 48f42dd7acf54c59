use crate::config::{load_service_config, ConfigError};
use crate::runtime::Service;
use crate::settings::defaults::{API_KEYS, AUTH_PASSWORD, RFC_PASSWORD};
use crate::settings::SettingValue;

pub fn map_config_err(err: ConfigError) -> String {
    err.to_string()
}

/// Opens the service described by `$HOME/.agentflux/config.yaml`.
pub fn open_service() -> Result<Service, String> {
    let config = load_service_config().map_err(map_config_err)?;
    Service::open(&config).map_err(|err| err.to_string())
}

fn mask(value: &str) -> String {
    if value.is_empty() {
        String::new()
    } else {
        "********".to_string()
    }
}

/// Value of `key` as printed by the CLI, with secrets masked.
pub fn display_value(key: &str, value: &SettingValue) -> String {
    match value {
        SettingValue::Text(text) if key == AUTH_PASSWORD || key == RFC_PASSWORD => mask(text),
        SettingValue::Map(entries) if key == API_KEYS => entries
            .iter()
            .map(|(provider, secret)| format!("{provider}:{}", mask(secret)))
            .collect::<Vec<_>>()
            .join(","),
        SettingValue::Text(text) => text.clone(),
        SettingValue::Integer(value) => value.to_string(),
        SettingValue::Float(value) => value.to_string(),
        SettingValue::Map(_) => value.to_json().to_string(),
    }
}
