use crate::app::command_support::{display_value, map_config_err, open_service};
use crate::runtime::Service;
use crate::schema::{SettingsField, SettingsForm, SettingsSection, API_KEY_FIELD_PREFIX};
use crate::settings::{coerce, kind_of, Coercion, ValueKind};
use serde_json::Value;
use std::fs;

pub fn cmd_settings(args: &[String]) -> Result<String, String> {
    if args.is_empty() {
        return Err("usage: settings <show|get|set|form|apply> ...".to_string());
    }
    match args[0].as_str() {
        "show" => {
            let service = open_service()?;
            show(&service)
        }
        "get" => {
            let key = args
                .get(1)
                .ok_or_else(|| "usage: settings get <key>".to_string())?;
            let service = open_service()?;
            let record = service.get().map_err(map_config_err)?;
            let value = record
                .get(key)
                .ok_or_else(|| format!("unknown setting `{key}`"))?;
            Ok(display_value(key, value))
        }
        "set" => {
            if args.len() < 3 {
                return Err("usage: settings set <key> <value>".to_string());
            }
            let form = single_field_form(&args[1], &args[2])?;
            let service = open_service()?;
            apply(&service, &form)
        }
        "form" => {
            let service = open_service()?;
            let form = service.project().map_err(map_config_err)?;
            serde_json::to_string_pretty(&form).map_err(|err| err.to_string())
        }
        "apply" => {
            let path = args
                .get(1)
                .ok_or_else(|| "usage: settings apply <file>".to_string())?;
            let raw = fs::read_to_string(path)
                .map_err(|err| format!("failed to read {path}: {err}"))?;
            let form: SettingsForm = serde_json::from_str(&raw)
                .map_err(|err| format!("invalid settings form {path}: {err}"))?;
            let service = open_service()?;
            apply(&service, &form)
        }
        other => Err(format!("unknown settings subcommand `{other}`")),
    }
}

fn show(service: &Service) -> Result<String, String> {
    let record = service.get().map_err(map_config_err)?;
    Ok(record
        .iter()
        .map(|(key, value)| format!("{key}={}", display_value(key, value)))
        .collect::<Vec<_>>()
        .join("\n"))
}

fn apply(service: &Service, form: &SettingsForm) -> Result<String, String> {
    service.apply_form(form).map_err(map_config_err)?;
    Ok(format!(
        "revision={}\nworkers_updated={}",
        service.store().revision(),
        service.broadcaster().last_reach()
    ))
}

/// Form carrying one edited field. Values that would not survive
/// normalization are rejected here instead of silently reverting.
fn single_field_form(key: &str, raw: &str) -> Result<SettingsForm, String> {
    let value = Value::String(raw.to_string());
    if !key.starts_with(API_KEY_FIELD_PREFIX) {
        let kind = kind_of(key).ok_or_else(|| format!("unknown setting `{key}`"))?;
        if kind != ValueKind::Map && matches!(coerce(kind, &value), Coercion::Fallback) {
            return Err(format!("invalid {kind} value for `{key}`: {raw}"));
        }
    }
    Ok(SettingsForm {
        sections: vec![SettingsSection {
            title: String::new(),
            description: String::new(),
            fields: vec![SettingsField {
                id: key.to_string(),
                title: String::new(),
                description: String::new(),
                field_type: Default::default(),
                value,
                min: None,
                max: None,
                step: None,
                options: None,
            }],
        }],
    })
}
