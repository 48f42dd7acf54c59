use super::defaults::{API_KEYS, AUTH_LOGIN, AUTH_PASSWORD, RFC_PASSWORD};
use super::record::{SettingValue, SettingsRecord};
use crate::vault::{
    api_key_env, provider_for_api_key_env, SecretVault, KEY_AUTH_LOGIN, KEY_AUTH_PASSWORD,
    KEY_RFC_PASSWORD,
};
use std::collections::BTreeMap;

const SECRET_TEXT_FIELDS: [(&str, &str); 3] = [
    (AUTH_LOGIN, KEY_AUTH_LOGIN),
    (AUTH_PASSWORD, KEY_AUTH_PASSWORD),
    (RFC_PASSWORD, KEY_RFC_PASSWORD),
];

/// Vault updates carrying every sensitive value of `record`. Empty values are
/// included so the vault drops keys the user cleared, and credentials in
/// `stored` for providers no longer in the record are cleared too.
pub fn sensitive_entries(
    record: &SettingsRecord,
    stored: &BTreeMap<String, String>,
) -> Vec<(String, String)> {
    let mut updates: Vec<(String, String)> = record
        .map(API_KEYS)
        .into_iter()
        .map(|(provider, key)| (api_key_env(&provider), key))
        .collect();
    let removed: Vec<(String, String)> = stored
        .keys()
        .filter(|key| provider_for_api_key_env(key).is_some())
        .filter(|key| updates.iter().all(|(env, _)| env != *key))
        .map(|key| (key.clone(), String::new()))
        .collect();
    updates.extend(removed);
    for (field, vault_key) in SECRET_TEXT_FIELDS {
        updates.push((vault_key.to_string(), record.text(field).to_string()));
    }
    updates
}

/// Copy of `record` with every sensitive field blanked, safe to persist.
pub fn redact(record: &SettingsRecord) -> SettingsRecord {
    let mut redacted = record.clone();
    redacted.replace(API_KEYS, SettingValue::Map(BTreeMap::new()));
    for (field, _) in SECRET_TEXT_FIELDS {
        redacted.replace(field, SettingValue::Text(String::new()));
    }
    redacted
}

/// Fills blank sensitive fields of a freshly loaded record from the vault.
pub fn hydrate(record: &SettingsRecord, vault: &SecretVault) -> SettingsRecord {
    let mut hydrated = record.clone();
    for (field, vault_key) in SECRET_TEXT_FIELDS {
        if !record.text(field).is_empty() {
            continue;
        }
        if let Some(value) = vault.entries().get(vault_key) {
            hydrated.replace(field, SettingValue::Text(value.clone()));
        }
    }

    let mut api_keys = record.map(API_KEYS);
    for (key, value) in vault.entries() {
        if let Some(provider) = provider_for_api_key_env(&key) {
            api_keys.entry(provider).or_insert(value);
        }
    }
    hydrated.replace(API_KEYS, SettingValue::Map(api_keys));
    hydrated
}
