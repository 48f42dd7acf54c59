use super::catalog::{catalog, CatalogOptions, API_KEY_FIELD_PREFIX, CREDENTIAL_PROVIDERS};
use super::{FieldOption, SettingsForm};
use crate::provider::ProviderRegistry;
use crate::settings::defaults::API_KEYS;
use crate::settings::{decode_kwargs, kind_of, Candidate, SettingsRecord, ValueKind};
use crate::shared::directories::DirectoryEnumerator;
use crate::vault::{SecretVault, KEY_AUTH_LOGIN, KEY_AUTH_PASSWORD, KEY_RFC_PASSWORD};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Placeholder some environments carry for "no key configured".
const UNSET_CREDENTIAL: &str = "None";

/// Turns a record into a form and an edited form back into a candidate.
pub struct FormProjector {
    vault: Arc<SecretVault>,
    providers: Arc<dyn ProviderRegistry>,
    directories: Arc<dyn DirectoryEnumerator>,
}

impl FormProjector {
    pub fn new(
        vault: Arc<SecretVault>,
        providers: Arc<dyn ProviderRegistry>,
        directories: Arc<dyn DirectoryEnumerator>,
    ) -> Self {
        Self {
            vault,
            providers,
            directories,
        }
    }

    pub fn project(&self, record: &SettingsRecord) -> SettingsForm {
        SettingsForm {
            sections: catalog(record, &self.options(record)),
        }
    }

    /// Gathers provider choices, content folders and the effective value of
    /// every secret field.
    pub fn options(&self, record: &SettingsRecord) -> CatalogOptions {
        let api_keys = record.map(API_KEYS);
        let credentials = CREDENTIAL_PROVIDERS
            .iter()
            .map(|(provider, _)| {
                let value = api_keys
                    .get(*provider)
                    .filter(|value| !value.is_empty())
                    .cloned()
                    .or_else(|| self.providers.ambient_credential(provider))
                    .unwrap_or_default();
                (provider.to_string(), visible_credential(value))
            })
            .collect();

        CatalogOptions {
            providers: self
                .providers
                .providers()
                .into_iter()
                .map(|info| FieldOption {
                    value: info.id,
                    label: info.label,
                })
                .collect(),
            prompts_subdirs: self.directories.subdirectories("prompts", None),
            memory_subdirs: self.directories.subdirectories("memory", Some("embeddings")),
            knowledge_subdirs: self.directories.subdirectories("knowledge", Some("default")),
            credentials,
            auth_login: self.vault_text(KEY_AUTH_LOGIN),
            auth_password: self.vault_text(KEY_AUTH_PASSWORD),
            rfc_password: self.vault_text(KEY_RFC_PASSWORD),
        }
    }

    pub fn merge(&self, payload: &SettingsForm, previous: &SettingsRecord) -> Candidate {
        merge_form(payload, previous)
    }

    /// Authentication and remote-call secrets are always shown as the vault
    /// holds them.
    fn vault_text(&self, key: &str) -> String {
        self.vault.get(key).unwrap_or_default()
    }
}

fn visible_credential(value: String) -> String {
    if value == UNSET_CREDENTIAL {
        String::new()
    } else {
        value
    }
}

/// Applies the fields of an edited form on top of `previous`. Field ids that
/// name no setting are ignored; the result still needs normalizing.
pub fn merge_form(payload: &SettingsForm, previous: &SettingsRecord) -> Candidate {
    let mut candidate = previous.to_candidate();
    for field in payload.fields() {
        if let Some(provider) = field.id.strip_prefix(API_KEY_FIELD_PREFIX) {
            merge_credential(&mut candidate, provider, &field.value);
            continue;
        }
        match kind_of(&field.id) {
            Some(ValueKind::Map) => {
                let value = match &field.value {
                    Value::String(text) => kwargs_object(text),
                    other => other.clone(),
                };
                candidate.insert(field.id.clone(), value);
            }
            Some(_) => {
                candidate.insert(field.id.clone(), field.value.clone());
            }
            None => {}
        }
    }
    candidate
}

fn merge_credential(candidate: &mut Candidate, provider: &str, value: &Value) {
    let provider = provider.trim().to_ascii_lowercase();
    let value = match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    };

    let slot = candidate
        .entry(API_KEYS)
        .or_insert_with(|| Value::Object(Map::new()));
    if !slot.is_object() {
        *slot = Value::Object(Map::new());
    }
    let Value::Object(keys) = slot else {
        return;
    };
    // A blank field for a provider the record never had is not an edit.
    if value.is_empty() && !keys.contains_key(&provider) {
        return;
    }
    keys.insert(provider, Value::String(value));
}

fn kwargs_object(text: &str) -> Value {
    Value::Object(
        decode_kwargs(text)
            .into_iter()
            .map(|(key, value)| (key, Value::String(value)))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ProviderInfo;
    use crate::settings::{default_settings, normalize};
    use serde_json::json;
    use std::collections::BTreeMap;
    use tempfile::tempdir;

    struct FixedProviders {
        ambient: BTreeMap<String, String>,
    }

    impl ProviderRegistry for FixedProviders {
        fn providers(&self) -> Vec<ProviderInfo> {
            vec![ProviderInfo {
                id: "OPENAI".to_string(),
                label: "OpenAI".to_string(),
            }]
        }

        fn ambient_credential(&self, provider: &str) -> Option<String> {
            self.ambient.get(provider).cloned()
        }
    }

    struct FixedDirectories;

    impl DirectoryEnumerator for FixedDirectories {
        fn subdirectories(&self, folder: &str, exclude: Option<&str>) -> Vec<String> {
            let all: &[&str] = match folder {
                "memory" => &["default", "embeddings"],
                "knowledge" => &["custom", "default"],
                _ => &["default"],
            };
            all.iter()
                .filter(|name| Some(**name) != exclude)
                .map(|name| name.to_string())
                .collect()
        }
    }

    fn projector(dir: &std::path::Path, ambient: &[(&str, &str)]) -> FormProjector {
        let vault = Arc::new(SecretVault::with_dotenv(dir.join(".env")).expect("vault"));
        let providers = FixedProviders {
            ambient: ambient
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        };
        FormProjector::new(vault, Arc::new(providers), Arc::new(FixedDirectories))
    }

    fn set_field(form: &mut SettingsForm, id: &str, value: Value) {
        for section in &mut form.sections {
            for field in &mut section.fields {
                if field.id == id {
                    field.value = value.clone();
                }
            }
        }
    }

    #[test]
    fn unedited_form_merges_back_to_the_same_record() {
        let dir = tempdir().expect("tempdir");
        let projector = projector(dir.path(), &[]);
        let raw = json!({
            "chat_model_kwargs": {"top_p": "0.9", "stop": "a b"},
            "chat_model_temperature": 0.25,
            "api_keys": {"openai": "sk-1"},
            "auth_login": "alice",
        });
        let record = normalize(raw.as_object().expect("object"));
        projector.vault.set("AUTH_LOGIN", "alice").expect("seed vault");

        let form = projector.project(&record);
        assert_eq!(normalize(&projector.merge(&form, &record)), record);
    }

    #[test]
    fn edited_credential_and_kwargs_land_in_the_candidate() {
        let dir = tempdir().expect("tempdir");
        let projector = projector(dir.path(), &[]);
        let previous = default_settings();

        let mut form = projector.project(&previous);
        set_field(&mut form, "api_key_openai", json!("sk-new"));
        set_field(&mut form, "chat_model_kwargs", json!("temperature=0.2\nstop=\"###\""));
        let extra = crate::schema::SettingsField {
            id: "made_up_field".to_string(),
            ..form.sections[0].fields[0].clone()
        };
        form.sections[0].fields.push(extra);

        let candidate = projector.merge(&form, &previous);
        assert_eq!(candidate[API_KEYS], json!({"openai": "sk-new"}));
        assert_eq!(
            candidate["chat_model_kwargs"],
            json!({"temperature": "0.2", "stop": "###"})
        );
        assert!(!candidate.contains_key("made_up_field"));

        let record = normalize(&candidate);
        assert_eq!(record.map("chat_model_kwargs").get("stop").map(String::as_str), Some("###"));
    }

    #[test]
    fn ambient_credentials_fill_blank_keys_and_placeholders_show_empty() {
        let dir = tempdir().expect("tempdir");
        let projector = projector(dir.path(), &[("groq", "gsk-env"), ("google", "None")]);
        let form = projector.project(&default_settings());

        assert_eq!(form.field("api_key_groq").map(|f| &f.value), Some(&json!("gsk-env")));
        assert_eq!(form.field("api_key_google").map(|f| &f.value), Some(&json!("")));
        assert_eq!(form.field("api_key_openai").map(|f| &f.value), Some(&json!("")));
    }

    #[test]
    fn content_folders_exclude_reserved_names() {
        let dir = tempdir().expect("tempdir");
        let form = projector(dir.path(), &[]).project(&default_settings());
        let options = |id: &str| -> Vec<String> {
            form.field(id)
                .and_then(|f| f.options.clone())
                .unwrap_or_default()
                .into_iter()
                .map(|o| o.value)
                .collect()
        };
        assert_eq!(options("agent_memory_subdir"), vec!["default"]);
        assert_eq!(options("agent_knowledge_subdir"), vec!["custom"]);
        assert_eq!(options("agent_prompts_subdir"), vec!["default"]);
    }

    #[test]
    fn secret_text_fields_are_read_from_vault() {
        let dir = tempdir().expect("tempdir");
        let projector = projector(dir.path(), &[]);
        projector.vault.set("AUTH_LOGIN", "bob").expect("seed");
        let raw = json!({"auth_login": "stale"});
        let form = projector.project(&normalize(raw.as_object().expect("object")));
        assert_eq!(form.field("auth_login").map(|f| &f.value), Some(&json!("bob")));
        assert_eq!(form.field("rfc_password").map(|f| &f.value), Some(&json!("")));
    }
}
