use super::ModelProvider;
use crate::vault::{api_key_env, SecretVault};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderInfo {
    pub id: String,
    pub label: String,
}

pub trait ProviderRegistry: Send + Sync {
    fn providers(&self) -> Vec<ProviderInfo>;

    /// Credential for `provider` already present in the environment, if any.
    fn ambient_credential(&self, provider: &str) -> Option<String>;
}

/// Registry over [`ModelProvider`] whose credentials come from the vault and
/// the process environment (`API_KEY_<PROVIDER>`, then `<PROVIDER>_API_KEY`).
#[derive(Debug, Clone)]
pub struct BuiltinProviderRegistry {
    vault: Arc<SecretVault>,
}

impl BuiltinProviderRegistry {
    pub fn new(vault: Arc<SecretVault>) -> Self {
        Self { vault }
    }
}

impl ProviderRegistry for BuiltinProviderRegistry {
    fn providers(&self) -> Vec<ProviderInfo> {
        ModelProvider::ALL
            .into_iter()
            .map(|provider| ProviderInfo {
                id: provider.id().to_string(),
                label: provider.label().to_string(),
            })
            .collect()
    }

    fn ambient_credential(&self, provider: &str) -> Option<String> {
        let suffixed = format!("{}_API_KEY", provider.trim().to_ascii_uppercase());
        self.vault
            .get(&api_key_env(provider))
            .or_else(|| self.vault.get(&suffixed))
            .filter(|value| !value.is_empty())
    }
}
