use super::ConfigError;
use crate::shared::ids::ContextId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Process-level bootstrap configuration. Everything tunable at runtime lives
/// in the settings record instead; this file only says where things are.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub state_root: Option<PathBuf>,
    #[serde(default)]
    pub settings_file: Option<PathBuf>,
    #[serde(default)]
    pub vault_file: Option<PathBuf>,
    #[serde(default)]
    pub content_root: Option<PathBuf>,
    #[serde(default)]
    pub export_vault_to_process_env: bool,
    #[serde(default = "default_contexts")]
    pub contexts: Vec<ContextConfig>,
}

/// An agent context started with the service: a root agent followed by
/// `subordinates` delegated agents.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ContextConfig {
    pub id: ContextId,
    #[serde(default)]
    pub subordinates: usize,
}

pub(crate) const MAX_SUBORDINATES: usize = 32;

fn default_contexts() -> Vec<ContextConfig> {
    match ContextId::parse("main") {
        Ok(id) => vec![ContextConfig {
            id,
            subordinates: 0,
        }],
        Err(_) => Vec::new(),
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            state_root: None,
            settings_file: None,
            vault_file: None,
            content_root: None,
            export_vault_to_process_env: false,
            contexts: default_contexts(),
        }
    }
}

impl ServiceConfig {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for context in &self.contexts {
            if !seen.insert(context.id.as_str()) {
                return Err(ConfigError::Service(format!(
                    "context `{}` is declared more than once",
                    context.id
                )));
            }
            if context.subordinates > MAX_SUBORDINATES {
                return Err(ConfigError::Service(format!(
                    "context `{}` declares {} subordinates; at most {MAX_SUBORDINATES} are allowed",
                    context.id, context.subordinates
                )));
            }
        }
        Ok(())
    }
}
