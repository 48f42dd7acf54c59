use super::RuntimeError;
use crate::config::{resolve_state_root, ServiceConfig, SETTINGS_FILE_NAME, VAULT_FILE_NAME};
use std::fs;
use std::path::PathBuf;

/// Where the service keeps its durable state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatePaths {
    pub root: PathBuf,
    settings_file: Option<PathBuf>,
    vault_file: Option<PathBuf>,
    content_root: Option<PathBuf>,
}

impl StatePaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            settings_file: None,
            vault_file: None,
            content_root: None,
        }
    }

    /// Applies the per-file overrides of `config` on top of its state root.
    pub fn from_config(config: &ServiceConfig) -> Result<Self, RuntimeError> {
        let root = resolve_state_root(config)?;
        Ok(Self {
            root,
            settings_file: config.settings_file.clone(),
            vault_file: config.vault_file.clone(),
            content_root: config.content_root.clone(),
        })
    }

    pub fn required_directories(&self) -> Vec<PathBuf> {
        vec![
            self.root.join("logs"),
            self.content_root().join("prompts"),
            self.content_root().join("memory"),
            self.content_root().join("knowledge"),
        ]
    }

    pub fn settings_file(&self) -> PathBuf {
        self.settings_file
            .clone()
            .unwrap_or_else(|| self.root.join(SETTINGS_FILE_NAME))
    }

    pub fn vault_file(&self) -> PathBuf {
        self.vault_file
            .clone()
            .unwrap_or_else(|| self.root.join(VAULT_FILE_NAME))
    }

    /// Parent of the `prompts`, `memory` and `knowledge` folders.
    pub fn content_root(&self) -> PathBuf {
        self.content_root.clone().unwrap_or_else(|| self.root.clone())
    }

    pub fn runtime_log_path(&self) -> PathBuf {
        self.root.join("logs/runtime.log")
    }
}

pub fn bootstrap_state_root(paths: &StatePaths) -> Result<(), RuntimeError> {
    for path in paths.required_directories() {
        fs::create_dir_all(&path).map_err(|source| RuntimeError::CreateDir {
            path: path.display().to_string(),
            source,
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn files_default_under_state_root() {
        let paths = StatePaths::new("/srv/flux");
        assert_eq!(paths.settings_file(), PathBuf::from("/srv/flux/settings.json"));
        assert_eq!(paths.vault_file(), PathBuf::from("/srv/flux/.env"));
        assert_eq!(paths.content_root(), PathBuf::from("/srv/flux"));
        assert_eq!(paths.runtime_log_path(), PathBuf::from("/srv/flux/logs/runtime.log"));
    }

    #[test]
    fn config_overrides_individual_files() {
        let config = ServiceConfig {
            state_root: Some(PathBuf::from("/srv/flux")),
            vault_file: Some(PathBuf::from("/etc/flux/secrets.env")),
            content_root: Some(PathBuf::from("/opt/flux")),
            ..ServiceConfig::default()
        };
        let paths = StatePaths::from_config(&config).expect("paths");
        assert_eq!(paths.vault_file(), PathBuf::from("/etc/flux/secrets.env"));
        assert_eq!(paths.settings_file(), PathBuf::from("/srv/flux/settings.json"));
        assert_eq!(paths.content_root(), PathBuf::from("/opt/flux"));
    }

    #[test]
    fn bootstrap_creates_log_and_content_folders() {
        let dir = tempdir().expect("tempdir");
        let paths = StatePaths::new(dir.path().join("state"));
        bootstrap_state_root(&paths).expect("bootstrap");
        for folder in ["logs", "prompts", "memory", "knowledge"] {
            assert!(dir.path().join("state").join(folder).is_dir(), "{folder}");
        }
    }
}
