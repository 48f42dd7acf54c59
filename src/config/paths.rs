use crate::config::ConfigError;
use std::path::PathBuf;

pub const GLOBAL_STATE_DIR: &str = ".agentflux";
pub const GLOBAL_CONFIG_FILE_NAME: &str = "config.yaml";
pub const SETTINGS_FILE_NAME: &str = "settings.json";
pub const VAULT_FILE_NAME: &str = ".env";

pub fn default_state_root() -> Result<PathBuf, ConfigError> {
    let home = std::env::var_os("HOME").ok_or(ConfigError::HomeDirectoryUnavailable)?;
    Ok(PathBuf::from(home).join(GLOBAL_STATE_DIR))
}

pub fn default_global_config_path() -> Result<PathBuf, ConfigError> {
    Ok(default_state_root()?.join(GLOBAL_CONFIG_FILE_NAME))
}
