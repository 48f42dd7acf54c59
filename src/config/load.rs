use super::{default_global_config_path, default_state_root, ConfigError, ServiceConfig};
use std::path::Path;

/// Loads `$HOME/.agentflux/config.yaml`, falling back to defaults when the
/// file does not exist.
pub fn load_service_config() -> Result<ServiceConfig, ConfigError> {
    let path = default_global_config_path()?;
    load_service_config_from(&path)
}

pub fn load_service_config_from(path: &Path) -> Result<ServiceConfig, ConfigError> {
    let config = if path.exists() {
        ServiceConfig::from_path(path)?
    } else {
        ServiceConfig::default()
    };
    config.validate()?;
    Ok(config)
}

/// State root used when the config file leaves `state_root` unset.
pub fn resolve_state_root(config: &ServiceConfig) -> Result<std::path::PathBuf, ConfigError> {
    match &config.state_root {
        Some(root) => Ok(root.clone()),
        None => default_state_root(),
    }
}
