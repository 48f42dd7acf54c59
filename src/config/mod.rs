pub mod error;
pub mod load;
pub mod paths;
pub mod service;

pub use error::ConfigError;
pub use load::{load_service_config, load_service_config_from, resolve_state_root};
pub use paths::{
    default_global_config_path, default_state_root, GLOBAL_CONFIG_FILE_NAME, GLOBAL_STATE_DIR,
    SETTINGS_FILE_NAME, VAULT_FILE_NAME,
};
pub use service::{ContextConfig, ServiceConfig};

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;
    use tempfile::tempdir;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn global_config_path_lives_under_home_state_dir() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|err| err.into_inner());
        let temp = tempdir().expect("tempdir");
        let _home = HomeGuard::set(temp.path());

        let path = default_global_config_path().expect("config path");
        assert_eq!(path, temp.path().join(".agentflux").join("config.yaml"));
    }

    #[test]
    fn missing_config_file_resolves_defaults_under_home() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|err| err.into_inner());
        let temp = tempdir().expect("tempdir");
        let _home = HomeGuard::set(temp.path());

        let config = load_service_config().expect("load defaults");
        let root = resolve_state_root(&config).expect("state root");
        assert_eq!(root, temp.path().join(".agentflux"));
    }

    #[test]
    fn explicit_state_root_wins_over_home() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("config.yaml");
        fs::write(&path, "state_root: /srv/flux\n").expect("write config");

        let config = load_service_config_from(&path).expect("load config");
        assert_eq!(
            resolve_state_root(&config).expect("state root"),
            PathBuf::from("/srv/flux")
        );
    }

    struct HomeGuard {
        old_home: Option<std::ffi::OsString>,
    }

    impl HomeGuard {
        fn set(home: &Path) -> Self {
            let old_home = std::env::var_os("HOME");
            std::env::set_var("HOME", home);
            Self { old_home }
        }
    }

    impl Drop for HomeGuard {
        fn drop(&mut self) {
            if let Some(old_home) = self.old_home.take() {
                std::env::set_var("HOME", old_home);
            } else {
                std::env::remove_var("HOME");
            }
        }
    }
}
