use super::normalize::{normalize_with_report, NormalizeReport};
use super::record::{Candidate, SettingsRecord};
use super::secrets::{hydrate, redact, sensitive_entries};
use super::default_settings;
use crate::config::ConfigError;
use crate::runtime::logging::append_log_line;
use crate::shared::fs_atomic::{atomic_write_file, read_optional};
use crate::vault::SecretVault;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Receives every record that becomes current, together with its revision.
/// Called while the store still holds its lock, so observers see revisions in
/// order and never race a later `set`.
pub trait SettingsObserver: Send + Sync {
    fn settings_replaced(&self, record: &Arc<SettingsRecord>, revision: u64);
}

#[derive(Debug, Default)]
struct StoreState {
    current: Option<Arc<SettingsRecord>>,
    revision: u64,
}

/// Owner of the canonical settings record.
pub struct SettingsStore {
    settings_path: PathBuf,
    vault: Arc<SecretVault>,
    observers: Vec<Arc<dyn SettingsObserver>>,
    log_path: Option<PathBuf>,
    state: Mutex<StoreState>,
}

impl SettingsStore {
    pub fn new(settings_path: impl Into<PathBuf>, vault: Arc<SecretVault>) -> Self {
        Self {
            settings_path: settings_path.into(),
            vault,
            observers: Vec::new(),
            log_path: None,
            state: Mutex::new(StoreState::default()),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn SettingsObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn with_log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_path = Some(path.into());
        self
    }

    pub fn settings_path(&self) -> &Path {
        &self.settings_path
    }

    pub fn vault(&self) -> &Arc<SecretVault> {
        &self.vault
    }

    /// Number of successful `set` calls since the store was created.
    pub fn revision(&self) -> u64 {
        self.lock_state().revision
    }

    /// Current record; the first call loads it from the settings file, or
    /// from defaults when there is no file yet.
    pub fn get(&self) -> Result<Arc<SettingsRecord>, ConfigError> {
        let mut state = self.lock_state();
        if let Some(current) = &state.current {
            return Ok(current.clone());
        }
        let loaded = Arc::new(self.load()?);
        state.current = Some(loaded.clone());
        Ok(loaded)
    }

    /// Normalizes `candidate`, writes its secrets to the vault and the rest to
    /// the settings file, makes it current and notifies observers. Nothing
    /// changes unless every write succeeds.
    pub fn set(&self, candidate: &Candidate) -> Result<Arc<SettingsRecord>, ConfigError> {
        let mut state = self.lock_state();

        let (record, report) = normalize_with_report(candidate);
        self.log_report(&report);

        let body = encode_record(&redact(&record), &self.settings_path)?;
        let snapshot = self
            .vault
            .apply(&sensitive_entries(&record, &self.vault.entries()))?;
        if let Err(source) = atomic_write_file(&self.settings_path, body.as_bytes()) {
            if let Err(err) = self.vault.restore(snapshot) {
                self.log(
                    "error",
                    "vault.restore_failed",
                    &format!("path={} error={err}", self.vault.path().display()),
                );
            }
            return Err(ConfigError::Write {
                path: self.settings_path.display().to_string(),
                source,
            });
        }

        let record = Arc::new(record);
        state.revision += 1;
        state.current = Some(record.clone());
        self.log(
            "info",
            "settings.saved",
            &format!(
                "path={} revision={} fingerprint={}",
                self.settings_path.display(),
                state.revision,
                fingerprint(&body)
            ),
        );

        for observer in &self.observers {
            observer.settings_replaced(&record, state.revision);
        }
        Ok(record)
    }

    fn load(&self) -> Result<SettingsRecord, ConfigError> {
        let path = self.settings_path.display().to_string();
        let raw = read_optional(&self.settings_path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        let Some(raw) = raw else {
            self.log("info", "settings.loaded", "source=defaults");
            return Ok(hydrate(&default_settings(), &self.vault));
        };

        let parsed: serde_json::Value = serde_json::from_str(&raw)
            .map_err(|source| ConfigError::Decode {
                path: path.clone(),
                source,
            })?;
        let serde_json::Value::Object(candidate) = parsed else {
            return Err(ConfigError::NotAnObject { path });
        };
        let (record, report) = normalize_with_report(&candidate);
        self.log_report(&report);
        self.log("info", "settings.loaded", &format!("source={path}"));
        Ok(hydrate(&record, &self.vault))
    }

    fn log_report(&self, report: &NormalizeReport) {
        if !report.fallbacks.is_empty() {
            self.log(
                "warn",
                "settings.coercion_fallback",
                &format!("keys={}", report.fallbacks.join(",")),
            );
        }
        if !report.ignored.is_empty() {
            self.log(
                "info",
                "settings.unknown_keys",
                &format!("keys={}", report.ignored.join(",")),
            );
        }
    }

    fn log(&self, level: &str, event: &str, message: &str) {
        if let Some(path) = &self.log_path {
            append_log_line(path, level, event, message);
        }
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(|err| err.into_inner())
    }
}

fn encode_record(record: &SettingsRecord, path: &Path) -> Result<String, ConfigError> {
    let mut body = serde_json::to_string_pretty(record).map_err(|source| ConfigError::Encode {
        path: path.display().to_string(),
        source,
    })?;
    body.push('\n');
    Ok(body)
}

fn fingerprint(body: &str) -> String {
    let digest = Sha256::digest(body.as_bytes());
    digest[..8].iter().map(|byte| format!("{byte:02x}")).collect()
}
