pub mod agent_config;
pub mod broadcaster;
pub mod logging;
pub mod state_paths;
pub mod worker;
pub mod worker_registry;

pub use crate::shared::errors::RuntimeError;
pub use agent_config::{AgentConfig, ModelConfig, RateLimits, DEFAULT_KNOWLEDGE_SUBDIR};
pub use broadcaster::{ConfigSubscriber, PropagationBroadcaster};
pub use logging::{append_log_line, append_runtime_log};
pub use state_paths::{bootstrap_state_root, StatePaths};
pub use worker::Worker;
pub use worker_registry::WorkerRegistry;

use crate::config::{ConfigError, ContextConfig, ServiceConfig};
use crate::provider::BuiltinProviderRegistry;
use crate::schema::{FormProjector, SettingsForm};
use crate::settings::{Candidate, SettingsRecord, SettingsStore};
use crate::shared::directories::FsDirectoryEnumerator;
use crate::shared::time::now_secs;
use crate::vault::{DotenvLoader, SecretVault};
use std::sync::Arc;

/// The running configuration service: settings store, vault, form projection
/// and the live worker hierarchy kept in sync with every `set`.
pub struct Service {
    paths: StatePaths,
    vault: Arc<SecretVault>,
    store: SettingsStore,
    broadcaster: Arc<PropagationBroadcaster>,
    registry: Arc<WorkerRegistry>,
    projector: FormProjector,
    started_at: i64,
}

impl Service {
    pub fn open(config: &ServiceConfig) -> Result<Self, RuntimeError> {
        let paths = StatePaths::from_config(config)?;
        Self::open_with_paths(paths, config)
    }

    pub fn open_with_paths(paths: StatePaths, config: &ServiceConfig) -> Result<Self, RuntimeError> {
        bootstrap_state_root(&paths)?;

        let loader = DotenvLoader {
            export_to_process: config.export_vault_to_process_env,
        };
        let vault = Arc::new(
            SecretVault::open(paths.vault_file(), Box::new(loader))
                .map_err(ConfigError::from)?
                .with_log_path(paths.runtime_log_path()),
        );
        let broadcaster =
            Arc::new(PropagationBroadcaster::new().with_log_path(paths.runtime_log_path()));
        let store = SettingsStore::new(paths.settings_file(), vault.clone())
            .with_observer(broadcaster.clone())
            .with_log_path(paths.runtime_log_path());

        let record = store.get()?;
        broadcaster.prime(Arc::new(AgentConfig::from_settings(record, store.revision())));

        let registry = Arc::new(WorkerRegistry::new());
        broadcaster.subscribe(registry.clone());

        let projector = FormProjector::new(
            vault.clone(),
            Arc::new(BuiltinProviderRegistry::new(vault.clone())),
            Arc::new(FsDirectoryEnumerator::new(paths.content_root())),
        );

        let service = Self {
            paths,
            vault,
            store,
            broadcaster,
            registry,
            projector,
            started_at: now_secs(),
        };
        for context in &config.contexts {
            service.spawn_context(context)?;
        }
        append_runtime_log(
            &service.paths,
            "info",
            "service.started",
            &format!("contexts={}", service.registry.len()),
        );
        Ok(service)
    }

    pub fn paths(&self) -> &StatePaths {
        &self.paths
    }

    pub fn vault(&self) -> &Arc<SecretVault> {
        &self.vault
    }

    pub fn store(&self) -> &SettingsStore {
        &self.store
    }

    pub fn registry(&self) -> &Arc<WorkerRegistry> {
        &self.registry
    }

    pub fn broadcaster(&self) -> &Arc<PropagationBroadcaster> {
        &self.broadcaster
    }

    pub fn projector(&self) -> &FormProjector {
        &self.projector
    }

    pub fn started_at(&self) -> i64 {
        self.started_at
    }

    /// Starts a context on the configuration of the latest completed `set`.
    pub fn spawn_context(&self, context: &ContextConfig) -> Result<Arc<Worker>, RuntimeError> {
        let fallback = match self.broadcaster.current() {
            Some(config) => config,
            None => Arc::new(AgentConfig::from_settings(
                self.store.get()?,
                self.store.revision(),
            )),
        };
        self.broadcaster.attach(|current| {
            self.registry
                .spawn_context(context, current.unwrap_or(fallback))
        })
    }

    pub fn get(&self) -> Result<Arc<SettingsRecord>, ConfigError> {
        self.store.get()
    }

    pub fn set(&self, candidate: &Candidate) -> Result<Arc<SettingsRecord>, ConfigError> {
        self.store.set(candidate)
    }

    pub fn project(&self) -> Result<SettingsForm, ConfigError> {
        let record = self.store.get()?;
        Ok(self.projector.project(&record))
    }

    /// Merges an edited form onto the current record and stores the result.
    pub fn apply_form(&self, payload: &SettingsForm) -> Result<Arc<SettingsRecord>, ConfigError> {
        let previous = self.store.get()?;
        self.store.set(&self.projector.merge(payload, &previous))
    }

    /// Drops every live context. Returns how many were stopped.
    pub fn shutdown(self) -> usize {
        let stopped = self.registry.clear();
        append_runtime_log(
            &self.paths,
            "info",
            "service.stopped",
            &format!("contexts={stopped}"),
        );
        stopped
    }
}
