use super::agent_config::AgentConfig;
use super::logging::append_log_line;
use crate::settings::{SettingsObserver, SettingsRecord};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

/// Something that hands a new configuration to live workers.
pub trait ConfigSubscriber: Send + Sync {
    /// Returns the number of workers that now hold `config`.
    fn config_replaced(&self, config: &Arc<AgentConfig>) -> usize;
}

#[derive(Debug, Default)]
struct BroadcastState {
    current: Option<Arc<AgentConfig>>,
    reached: usize,
}

/// Turns every stored settings record into an [`AgentConfig`] and pushes it
/// to all subscribers.
#[derive(Default)]
pub struct PropagationBroadcaster {
    subscribers: RwLock<Vec<Arc<dyn ConfigSubscriber>>>,
    state: Mutex<BroadcastState>,
    log_path: Option<PathBuf>,
}

impl PropagationBroadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_path = Some(path.into());
        self
    }

    pub fn subscribe(&self, subscriber: Arc<dyn ConfigSubscriber>) {
        self.subscribers
            .write()
            .unwrap_or_else(|err| err.into_inner())
            .push(subscriber);
    }

    /// Last configuration broadcast or primed.
    pub fn current(&self) -> Option<Arc<AgentConfig>> {
        self.lock_state().current.clone()
    }

    /// Workers reached by the last broadcast.
    pub fn last_reach(&self) -> usize {
        self.lock_state().reached
    }

    /// Records `config` as current without delivering it.
    pub fn prime(&self, config: Arc<AgentConfig>) {
        let mut state = self.lock_state();
        state.current = Some(config);
        state.reached = 0;
    }

    /// Runs `attach` with the current configuration while no broadcast can
    /// start, so whatever it registers cannot miss a newer one.
    pub fn attach<T>(&self, attach: impl FnOnce(Option<Arc<AgentConfig>>) -> T) -> T {
        let state = self.lock_state();
        attach(state.current.clone())
    }

    /// Delivers `config` to every subscriber. Every worker reachable when the
    /// call starts holds `config` once it returns.
    pub fn broadcast(&self, config: Arc<AgentConfig>) -> usize {
        let mut state = self.lock_state();
        let subscribers = self
            .subscribers
            .read()
            .unwrap_or_else(|err| err.into_inner())
            .clone();
        let reached: usize = subscribers
            .iter()
            .map(|subscriber| subscriber.config_replaced(&config))
            .sum();

        if let Some(path) = &self.log_path {
            append_log_line(
                path,
                "info",
                "config.broadcast",
                &format!("revision={} workers={reached}", config.revision),
            );
        }
        state.current = Some(config);
        state.reached = reached;
        reached
    }

    fn lock_state(&self) -> MutexGuard<'_, BroadcastState> {
        self.state.lock().unwrap_or_else(|err| err.into_inner())
    }
}

impl SettingsObserver for PropagationBroadcaster {
    fn settings_replaced(&self, record: &Arc<SettingsRecord>, revision: u64) {
        self.broadcast(Arc::new(AgentConfig::from_settings(record.clone(), revision)));
    }
}
