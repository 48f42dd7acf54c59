use super::agent_config::AgentConfig;
use super::broadcaster::ConfigSubscriber;
use super::worker::Worker;
use super::RuntimeError;
use crate::config::ContextConfig;
use crate::shared::ids::{ContextId, WorkerId};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// Root workers of every live context, keyed by context id.
#[derive(Debug, Default)]
pub struct WorkerRegistry {
    roots: Mutex<BTreeMap<ContextId, Arc<Worker>>>,
}

impl WorkerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, context: ContextId, root: Arc<Worker>) -> Result<(), RuntimeError> {
        let mut roots = self.lock_roots();
        if roots.contains_key(&context) {
            return Err(RuntimeError::DuplicateContext(context.to_string()));
        }
        roots.insert(context, root);
        Ok(())
    }

    pub fn deregister(&self, context: &ContextId) -> Option<Arc<Worker>> {
        self.lock_roots().remove(context)
    }

    pub fn root(&self, context: &ContextId) -> Option<Arc<Worker>> {
        self.lock_roots().get(context).cloned()
    }

    /// Snapshot of the live root workers.
    pub fn live(&self) -> Vec<(ContextId, Arc<Worker>)> {
        self.lock_roots()
            .iter()
            .map(|(context, root)| (context.clone(), root.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.lock_roots().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock_roots().is_empty()
    }

    /// Starts a root worker for `context` with its chain of subordinates, all
    /// on `config`, and registers it.
    pub fn spawn_context(
        &self,
        context: &ContextConfig,
        config: Arc<AgentConfig>,
    ) -> Result<Arc<Worker>, RuntimeError> {
        let root = Worker::new(WorkerId::for_chain(&context.id, 0), config.clone());
        let mut tail = root.clone();
        for depth in 1..=context.subordinates {
            let subordinate = Worker::new(WorkerId::for_chain(&context.id, depth), config.clone());
            tail.delegate(subordinate.clone());
            tail = subordinate;
        }
        self.register(context.id.clone(), root.clone())?;
        Ok(root)
    }

    pub fn clear(&self) -> usize {
        let mut roots = self.lock_roots();
        let count = roots.len();
        roots.clear();
        count
    }

    fn lock_roots(&self) -> MutexGuard<'_, BTreeMap<ContextId, Arc<Worker>>> {
        self.roots.lock().unwrap_or_else(|err| err.into_inner())
    }
}

impl ConfigSubscriber for WorkerRegistry {
    fn config_replaced(&self, config: &Arc<AgentConfig>) -> usize {
        let roots = self.lock_roots();
        roots.values().map(|root| root.apply_config(config)).sum()
    }
}
