use super::agent_config::AgentConfig;
use crate::shared::ids::WorkerId;
use std::collections::HashSet;
use std::sync::{Arc, RwLock};

/// A live agent. Holds the configuration it currently runs with and at most
/// one delegated subordinate.
#[derive(Debug)]
pub struct Worker {
    id: WorkerId,
    config: RwLock<Arc<AgentConfig>>,
    subordinate: RwLock<Option<Arc<Worker>>>,
}

impl Worker {
    pub fn new(id: WorkerId, config: Arc<AgentConfig>) -> Arc<Self> {
        Arc::new(Self {
            id,
            config: RwLock::new(config),
            subordinate: RwLock::new(None),
        })
    }

    pub fn id(&self) -> &WorkerId {
        &self.id
    }

    pub fn config(&self) -> Arc<AgentConfig> {
        self.config
            .read()
            .unwrap_or_else(|err| err.into_inner())
            .clone()
    }

    pub fn subordinate(&self) -> Option<Arc<Worker>> {
        self.subordinate
            .read()
            .unwrap_or_else(|err| err.into_inner())
            .clone()
    }

    /// Links `subordinate` below this worker, replacing any previous link.
    /// The subordinate starts on this worker's configuration.
    pub fn delegate(&self, subordinate: Arc<Worker>) {
        // Held across the copy so a concurrent `apply_config` cannot skip it.
        let mut slot = self
            .subordinate
            .write()
            .unwrap_or_else(|err| err.into_inner());
        subordinate.replace_config(self.config());
        *slot = Some(subordinate);
    }

    pub fn release_subordinate(&self) -> Option<Arc<Worker>> {
        self.subordinate
            .write()
            .unwrap_or_else(|err| err.into_inner())
            .take()
    }

    /// Gives `config` to this worker and then to every subordinate down the
    /// chain. Returns how many workers were updated.
    pub fn apply_config(self: &Arc<Self>, config: &Arc<AgentConfig>) -> usize {
        let mut visited = HashSet::new();
        let mut next = Some(self.clone());
        while let Some(worker) = next {
            if !visited.insert(worker.id.clone()) {
                break;
            }
            worker.replace_config(config.clone());
            next = worker.subordinate();
        }
        visited.len()
    }

    /// This worker followed by its subordinates, root first.
    pub fn chain(self: &Arc<Self>) -> Vec<Arc<Worker>> {
        let mut seen = HashSet::new();
        let mut chain = Vec::new();
        let mut next = Some(self.clone());
        while let Some(worker) = next {
            if !seen.insert(worker.id.clone()) {
                break;
            }
            next = worker.subordinate();
            chain.push(worker);
        }
        chain
    }

    fn replace_config(&self, config: Arc<AgentConfig>) {
        *self.config.write().unwrap_or_else(|err| err.into_inner()) = config;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::default_settings;
    use crate::shared::ids::ContextId;

    fn config(revision: u64) -> Arc<AgentConfig> {
        Arc::new(AgentConfig::from_settings(Arc::new(default_settings()), revision))
    }

    fn worker(depth: usize, revision: u64) -> Arc<Worker> {
        let context = ContextId::parse("main").expect("context");
        Worker::new(WorkerId::for_chain(&context, depth), config(revision))
    }

    #[test]
    fn apply_config_walks_the_whole_chain() {
        let root = worker(0, 0);
        let middle = worker(1, 0);
        let leaf = worker(2, 0);
        middle.delegate(leaf.clone());
        root.delegate(middle.clone());

        let next = config(5);
        assert_eq!(root.apply_config(&next), 3);
        for member in [&root, &middle, &leaf] {
            assert!(Arc::ptr_eq(&member.config(), &next));
        }
        let ids: Vec<String> = root.chain().iter().map(|w| w.id().to_string()).collect();
        assert_eq!(ids, vec!["main-agent0", "main-agent1", "main-agent2"]);
    }

    #[test]
    fn delegated_worker_inherits_the_delegators_config() {
        let root = worker(0, 7);
        let subordinate = worker(1, 1);
        root.delegate(subordinate.clone());
        assert_eq!(subordinate.config().revision, 7);

        let released = root.release_subordinate().expect("released");
        assert_eq!(released.id(), subordinate.id());
        assert_eq!(root.apply_config(&config(8)), 1);
        assert_eq!(subordinate.config().revision, 7);
    }

    #[test]
    fn subordinate_linked_during_broadcasts_ends_on_the_latest_config() {
        let root = worker(0, 0);
        std::thread::scope(|scope| {
            scope.spawn(|| {
                for revision in 1..=200 {
                    root.apply_config(&config(revision));
                }
            });
            scope.spawn(|| {
                for _ in 0..200 {
                    root.delegate(worker(1, 0));
                }
            });
        });

        let subordinate = root.subordinate().expect("subordinate");
        assert_eq!(root.config().revision, 200);
        assert!(Arc::ptr_eq(&subordinate.config(), &root.config()));
    }

    #[test]
    fn cyclic_links_do_not_loop_forever() {
        let first = worker(0, 0);
        let second = worker(1, 0);
        first.delegate(second.clone());
        second.delegate(first.clone());
        assert_eq!(first.apply_config(&config(2)), 2);
        assert_eq!(first.chain().len(), 2);
    }
}
