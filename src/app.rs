use anyhow::Result;
use tracing::{info, warn};

use crate::config::{Config, ConfigManager};
use crate::persistence::{load_state, JsonFileStore, Snapshot, SnapshotStore};
use crate::store::AppState;

/// Application shell: owns the state and writes a snapshot after every mutation.
pub struct PromptBuilderApp {
    state: AppState,
    store: Box<dyn SnapshotStore>,
    config: Config,
}

impl PromptBuilderApp {
    pub fn new(config_manager: &ConfigManager) -> Result<Self> {
        let config = config_manager.get();
        let store = JsonFileStore::new(config_manager.snapshot_path());
        info!("Using snapshot at: {:?}", store.path());
        Ok(Self::with_store(config, Box::new(store)))
    }

    pub fn with_store(config: Config, store: Box<dyn SnapshotStore>) -> Self {
        let state = load_state(store.as_ref())
            .with_default_aspect_ratio(config.default_aspect_ratio.clone());
        Self {
            state,
            store,
            config,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Runs a mutation and persists the result. A failed save is logged, not returned, so
    /// the in-memory state stays authoritative.
    pub fn apply<T>(&mut self, mutate: impl FnOnce(&mut AppState) -> T) -> T {
        let result = mutate(&mut self.state);
        self.persist();
        result
    }

    pub fn persist(&self) {
        if let Err(err) = self.store.save(&Snapshot::capture(&self.state)) {
            warn!("Failed to persist state: {err:#}");
        }
    }
}
