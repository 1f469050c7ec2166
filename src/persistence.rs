use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::model::{Scene, SceneTemplate};
use crate::options::CustomOptionStore;
use crate::store::{AppState, Direction, Theme};

/// What survives a restart. Built-in templates are re-seeded and never written out.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub scenes: Vec<Scene>,
    #[serde(default)]
    pub scene_templates: Vec<SceneTemplate>,
    #[serde(default)]
    pub theme: Theme,
    #[serde(default)]
    pub direction: Direction,
    #[serde(default)]
    pub custom_options: CustomOptionStore,
}

impl Snapshot {
    pub fn capture(state: &AppState) -> Self {
        Self {
            scenes: state.scenes().to_vec(),
            scene_templates: state
                .templates()
                .iter()
                .filter(|template| template.is_user_defined)
                .cloned()
                .collect(),
            theme: state.theme(),
            direction: state.direction(),
            custom_options: state.custom_options().clone(),
        }
    }

    pub fn into_state(self) -> AppState {
        AppState::restore(
            self.scenes,
            self.scene_templates,
            self.custom_options,
            self.theme,
            self.direction,
        )
    }
}

pub trait SnapshotStore: Send + Sync {
    /// `Ok(None)` when nothing has been saved yet.
    fn load(&self) -> Result<Option<Snapshot>>;
    fn save(&self, snapshot: &Snapshot) -> Result<()>;
}

/// Snapshot persisted as pretty JSON in a single file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn in_dir(data_dir: &Path, storage_key: &str) -> Self {
        Self::new(data_dir.join(format!("{storage_key}.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotStore for JsonFileStore {
    fn load(&self) -> Result<Option<Snapshot>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read snapshot at {:?}", self.path))?;
        let snapshot = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse snapshot at {:?}", self.path))?;
        Ok(Some(snapshot))
    }

    fn save(&self, snapshot: &Snapshot) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).context("Failed to create data directory")?;
        }
        let json = serde_json::to_string_pretty(snapshot).context("Failed to serialize snapshot")?;
        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write snapshot at {:?}", self.path))?;
        tracing::debug!(path = ?self.path, scenes = snapshot.scenes.len(), "Saved snapshot");
        Ok(())
    }
}

/// In-process store; the snapshot still goes through JSON so tests see the same encoding.
#[derive(Debug, Default)]
pub struct MemoryStore {
    json: Mutex<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_json(json: impl Into<String>) -> Self {
        Self {
            json: Mutex::new(Some(json.into())),
        }
    }

    pub fn raw(&self) -> Option<String> {
        self.json.lock().expect("snapshot lock poisoned").clone()
    }
}

impl SnapshotStore for MemoryStore {
    fn load(&self) -> Result<Option<Snapshot>> {
        match self.raw() {
            Some(json) => Ok(Some(
                serde_json::from_str(&json).context("Failed to parse stored snapshot")?,
            )),
            None => Ok(None),
        }
    }

    fn save(&self, snapshot: &Snapshot) -> Result<()> {
        let json = serde_json::to_string(snapshot).context("Failed to serialize snapshot")?;
        *self.json.lock().expect("snapshot lock poisoned") = Some(json);
        Ok(())
    }
}

/// Restores state from `store`, starting fresh when nothing is stored or the stored data
/// cannot be read.
pub fn load_state(store: &dyn SnapshotStore) -> AppState {
    match store.load() {
        Ok(Some(snapshot)) => {
            tracing::info!(scenes = snapshot.scenes.len(), "Restored saved state");
            snapshot.into_state()
        }
        Ok(None) => AppState::new(),
        Err(err) => {
            tracing::warn!("Failed to load saved state, starting fresh: {err:#}");
            AppState::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FieldId;
    use crate::model::SceneDna;

    #[test]
    fn snapshot_skips_builtin_templates() {
        let mut state = AppState::new();
        let scene_id = state.create_scene("Harbor", SceneDna::default()).id.clone();
        state
            .save_scene_as_template(&scene_id, "Harbor Template")
            .expect("scene exists");

        let snapshot = Snapshot::capture(&state);
        assert_eq!(snapshot.scene_templates.len(), 1);
        assert!(snapshot.scene_templates[0].is_user_defined);

        let restored = snapshot.into_state();
        assert_eq!(restored.templates().len(), 3);
    }

    #[test]
    fn uses_camel_case_keys() {
        let value = serde_json::to_value(Snapshot::default()).expect("encodes");
        assert!(value.get("sceneTemplates").is_some());
        assert!(value.get("customOptions").is_some());
        assert_eq!(value["theme"], "dark");
        assert_eq!(value["direction"], "ltr");
    }

    #[test]
    fn corrupt_data_falls_back_to_fresh_state() {
        let store = MemoryStore::with_json("{ not json");
        let state = load_state(&store);
        assert!(state.scenes().is_empty());
        assert_eq!(state.templates().len(), 2);
    }

    #[test]
    fn file_store_round_trips_custom_options() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = JsonFileStore::in_dir(&dir.path().join("nested"), "storage");
        assert!(store.load().expect("missing file is fine").is_none());

        let mut state = AppState::new();
        state.add_custom_option(FieldId::Mood, "Quiet Dread", "Quiet Dread", None);
        store.save(&Snapshot::capture(&state)).expect("saves");

        let restored = load_state(&store);
        assert_eq!(
            restored.resolver().label_for(FieldId::Mood, "quiet_dread").as_deref(),
            Some("Quiet Dread")
        );
    }
}
