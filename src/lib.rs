pub mod app;
pub mod cli;
pub mod concepts;
pub mod config;
pub mod export;
pub mod logging;
pub mod model;
pub mod options;
pub mod persistence;
pub mod prompt;
pub mod store;

pub use app::PromptBuilderApp;
pub use concepts::{ConceptRegistry, CreativeConcept};
pub use config::{Config, ConfigManager};
pub use model::{FieldId, FieldValue, FieldValues, Scene, SceneDna, SceneTemplate, Shot, ShotData};
pub use options::{AddOutcome, CustomOptionStore, OptionCatalog, OptionEntry, OptionResolver};
pub use persistence::{JsonFileStore, MemoryStore, Snapshot, SnapshotStore};
pub use prompt::{cleanup_prompt, serialize_prompt, PromptSerializer};
pub use store::{AppState, StoreError};
