use anyhow::{anyhow, Context, Result};
use jsonc_parser::{parse_to_serde_value, ParseOptions};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use crate::model::{
    validate_layouts, FieldGroup, DEFAULT_ASPECT_RATIO, SCENE_DNA_GROUPS, SHOT_GROUPS,
};

const APP_NAME: &str = "scenedna-rs";
pub const DEFAULT_STORAGE_KEY: &str = "historical-prompt-builder-storage-v2";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// File stem of the persisted snapshot inside the data directory.
    #[serde(default = "default_storage_key")]
    pub storage_key: String,

    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    #[serde(default = "default_aspect_ratio")]
    pub default_aspect_ratio: String,

    /// Re-serialize every shot when its scene's DNA changes.
    #[serde(default)]
    pub refresh_prompts_on_scene_update: bool,

    #[serde(default)]
    pub export_path: Option<PathBuf>,
}

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

fn default_aspect_ratio() -> String {
    DEFAULT_ASPECT_RATIO.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage_key: default_storage_key(),
            data_dir: None,
            default_aspect_ratio: default_aspect_ratio(),
            refresh_prompts_on_scene_update: false,
            export_path: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfigManager {
    inner: Arc<ConfigManagerInner>,
}

#[derive(Debug)]
struct ConfigManagerInner {
    config: RwLock<Config>,
    config_path: PathBuf,
    default_data_dir: PathBuf,
}

impl ConfigManager {
    pub fn load() -> Result<Self> {
        let dirs = directories::ProjectDirs::from("", "", APP_NAME)
            .context("Failed to get config directory")?;
        Self::load_from(dirs.config_dir(), dirs.data_dir())
    }

    /// Loads `config.jsonc` from `config_dir`, migrating a legacy `config.json` or writing
    /// defaults when neither exists.
    pub fn load_from(config_dir: &Path, default_data_dir: &Path) -> Result<Self> {
        check_field_layouts(SCENE_DNA_GROUPS, SHOT_GROUPS)?;
        fs::create_dir_all(config_dir).context("Failed to create config directory")?;

        let jsonc_path = config_dir.join("config.jsonc");
        let legacy_path = config_dir.join("config.json");

        let (config_path, config) = if jsonc_path.exists() {
            let config = Self::read_config_from_disk(&jsonc_path)?;
            (jsonc_path, config)
        } else if legacy_path.exists() {
            let config = Self::read_config_from_disk(&legacy_path)?;
            Self::write_config_file(&jsonc_path, &config)?;
            tracing::info!(
                "Migrated legacy config to JSONC: {:?} -> {:?}",
                legacy_path,
                jsonc_path
            );
            (jsonc_path, config)
        } else {
            let default_config = Config::default();
            Self::write_config_file(&jsonc_path, &default_config)?;
            tracing::info!("Created default config at: {:?}", jsonc_path);
            (jsonc_path, default_config)
        };

        tracing::info!("Loaded config from: {:?}", config_path);

        Ok(Self {
            inner: Arc::new(ConfigManagerInner {
                config: RwLock::new(config),
                config_path,
                default_data_dir: default_data_dir.to_path_buf(),
            }),
        })
    }

    pub fn get(&self) -> Config {
        self.inner
            .config
            .read()
            .expect("config lock poisoned")
            .clone()
    }

    pub fn update(&self, apply: impl FnOnce(&mut Config)) {
        let mut guard = self.inner.config.write().expect("config lock poisoned");
        apply(&mut guard);
    }

    pub fn save(&self) -> Result<()> {
        let config = self.get();
        Self::write_config_file(&self.inner.config_path, &config)?;
        tracing::info!("Saved config to: {:?}", self.inner.config_path);
        Ok(())
    }

    pub fn config_path(&self) -> &Path {
        &self.inner.config_path
    }

    pub fn data_dir(&self) -> PathBuf {
        self.get()
            .data_dir
            .unwrap_or_else(|| self.inner.default_data_dir.clone())
    }

    pub fn snapshot_path(&self) -> PathBuf {
        let config = self.get();
        self.data_dir().join(format!("{}.json", config.storage_key))
    }

    /// Where `export` writes when no path is given on the command line.
    pub fn export_path(&self) -> PathBuf {
        self.get()
            .export_path
            .unwrap_or_else(|| self.data_dir().join("historical_prompts_export.csv"))
    }

    fn read_config_from_disk(path: &Path) -> Result<Config> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file at {:?}", path))?;
        Self::parse_config(&content)
    }

    fn write_config_file(path: &Path, config: &Config) -> Result<()> {
        let json = serde_json::to_string_pretty(config).context("Failed to serialize config")?;
        fs::write(path, json).with_context(|| format!("Failed to write config file at {:?}", path))
    }

    fn parse_config(content: &str) -> Result<Config> {
        let value = parse_to_serde_value(content, &ParseOptions::default())
            .context("Failed to parse config as JSONC")?
            .ok_or_else(|| anyhow!("Config file did not contain a JSON value"))?;
        serde_json::from_value(value).context("Failed to deserialize config")
    }
}

/// Field layouts are checked once, before any stored data is interpreted against them.
fn check_field_layouts(scene_groups: &[FieldGroup], shot_groups: &[FieldGroup]) -> Result<()> {
    validate_layouts(scene_groups, shot_groups).context("Field layout is invalid")
}
