//! Configuration loading and management
//!
//! Handles parsing of the `todos.toml` configuration file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use directories::ProjectDirs;

use crate::storage::{FileSlot, DEFAULT_KEY};

/// Name of the configuration file inside the config directory
pub const CONFIG_FILE: &str = "todos.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Durable slot configuration
    #[serde(default)]
    pub storage: StorageConfig,

    /// Terminal UI configuration
    #[serde(default)]
    pub ui: UiConfig,
}

/// Durable slot configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the slot file (defaults to the platform data dir)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,

    /// Slot name; the file is `<dir>/<key>.json`
    #[serde(default = "default_key")]
    pub key: String,
}

fn default_key() -> String {
    DEFAULT_KEY.to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: None,
            key: default_key(),
        }
    }
}

/// Terminal UI configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Capture mouse clicks
    #[serde(default = "default_true")]
    pub mouse: bool,

    /// Two clicks on the same row within this window count as a double-click
    #[serde(default = "default_double_click_ms")]
    pub double_click_ms: u64,
}

fn default_true() -> bool {
    true
}

fn default_double_click_ms() -> u64 {
    400
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            mouse: default_true(),
            double_click_ms: default_double_click_ms(),
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "todos")
}

/// Default config file location (`<config_dir>/todos.toml`)
pub fn default_config_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE))
}

/// Default slot directory when `storage.dir` is not set
pub fn default_data_dir() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from `path`, or return defaults when it does not exist
    pub fn load_or_default(path: &Path) -> crate::error::Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> crate::error::Result<()> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Resolve the slot this configuration points at
    pub fn slot(&self) -> FileSlot {
        let dir = self.storage.dir.clone().unwrap_or_else(default_data_dir);
        FileSlot::new(dir, self.storage.key.clone())
    }

    fn validate(&self) -> crate::error::Result<()> {
        self.storage.validate()?;
        self.ui.validate()?;
        Ok(())
    }
}

impl StorageConfig {
    fn validate(&self) -> crate::error::Result<()> {
        let key = self.key.trim();
        if key.is_empty() {
            return Err(crate::error::Error::InvalidConfig(
                "storage.key cannot be empty".to_string(),
            ));
        }
        if key != self.key {
            return Err(crate::error::Error::InvalidConfig(
                "storage.key cannot have surrounding whitespace".to_string(),
            ));
        }
        if !key
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' || ch == '.')
            || key.starts_with('.')
        {
            return Err(crate::error::Error::InvalidConfig(format!(
                "storage.key '{key}' must be alphanumeric with '-', '_' or '.'"
            )));
        }
        Ok(())
    }
}

impl UiConfig {
    fn validate(&self) -> crate::error::Result<()> {
        if !(50..=2000).contains(&self.double_click_ms) {
            return Err(crate::error::Error::InvalidConfig(
                "ui.double_click_ms must be between 50 and 2000".to_string(),
            ));
        }
        Ok(())
    }
}
