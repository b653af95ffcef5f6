// src/config.rs
//! Merge settings with an optional JSON config file

use crate::{
    error::{MergeError, Result},
    processor::MergeMode,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    /// Scanned for batches when no paths are given
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Name prefix of batch archives/folders inside `input_dir`
    pub batch_prefix: String,
    pub mode: MergeMode,
    /// Metadata file left out of the merge; the mode's default when unset
    pub exclude_name: Option<String>,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("./raw_data"),
            output_dir: PathBuf::from("./output"),
            batch_prefix: "ACQU".to_string(),
            mode: MergeMode::Augment,
            exclude_name: None,
        }
    }
}

impl MergeConfig {
    /// Load the per-user config file, falling back to defaults when absent
    pub fn load() -> Result<Self> {
        match Self::get_config_path() {
            Ok(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load from an explicit config file
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| MergeError::Other(format!("Failed to read config file {}: {}", path.display(), e)))?;

        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| MergeError::Other(format!("Failed to parse config file {}: {}", path.display(), e)))?;

        Ok(config)
    }

    /// Save to the per-user config file
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| MergeError::Other(format!("Failed to create config directory: {}", e)))?;
        }

        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)
            .map_err(|e| MergeError::Other(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    fn get_config_path() -> Result<PathBuf> {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .map_err(|_| MergeError::Other("HOME environment variable not set".to_string()))?;

        Ok(PathBuf::from(home).join(".config").join("gps-merge").join("config.json"))
    }

    /// Metadata file name to exclude for the configured mode
    pub fn exclude_name(&self) -> &str {
        self.exclude_name
            .as_deref()
            .unwrap_or_else(|| self.mode.default_exclude_name())
    }

    /// Switch mode; a custom exclusion name is kept
    pub fn update_mode(&mut self, mode: MergeMode) {
        self.mode = mode;
    }
}
