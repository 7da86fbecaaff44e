//! Persisted user configuration.
//!
//! [`FleetConfig`] holds the monitored root paths, the ignore list and the
//! tuning knobs of the scanner. It lives as pretty JSON in the config directory
//! and every field has a serde default, so older or hand-edited files keep
//! loading as new settings are added.

use crate::core::dirs::get_config_directory;
use crate::core::error::GitFleetError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_FILE: &str = "config.json";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ScanTuning {
    /// Cached trees older than this are ignored at startup
    pub cache_max_age_secs: u64,
    /// Minimum spacing between two unforced cache writes
    pub min_cache_write_interval_secs: u64,
    /// Lower bound of the per-batch repository count
    pub batch_floor: usize,
    /// Upper bound for any single git/gh invocation
    pub command_timeout_secs: u64,
    /// `state` values counted as pending pull requests (case-insensitive)
    pub open_pr_states: Vec<String>,
}

impl Default for ScanTuning {
    fn default() -> Self {
        Self {
            cache_max_age_secs: 24 * 60 * 60,
            min_cache_write_interval_secs: 5,
            batch_floor: 4,
            command_timeout_secs: 15,
            open_pr_states: vec!["open".to_string()],
        }
    }
}

impl ScanTuning {
    pub fn cache_max_age(&self) -> Duration {
        Duration::from_secs(self.cache_max_age_secs)
    }

    pub fn min_cache_write_interval(&self) -> Duration {
        Duration::from_secs(self.min_cache_write_interval_secs)
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs.max(1))
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct FleetConfig {
    pub root_paths: Vec<PathBuf>,
    pub ignored_paths: Vec<PathBuf>,
    pub scan: ScanTuning,
}

impl FleetConfig {
    pub fn config_file() -> Result<PathBuf, GitFleetError> {
        Ok(get_config_directory()?.join(CONFIG_FILE))
    }

    pub fn load_or_create() -> Result<Self, GitFleetError> {
        Self::load_or_create_at(&Self::config_file()?)
    }

    pub fn load_or_create_at(config_file: &Path) -> Result<Self, GitFleetError> {
        if config_file.exists() {
            let content = std::fs::read_to_string(config_file)?;
            Ok(serde_json::from_str(&content)?)
        } else {
            log::debug!("Creating default config at {}", config_file.display());
            let config = Self::default();
            config.save_at(config_file)?;
            Ok(config)
        }
    }

    pub fn save(&self) -> Result<(), GitFleetError> {
        self.save_at(&Self::config_file()?)
    }

    pub fn save_at(&self, config_file: &Path) -> Result<(), GitFleetError> {
        if let Some(parent) = config_file.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(config_file, content)?;
        Ok(())
    }

    pub fn add_root(&mut self, path: PathBuf) -> Result<(), GitFleetError> {
        if !path.is_dir() {
            return Err(GitFleetError::RootNotADirectory { path });
        }
        if self.root_paths.contains(&path) {
            return Err(GitFleetError::RootAlreadyMonitored { path });
        }
        self.root_paths.push(path);
        Ok(())
    }

    pub fn remove_root(&mut self, path: &Path) -> Result<(), GitFleetError> {
        let before = self.root_paths.len();
        self.root_paths.retain(|p| p != path);
        if self.root_paths.len() == before {
            return Err(GitFleetError::RootNotMonitored {
                path: path.to_path_buf(),
            });
        }
        Ok(())
    }

    /// Returns false when the path was already ignored
    pub fn ignore_path(&mut self, path: PathBuf) -> bool {
        if self.ignored_paths.contains(&path) {
            return false;
        }
        self.ignored_paths.push(path);
        true
    }
}
