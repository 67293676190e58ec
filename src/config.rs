// src/config.rs
//
// Store configuration
//
// Resolution order:
// 1. Built-in defaults (platform data directory)
// 2. Optional JSON file
// 3. CANOPY_* environment variables

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

pub const ENV_DATABASE: &str = "CANOPY_DATABASE";
pub const ENV_MAX_CONNECTIONS: &str = "CANOPY_MAX_CONNECTIONS";
pub const ENV_VERIFY: &str = "CANOPY_VERIFY";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// SQLite database file
    pub database_path: PathBuf,

    /// Pool size
    pub max_connections: u32,

    /// How long a writer waits for the write lock before failing
    pub busy_timeout_ms: u32,

    /// Re-validate the affected forest before every commit
    pub verify_after_mutation: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        let base = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
        Self {
            database_path: base.join("canopy").join("canopy.db"),
            max_connections: 15,
            busy_timeout_ms: 5000,
            verify_after_mutation: true,
        }
    }
}

impl StoreConfig {
    /// Config pointing at an explicit database file, defaults otherwise.
    pub fn with_database(path: impl Into<PathBuf>) -> Self {
        Self {
            database_path: path.into(),
            ..Self::default()
        }
    }

    /// Load defaults, then the JSON file (if given), then env overrides.
    pub fn load(file: Option<&Path>) -> AppResult<Self> {
        let mut config = match file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> AppResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: StoreConfig = serde_json::from_str(&raw)?;
        log::debug!("loaded store config from {}", path.display());
        Ok(config)
    }

    /// Apply overrides from a variable lookup (the environment in production).
    pub fn apply_overrides<F>(&mut self, lookup: F) -> AppResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(ENV_DATABASE) {
            self.database_path = PathBuf::from(path);
        }
        if let Some(raw) = lookup(ENV_MAX_CONNECTIONS) {
            self.max_connections = raw.parse().map_err(|_| {
                AppError::Config(format!("{} must be a positive integer, got '{}'", ENV_MAX_CONNECTIONS, raw))
            })?;
        }
        if let Some(raw) = lookup(ENV_VERIFY) {
            self.verify_after_mutation = match raw.to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => {
                    return Err(AppError::Config(format!(
                        "{} must be a boolean, got '{}'",
                        ENV_VERIFY, raw
                    )))
                }
            };
        }
        Ok(())
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.max_connections == 0 {
            return Err(AppError::Config("max_connections must be at least 1".to_string()));
        }
        if self.database_path.as_os_str().is_empty() {
            return Err(AppError::Config("database_path cannot be empty".to_string()));
        }
        Ok(())
    }
}
