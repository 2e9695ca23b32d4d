//! Application configuration file storage (config.toml).

use crate::paths::ConcisePaths;
use concise_core::config::AppConfig;
use concise_core::error::{ConciseError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Read-only access to config.toml.
///
/// A missing file yields the defaults; a file that exists but does not
/// parse is a configuration error.
pub struct ConfigStorage {
    path: PathBuf,
}

impl ConfigStorage {
    /// Storage at the default path (~/.config/concise/config.toml).
    pub fn new() -> Result<Self> {
        Ok(Self {
            path: ConcisePaths::config_file()?,
        })
    }

    /// Storage at a custom path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn load(&self) -> Result<AppConfig> {
        if !self.path.exists() {
            tracing::debug!(
                "[ConfigStorage] {} not found, using defaults",
                self.path.display()
            );
            return Ok(AppConfig::default());
        }

        let content = fs::read_to_string(&self.path)?;
        toml::from_str(&content).map_err(|err| {
            ConciseError::config(format!("Invalid {}: {}", self.path.display(), err))
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
