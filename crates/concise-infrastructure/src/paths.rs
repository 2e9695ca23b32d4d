//! Path management for concise configuration files.
//!
//! ```text
//! ~/.config/concise/
//! ├── config.toml     # Application configuration
//! ├── secret.json     # API keys
//! └── logs/           # Daily-rolling log files (when enabled)
//! ```

use concise_core::error::{ConciseError, Result};
use std::path::PathBuf;

const APP_DIR: &str = "concise";

/// Resolves the platform config directory (XDG on Linux).
pub struct ConcisePaths;

impl ConcisePaths {
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| ConciseError::config("Cannot find home directory"))
    }

    pub fn config_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Path to secret.json. The file should be readable by the user only.
    pub fn secret_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("secret.json"))
    }

    pub fn log_dir() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("logs"))
    }
}
