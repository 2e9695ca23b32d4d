//! Secret configuration file storage.
//!
//! Loads API keys from ~/.config/concise/secret.json. Providers missing from
//! the file are filled in from environment variables.

use crate::paths::ConcisePaths;
use concise_core::config::{ProviderSecret, SecretConfig};
use concise_core::error::{ConciseError, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const OPENAI_MODEL_ENV: &str = "OPENAI_MODEL_NAME";
pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";
/// Key for the backup Gemini slot.
pub const GOOGLE_API_KEY_ENV: &str = "GOOGLE_API_KEY";

/// Storage for secret.json.
///
/// Responsibilities:
/// - Load secret.json and parse it into `SecretConfig`
/// - Fill providers absent from the file from the environment
///
/// Does NOT write or validate keys.
pub struct SecretStorage {
    path: PathBuf,
}

impl SecretStorage {
    /// Storage at the default path (~/.config/concise/secret.json).
    pub fn new() -> Result<Self> {
        Ok(Self {
            path: ConcisePaths::secret_file()?,
        })
    }

    /// Storage at a custom path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads secrets, falling back to the process environment.
    pub fn load(&self) -> Result<SecretConfig> {
        self.load_with_env(|name| std::env::var(name).ok())
    }

    /// Loads secrets with a custom environment lookup.
    pub fn load_with_env(&self, env: impl Fn(&str) -> Option<String>) -> Result<SecretConfig> {
        let mut secrets = self.load_file()?;

        if secrets.openai.is_none() {
            secrets.openai = env_secret(&env, OPENAI_API_KEY_ENV, Some(OPENAI_MODEL_ENV));
        }
        if secrets.gemini.is_none() {
            secrets.gemini = env_secret(&env, GEMINI_API_KEY_ENV, None);
        }
        if secrets.gemini_backup.is_none() {
            secrets.gemini_backup = env_secret(&env, GOOGLE_API_KEY_ENV, None);
        }

        tracing::info!(
            "[SecretStorage] API keys available: openai={}, gemini={}, gemini_backup={}",
            secrets.openai.is_some(),
            secrets.gemini.is_some(),
            secrets.gemini_backup.is_some()
        );
        Ok(secrets)
    }

    fn load_file(&self) -> Result<SecretConfig> {
        if !self.path.exists() {
            tracing::debug!(
                "[SecretStorage] {} not found, using environment only",
                self.path.display()
            );
            return Ok(SecretConfig::default());
        }

        let content = fs::read_to_string(&self.path)?;
        serde_json::from_str(&content).map_err(|err| {
            ConciseError::config(format!("Invalid {}: {}", self.path.display(), err))
        })
    }
}

fn env_secret(
    env: &impl Fn(&str) -> Option<String>,
    key_var: &str,
    model_var: Option<&str>,
) -> Option<ProviderSecret> {
    let api_key = env(key_var).filter(|key| !key.trim().is_empty())?;
    Some(ProviderSecret {
        api_key,
        model_name: model_var.and_then(|var| env(var)),
    })
}
