//! Configuration model.
//!
//! `AppConfig` is read from `config.toml`, `SecretConfig` from `secret.json`.
//! Both are loaded once at startup and handed to the components that need
//! them; nothing reads configuration from global state.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

pub const DEFAULT_SYSTEM_INSTRUCTION: &str = "You are a helpful AI assistant. Provide comprehensive, detailed answers that thoroughly explain concepts. Include examples, step-by-step explanations, and relevant details. Your responses should be educational and informative, similar to ChatGPT.";

/// 10 MiB.
pub const DEFAULT_MAX_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;

/// Identifies a remote provider slot in `AiConfig::provider_order`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    Openai,
    Gemini,
    GeminiBackup,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ProviderKind::Openai => "OpenAI",
            ProviderKind::Gemini => "Gemini (Primary)",
            ProviderKind::GeminiBackup => "Gemini (Backup)",
        };
        f.write_str(label)
    }
}

/// Root of `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub ai: AiConfig,
    #[serde(default)]
    pub attachments: AttachmentConfig,
}

/// AI pipeline settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Remote providers in the order they are tried.
    pub provider_order: Vec<ProviderKind>,
    pub openai_model: String,
    pub gemini_model: String,
    pub max_output_tokens: u32,
    pub temperature: f32,
    /// Deadline for a single HTTP request.
    pub request_timeout_secs: u64,
    /// Deadline for the whole provider cascade.
    pub response_timeout_secs: u64,
    /// Append the local synthesizer after the remote providers.
    pub local_fallback: bool,
    /// Character budget of the short synopsis.
    pub short_response_budget: usize,
    pub system_instruction: String,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            provider_order: vec![
                ProviderKind::Openai,
                ProviderKind::Gemini,
                ProviderKind::GeminiBackup,
            ],
            openai_model: "gpt-3.5-turbo".to_string(),
            gemini_model: "gemini-1.5-flash".to_string(),
            max_output_tokens: 1500,
            temperature: 0.7,
            request_timeout_secs: 30,
            response_timeout_secs: 45,
            local_fallback: true,
            short_response_budget: 150,
            system_instruction: DEFAULT_SYSTEM_INSTRUCTION.to_string(),
        }
    }
}

impl AiConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn response_timeout(&self) -> Duration {
        Duration::from_secs(self.response_timeout_secs)
    }
}

/// Attachment acceptance settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttachmentConfig {
    pub max_file_size_bytes: u64,
    /// Deadline for extracting every attachment of one send.
    pub batch_timeout_secs: u64,
}

impl Default for AttachmentConfig {
    fn default() -> Self {
        Self {
            max_file_size_bytes: DEFAULT_MAX_FILE_SIZE_BYTES,
            batch_timeout_secs: 15,
        }
    }
}

impl AttachmentConfig {
    pub fn batch_timeout(&self) -> Duration {
        Duration::from_secs(self.batch_timeout_secs)
    }
}

/// Root configuration structure for secret.json
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SecretConfig {
    #[serde(default)]
    pub openai: Option<ProviderSecret>,
    #[serde(default)]
    pub gemini: Option<ProviderSecret>,
    #[serde(default)]
    pub gemini_backup: Option<ProviderSecret>,
}

impl SecretConfig {
    pub fn for_provider(&self, kind: ProviderKind) -> Option<&ProviderSecret> {
        match kind {
            ProviderKind::Openai => self.openai.as_ref(),
            ProviderKind::Gemini => self.gemini.as_ref(),
            ProviderKind::GeminiBackup => self.gemini_backup.as_ref(),
        }
        .filter(|secret| !secret.api_key.trim().is_empty())
    }
}

/// API credentials for one provider.
#[derive(Clone, Deserialize)]
pub struct ProviderSecret {
    pub api_key: String,
    #[serde(default)]
    pub model_name: Option<String>,
}

// Keys must never reach the logs.
impl fmt::Debug for ProviderSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderSecret")
            .field("api_key", &"<redacted>")
            .field("model_name", &self.model_name)
            .finish()
    }
}
