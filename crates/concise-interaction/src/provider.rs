//! The capability every response source implements.

use async_trait::async_trait;
use concise_core::conversation::HistoryEntry;
use concise_core::response::AiResponse;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;

/// Everything a provider needs to answer one user turn.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderRequest {
    /// What the user typed
    pub user_text: String,
    /// Extracted text of the attached files, already formatted
    pub attachment_context: Option<String>,
    /// Prior turns, oldest first
    pub history: Vec<HistoryEntry>,
    pub system_instruction: String,
}

impl ProviderRequest {
    /// The text sent to remote models: the typed text followed by the
    /// attachment section, if any.
    pub fn prompt(&self) -> String {
        match &self.attachment_context {
            Some(context) => format!("{}\n\nAttached files:\n\n{}", self.user_text, context),
            None => self.user_text.clone(),
        }
    }
}

/// Why a single provider attempt failed.
///
/// These never reach the user directly; the orchestrator logs them and
/// moves on to the next provider.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("{provider} request failed: {message}")]
    Transport {
        provider: String,
        message: String,
        is_retryable: bool,
    },

    #[error("{provider} API error {status}: {message}")]
    Http {
        provider: String,
        status: u16,
        message: String,
        is_retryable: bool,
    },

    #[error("Failed to parse {provider} response: {message}")]
    MalformedResponse { provider: String, message: String },

    #[error("{provider} returned no text")]
    EmptyResponse { provider: String },
}

impl ProviderError {
    pub fn provider(&self) -> &str {
        match self {
            ProviderError::Transport { provider, .. }
            | ProviderError::Http { provider, .. }
            | ProviderError::MalformedResponse { provider, .. }
            | ProviderError::EmptyResponse { provider } => provider,
        }
    }

    /// Whether the same request could succeed later (rate limits, outages).
    pub fn is_retryable(&self) -> bool {
        match self {
            ProviderError::Transport { is_retryable, .. }
            | ProviderError::Http { is_retryable, .. } => *is_retryable,
            _ => false,
        }
    }

    pub(crate) fn transport(provider: &str, err: reqwest::Error) -> Self {
        ProviderError::Transport {
            provider: provider.to_string(),
            message: err.to_string(),
            is_retryable: err.is_connect() || err.is_timeout(),
        }
    }

    pub(crate) fn http(provider: &str, status: StatusCode, message: String) -> Self {
        let is_retryable = matches!(
            status,
            StatusCode::TOO_MANY_REQUESTS
                | StatusCode::INTERNAL_SERVER_ERROR
                | StatusCode::BAD_GATEWAY
                | StatusCode::SERVICE_UNAVAILABLE
                | StatusCode::GATEWAY_TIMEOUT
        );
        ProviderError::Http {
            provider: provider.to_string(),
            status: status.as_u16(),
            message,
            is_retryable,
        }
    }
}

/// A source of answers: a remote AI API or the local synthesizer.
#[async_trait]
pub trait ResponseProvider: Send + Sync {
    /// Human-readable name used in logs.
    fn name(&self) -> &str;

    /// Remote providers talk to the network; the local synthesizer does not.
    fn is_remote(&self) -> bool {
        true
    }

    async fn attempt(&self, request: &ProviderRequest) -> Result<AiResponse, ProviderError>;
}

/// Builds an HTTP client whose requests give up after `timeout`.
pub(crate) fn http_client(timeout: Duration) -> Client {
    Client::builder().timeout(timeout).build().unwrap_or_else(|err| {
        tracing::warn!("[Provider] Falling back to default HTTP client: {}", err);
        Client::new()
    })
}
