//! ResponseOrchestrator - tries providers in priority order.

use crate::gemini_api_provider::GeminiApiProvider;
use crate::local_synthesizer::LocalSynthesizerProvider;
use crate::openai_api_provider::OpenAiApiProvider;
use crate::provider::{ProviderError, ProviderRequest, ResponseProvider};
use concise_core::config::{AiConfig, ProviderKind, SecretConfig};
use concise_core::conversation::HistoryEntry;
use concise_core::response::AiResponse;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::{Instant, timeout_at};

/// Why no answer could be produced.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrchestratorError {
    /// The remote providers did not answer before the overall deadline and
    /// no local fallback was configured.
    #[error("No response within {} seconds.", .after.as_secs())]
    Timeout {
        after: Duration,
        attempts: Vec<ProviderError>,
    },

    /// Every provider failed.
    #[error(
        "API rate limit exceeded or no working API keys. Please try again later or check your API configuration."
    )]
    Exhausted { attempts: Vec<ProviderError> },
}

impl OrchestratorError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, OrchestratorError::Timeout { .. })
    }

    /// Failures of the individual provider attempts, in order.
    pub fn attempts(&self) -> &[ProviderError] {
        match self {
            OrchestratorError::Timeout { attempts, .. }
            | OrchestratorError::Exhausted { attempts } => attempts,
        }
    }

    /// Text shown in the conversation in place of an answer.
    pub fn reply_text(&self) -> String {
        match self {
            OrchestratorError::Timeout { .. } => {
                "Sorry, the AI took too long to respond. Please try again.".to_string()
            }
            OrchestratorError::Exhausted { .. } => {
                format!("Sorry, I couldn't get a response. {self}")
            }
        }
    }
}

/// Runs a user turn through an ordered list of providers.
///
/// Remote providers share one deadline. When it passes, the remaining remote
/// providers are skipped and any local provider still answers.
pub struct ResponseOrchestrator {
    providers: Vec<Arc<dyn ResponseProvider>>,
    system_instruction: String,
    timeout: Duration,
}

impl ResponseOrchestrator {
    pub fn new(
        providers: Vec<Arc<dyn ResponseProvider>>,
        system_instruction: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            providers,
            system_instruction: system_instruction.into(),
            timeout,
        }
    }

    /// Builds the cascade from configuration.
    ///
    /// Remote providers follow `config.provider_order`; a provider without an
    /// API key is skipped. The local synthesizer is appended last when
    /// `config.local_fallback` is set.
    pub fn from_config(config: &AiConfig, secrets: &SecretConfig) -> Self {
        let mut providers: Vec<Arc<dyn ResponseProvider>> = Vec::new();

        for kind in &config.provider_order {
            let Some(secret) = secrets.for_provider(*kind) else {
                tracing::info!("[Orchestrator] {} API key available: false", kind);
                continue;
            };
            tracing::info!("[Orchestrator] {} API key available: true", kind);

            let model = secret.model_name.as_deref();
            let provider: Arc<dyn ResponseProvider> = match kind {
                ProviderKind::Openai => {
                    let provider =
                        OpenAiApiProvider::from_config(secret.api_key.clone(), model, config);
                    tracing::debug!("[Orchestrator] {} model: {}", kind, provider.model());
                    Arc::new(provider)
                }
                ProviderKind::Gemini | ProviderKind::GeminiBackup => {
                    let provider =
                        GeminiApiProvider::from_config(secret.api_key.clone(), model, config)
                            .with_name(kind.to_string());
                    tracing::debug!("[Orchestrator] {} model: {}", kind, provider.model());
                    Arc::new(provider)
                }
            };
            providers.push(provider);
        }

        if config.local_fallback {
            providers.push(Arc::new(LocalSynthesizerProvider::new()));
        }

        Self::new(
            providers,
            config.system_instruction.clone(),
            config.response_timeout(),
        )
    }

    /// Only the local synthesizer.
    pub fn local_only(config: &AiConfig) -> Self {
        Self::new(
            vec![Arc::new(LocalSynthesizerProvider::new())],
            config.system_instruction.clone(),
            config.response_timeout(),
        )
    }

    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|provider| provider.name()).collect()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns the first successful answer.
    ///
    /// Provider failures are logged and the next provider is tried. An error
    /// is returned only when every provider failed.
    pub async fn get_response(
        &self,
        user_text: &str,
        history: &[HistoryEntry],
    ) -> Result<AiResponse, OrchestratorError> {
        self.get_response_with_attachments(user_text, None, history)
            .await
    }

    /// Like `get_response`, with the formatted text of attached files.
    ///
    /// Remote providers see it appended to the prompt; the local synthesizer
    /// answers from `user_text` alone.
    pub async fn get_response_with_attachments(
        &self,
        user_text: &str,
        attachment_context: Option<&str>,
        history: &[HistoryEntry],
    ) -> Result<AiResponse, OrchestratorError> {
        let request = ProviderRequest {
            user_text: user_text.to_string(),
            attachment_context: attachment_context.map(str::to_string),
            history: history.to_vec(),
            system_instruction: self.system_instruction.clone(),
        };

        let deadline = Instant::now() + self.timeout;
        let mut attempts = Vec::new();
        let mut timed_out = false;

        for provider in &self.providers {
            let name = provider.name();

            if provider.is_remote() {
                if timed_out {
                    tracing::debug!("[Orchestrator] Skipping {} after timeout", name);
                    continue;
                }
                tracing::info!("[Orchestrator] Trying {}...", name);
                match timeout_at(deadline, provider.attempt(&request)).await {
                    Ok(Ok(response)) => {
                        tracing::info!("[Orchestrator] {} answered", name);
                        return Ok(response);
                    }
                    Ok(Err(err)) => {
                        tracing::warn!("[Orchestrator] {} failed: {}", name, err);
                        attempts.push(err);
                    }
                    Err(_) => {
                        tracing::warn!(
                            "[Orchestrator] {} timed out after {:?}",
                            name,
                            self.timeout
                        );
                        timed_out = true;
                    }
                }
            } else {
                match provider.attempt(&request).await {
                    Ok(response) => {
                        tracing::info!("[Orchestrator] Falling back to {}", name);
                        return Ok(response);
                    }
                    Err(err) => {
                        tracing::warn!("[Orchestrator] {} failed: {}", name, err);
                        attempts.push(err);
                    }
                }
            }
        }

        if timed_out {
            tracing::error!("[Orchestrator] No response within {:?}", self.timeout);
            Err(OrchestratorError::Timeout {
                after: self.timeout,
                attempts,
            })
        } else {
            tracing::error!("[Orchestrator] No working provider");
            Err(OrchestratorError::Exhausted { attempts })
        }
    }
}
