pub mod ask;
pub mod chat;
pub mod extract;

use anyhow::Result;
use concise_application::ChatController;
use concise_core::config::{AppConfig, SecretConfig};
use concise_core::conversation::ConversationStore;
use concise_infrastructure::{AttachmentPolicy, BatchExtractor, ConfigStorage, SecretStorage};
use concise_interaction::ResponseOrchestrator;
use std::path::PathBuf;
use std::sync::Arc;

/// Configuration loaded once at startup and handed to every command.
pub struct Settings {
    pub config: AppConfig,
    pub secrets: SecretConfig,
    pub local_only: bool,
}

impl Settings {
    pub fn load(
        config_path: Option<PathBuf>,
        secrets_path: Option<PathBuf>,
        local_only: bool,
    ) -> Result<Self> {
        let config_storage = match config_path {
            Some(path) => ConfigStorage::with_path(path),
            None => ConfigStorage::new()?,
        };
        let config = config_storage.load()?;

        let secrets = if local_only {
            SecretConfig::default()
        } else {
            let secret_storage = match secrets_path {
                Some(path) => SecretStorage::with_path(path),
                None => SecretStorage::new()?,
            };
            secret_storage.load()?
        };

        Ok(Self {
            config,
            secrets,
            local_only,
        })
    }

    pub fn orchestrator(&self) -> ResponseOrchestrator {
        if self.local_only {
            ResponseOrchestrator::local_only(&self.config.ai)
        } else {
            ResponseOrchestrator::from_config(&self.config.ai, &self.secrets)
        }
    }

    pub fn extractor(&self) -> BatchExtractor {
        BatchExtractor::from_config(&self.config.attachments)
    }

    pub fn controller(&self) -> ChatController {
        let orchestrator = self.orchestrator();
        tracing::info!(
            "[CLI] Providers: {}",
            orchestrator.provider_names().join(", ")
        );
        ChatController::new(
            ConversationStore::new(),
            Arc::new(orchestrator),
            self.extractor(),
            AttachmentPolicy::from(&self.config.attachments),
        )
    }
}
