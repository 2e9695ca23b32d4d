//! Keyword-driven responder used when no remote provider answers.
//!
//! Rules are tried in a fixed order and the first one that matches produces
//! the answer; see [`rules::RULES`]. Matching is plain substring/regex
//! matching on the lowercased input, so e.g. "ai" also matches inside words.

mod knowledge;
mod rules;

use crate::provider::{ProviderError, ProviderRequest, ResponseProvider};
use async_trait::async_trait;
use concise_core::conversation::HistoryEntry;
use concise_core::response::AiResponse;
use rules::{Query, RULES};

/// Stateless rule-based synthesizer.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalSynthesizer;

impl LocalSynthesizer {
    pub fn new() -> Self {
        Self
    }

    /// Produces a canned answer for `text`. Never fails.
    pub fn synthesize(&self, text: &str, history: &[HistoryEntry]) -> AiResponse {
        let query = Query::new(text, history);

        for (name, rule) in RULES {
            if let Some(response) = rule(&query) {
                tracing::debug!("[LocalSynthesizer] Matched rule '{}'", name);
                return response;
            }
        }

        tracing::debug!("[LocalSynthesizer] No rule matched, using generic answer");
        rules::generic(&query)
    }
}

/// [`LocalSynthesizer`] as the last entry of a provider cascade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalSynthesizerProvider {
    synthesizer: LocalSynthesizer,
}

impl LocalSynthesizerProvider {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ResponseProvider for LocalSynthesizerProvider {
    fn name(&self) -> &str {
        "Local"
    }

    fn is_remote(&self) -> bool {
        false
    }

    async fn attempt(&self, request: &ProviderRequest) -> Result<AiResponse, ProviderError> {
        Ok(self
            .synthesizer
            .synthesize(&request.user_text, &request.history))
    }
}
