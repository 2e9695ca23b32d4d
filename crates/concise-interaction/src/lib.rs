//! AI response pipeline.
//!
//! Remote providers (OpenAI, Gemini) and the local rule-based synthesizer
//! share the [`ResponseProvider`] capability. [`ResponseOrchestrator`] tries
//! them in priority order and returns the first answer.

pub mod gemini_api_provider;
pub mod local_synthesizer;
pub mod openai_api_provider;
pub mod orchestrator;
pub mod provider;
pub mod summary;

pub use gemini_api_provider::GeminiApiProvider;
pub use local_synthesizer::{LocalSynthesizer, LocalSynthesizerProvider};
pub use openai_api_provider::OpenAiApiProvider;
pub use orchestrator::{OrchestratorError, ResponseOrchestrator};
pub use provider::{ProviderError, ProviderRequest, ResponseProvider};
pub use summary::summarize;
