//! OpenAiApiProvider - Direct REST API implementation for OpenAI GPT.
//!
//! Calls the Chat Completions API with a system message, the conversation
//! history and the user turn.

use crate::provider::{ProviderError, ProviderRequest, ResponseProvider, http_client};
use crate::summary::summarize;
use async_trait::async_trait;
use concise_core::config::AiConfig;
use concise_core::response::AiResponse;
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";
const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const PROVIDER_NAME: &str = "OpenAI";

/// Provider implementation that talks to the OpenAI HTTP API.
#[derive(Clone)]
pub struct OpenAiApiProvider {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    max_tokens: u32,
    temperature: f32,
    short_budget: usize,
}

impl OpenAiApiProvider {
    /// Creates a new provider with the provided API key and model.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        let defaults = AiConfig::default();
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_tokens: defaults.max_output_tokens,
            temperature: defaults.temperature,
            short_budget: defaults.short_response_budget,
        }
    }

    /// Creates a provider with generation parameters and timeouts from `config`.
    ///
    /// `model` overrides `config.openai_model` when given (from secret.json).
    pub fn from_config(api_key: impl Into<String>, model: Option<&str>, config: &AiConfig) -> Self {
        let model = model.unwrap_or(config.openai_model.as_str());
        Self {
            client: http_client(config.request_timeout()),
            max_tokens: config.max_output_tokens,
            temperature: config.temperature,
            short_budget: config.short_response_budget,
            ..Self::new(api_key, model)
        }
    }

    /// Points the provider at a different server (used by tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_messages(request: &ProviderRequest) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(request.history.len() + 2);
        messages.push(ChatMessage {
            role: "system".to_string(),
            content: request.system_instruction.clone(),
        });
        messages.extend(request.history.iter().map(|entry| ChatMessage {
            role: entry.role.as_str().to_string(),
            content: entry.content.clone(),
        }));
        messages.push(ChatMessage {
            role: "user".to_string(),
            content: request.prompt(),
        });
        messages
    }

    async fn send_request(&self, body: &ChatCompletionRequest) -> Result<String, ProviderError> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let response = self
            .client
            .post(url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|err| ProviderError::transport(PROVIDER_NAME, err))?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read OpenAI error body".to_string());
            let message = serde_json::from_str::<ErrorResponse>(&body_text)
                .map(|wrapper| wrapper.error.message)
                .unwrap_or(body_text);
            return Err(ProviderError::http(PROVIDER_NAME, status, message));
        }

        let parsed: ChatCompletionResponse =
            response
                .json()
                .await
                .map_err(|err| ProviderError::MalformedResponse {
                    provider: PROVIDER_NAME.to_string(),
                    message: err.to_string(),
                })?;

        extract_text_response(parsed)
    }
}

#[async_trait]
impl ResponseProvider for OpenAiApiProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    async fn attempt(&self, request: &ProviderRequest) -> Result<AiResponse, ProviderError> {
        let body = ChatCompletionRequest {
            model: self.model.clone(),
            messages: Self::build_messages(request),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let text = self.send_request(&body).await?;
        Ok(AiResponse {
            short: summarize(&text, self.short_budget),
            expanded: text,
        })
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

fn extract_text_response(response: ChatCompletionResponse) -> Result<String, ProviderError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| ProviderError::EmptyResponse {
            provider: PROVIDER_NAME.to_string(),
        })
}
