//! GeminiApiProvider - Direct REST API implementation for Gemini.
//!
//! Gemini receives a single concatenated prompt: the system instruction,
//! the history as `User:`/`Assistant:` lines and the new user turn. The key
//! travels in the query string.

use crate::provider::{ProviderError, ProviderRequest, ResponseProvider, http_client};
use crate::summary::summarize;
use async_trait::async_trait;
use concise_core::config::AiConfig;
use concise_core::response::AiResponse;
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Provider implementation that talks to the Gemini HTTP API.
#[derive(Clone)]
pub struct GeminiApiProvider {
    client: Client,
    name: String,
    api_key: String,
    model: String,
    base_url: String,
    max_output_tokens: u32,
    temperature: f32,
    short_budget: usize,
}

impl GeminiApiProvider {
    /// Creates a new provider with the provided API key and model.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        let defaults = AiConfig::default();
        Self {
            client: Client::new(),
            name: "Gemini".to_string(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_output_tokens: defaults.max_output_tokens,
            temperature: defaults.temperature,
            short_budget: defaults.short_response_budget,
        }
    }

    /// Creates a provider with generation parameters and timeouts from `config`.
    pub fn from_config(api_key: impl Into<String>, model: Option<&str>, config: &AiConfig) -> Self {
        let model = model.unwrap_or(config.gemini_model.as_str());
        Self {
            client: http_client(config.request_timeout()),
            max_output_tokens: config.max_output_tokens,
            temperature: config.temperature,
            short_budget: config.short_response_budget,
            ..Self::new(api_key, model)
        }
    }

    /// Sets the label used in logs, e.g. "Gemini (Backup)".
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Points the provider at a different server (used by tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_prompt(request: &ProviderRequest) -> String {
        let mut prompt = format!("{}\n\n", request.system_instruction);
        if !request.history.is_empty() {
            for entry in &request.history {
                prompt.push_str(&format!("{}: {}\n", entry.role.speaker(), entry.content));
            }
            prompt.push('\n');
        }
        prompt.push_str(&format!("User: {}", request.prompt()));
        prompt
    }

    async fn send_request(&self, body: &GenerateContentRequest) -> Result<String, ProviderError> {
        let url = format!(
            "{}/v1beta/models/{model}:generateContent",
            self.base_url,
            model = self.model,
        );

        let response = self
            .client
            .post(url)
            .query(&[("key", self.api_key.as_str())])
            .json(body)
            .send()
            .await
            .map_err(|err| ProviderError::transport(&self.name, err.without_url()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read Gemini error body".to_string());
            return Err(ProviderError::http(
                &self.name,
                status,
                error_message(&body_text),
            ));
        }

        let parsed: GenerateContentResponse =
            response
                .json()
                .await
                .map_err(|err| ProviderError::MalformedResponse {
                    provider: self.name.clone(),
                    message: err.without_url().to_string(),
                })?;

        extract_text_response(parsed).ok_or_else(|| ProviderError::EmptyResponse {
            provider: self.name.clone(),
        })
    }
}

#[async_trait]
impl ResponseProvider for GeminiApiProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn attempt(&self, request: &ProviderRequest) -> Result<AiResponse, ProviderError> {
        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part {
                    text: Self::build_prompt(request),
                }],
            }],
            generation_config: GenerationConfig {
                max_output_tokens: self.max_output_tokens,
                temperature: self.temperature,
            },
        };

        let text = self.send_request(&body).await?;
        Ok(AiResponse {
            short: summarize(&text, self.short_budget),
            expanded: text,
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ContentResponse>,
}

#[derive(Deserialize)]
struct ContentResponse {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Deserialize)]
struct PartResponse {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
}

fn extract_text_response(response: GenerateContentResponse) -> Option<String> {
    response
        .candidates?
        .into_iter()
        .next()?
        .content?
        .parts
        .into_iter()
        .find_map(|part| part.text)
        .filter(|text| !text.trim().is_empty())
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorWrapper>(body)
        .map(|wrapper| {
            let status_text = wrapper.error.status.unwrap_or_default();
            let msg = wrapper.error.message.unwrap_or_else(|| body.to_string());
            if status_text.is_empty() {
                msg
            } else {
                format!("{status_text}: {msg}")
            }
        })
        .unwrap_or_else(|_| body.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use concise_core::conversation::{HistoryEntry, MessageRole};

    fn request(history: Vec<HistoryEntry>) -> ProviderRequest {
        ProviderRequest {
            user_text: "What next?".to_string(),
            attachment_context: None,
            history,
            system_instruction: "SYSTEM".to_string(),
        }
    }

    #[test]
    fn test_from_config_prefers_secret_model() {
        let config = AiConfig::default();
        let provider = GeminiApiProvider::from_config("key", Some("gemini-1.5-pro"), &config);
        assert_eq!(provider.model(), "gemini-1.5-pro");

        let provider = GeminiApiProvider::from_config("key", None, &config);
        assert_eq!(provider.model(), "gemini-1.5-flash");
    }

    #[test]
    fn test_prompt_without_history() {
        assert_eq!(
            GeminiApiProvider::build_prompt(&request(Vec::new())),
            "SYSTEM\n\nUser: What next?"
        );
    }

    #[test]
    fn test_prompt_with_history() {
        let prompt = GeminiApiProvider::build_prompt(&request(vec![
            HistoryEntry::new(MessageRole::User, "hi"),
            HistoryEntry::new(MessageRole::Assistant, "hello"),
        ]));
        assert_eq!(
            prompt,
            "SYSTEM\n\nUser: hi\nAssistant: hello\n\nUser: What next?"
        );
    }

    #[test]
    fn test_error_message_uses_status_and_message() {
        let body = r#"{"error":{"code":429,"message":"quota","status":"RESOURCE_EXHAUSTED"}}"#;
        assert_eq!(error_message(body), "RESOURCE_EXHAUSTED: quota");
        assert_eq!(error_message("plain"), "plain");
    }

    #[test]
    fn test_request_body_shape() {
        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part {
                    text: "p".to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                max_output_tokens: 1500,
                temperature: 0.5,
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "p");
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 1500);
        assert_eq!(json["generationConfig"]["temperature"], 0.5);
    }
}
