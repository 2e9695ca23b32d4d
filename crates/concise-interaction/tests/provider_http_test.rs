//! HTTP providers against wiremock servers.

use concise_core::conversation::{HistoryEntry, MessageRole};
use concise_interaction::{ProviderError, ProviderRequest, ResponseProvider};
use serde_json::json;

fn request() -> ProviderRequest {
    ProviderRequest {
        user_text: "Explain ownership".to_string(),
        attachment_context: None,
        history: vec![
            HistoryEntry::new(MessageRole::User, "Hi"),
            HistoryEntry::new(MessageRole::Assistant, "Hello!"),
        ],
        system_instruction: "Be helpful.".to_string(),
    }
}

const LONG_ANSWER: &str = "Ownership is Rust's memory model. Every value has one owner. \
    When the owner goes out of scope the value is dropped. Borrowing lets code use a value \
    without taking ownership.";

mod openai_tests {
    use super::*;
    use concise_interaction::OpenAiApiProvider;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_openai_success_produces_short_and_expanded() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({
                "model": "gpt-3.5-turbo",
                "messages": [
                    {"role": "system", "content": "Be helpful."},
                    {"role": "user", "content": "Hi"},
                    {"role": "assistant", "content": "Hello!"},
                    {"role": "user", "content": "Explain ownership"}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": LONG_ANSWER}}]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider = OpenAiApiProvider::new("sk-test", "gpt-3.5-turbo")
            .with_base_url(mock_server.uri());
        let response = provider.attempt(&request()).await;

        assert!(response.is_ok(), "Request should succeed: {:?}", response.err());
        let response = response.unwrap();
        assert_eq!(response.expanded, LONG_ANSWER);
        assert_eq!(
            response.short,
            "Ownership is Rust's memory model. Every value has one owner. When the owner goes out of scope the value is dropped."
        );
    }

    #[tokio::test]
    async fn test_openai_rate_limit_is_retryable_http_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({
                "error": {"message": "Rate limit reached", "type": "requests"}
            })))
            .mount(&mock_server)
            .await;

        let provider = OpenAiApiProvider::new("sk-test", "gpt-3.5-turbo")
            .with_base_url(mock_server.uri());
        let err = provider.attempt(&request()).await.unwrap_err();

        assert!(err.is_retryable());
        assert_eq!(
            err,
            ProviderError::Http {
                provider: "OpenAI".to_string(),
                status: 429,
                message: "Rate limit reached".to_string(),
                is_retryable: true,
            }
        );
    }

    #[tokio::test]
    async fn test_openai_malformed_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not valid json"))
            .mount(&mock_server)
            .await;

        let provider = OpenAiApiProvider::new("sk-test", "gpt-3.5-turbo")
            .with_base_url(mock_server.uri());
        let err = provider.attempt(&request()).await.unwrap_err();

        assert!(matches!(err, ProviderError::MalformedResponse { .. }));
    }
}

mod gemini_tests {
    use super::*;
    use concise_interaction::GeminiApiProvider;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_gemini_success_sends_flattened_prompt() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-1.5-flash:generateContent"))
            .and(query_param("key", "g-test"))
            .and(body_partial_json(json!({
                "contents": [{
                    "parts": [{
                        "text": "Be helpful.\n\nUser: Hi\nAssistant: Hello!\n\nUser: Explain ownership"
                    }]
                }],
                "generationConfig": {"maxOutputTokens": 1500}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"parts": [{"text": "Short answer."}], "role": "model"}}]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider =
            GeminiApiProvider::new("g-test", "gemini-1.5-flash").with_base_url(mock_server.uri());
        let response = provider.attempt(&request()).await.unwrap();

        assert_eq!(response.short, "Short answer.");
        assert_eq!(response.expanded, "Short answer.");
    }

    #[tokio::test]
    async fn test_gemini_empty_candidates() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-1.5-flash:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"candidates": []})))
            .mount(&mock_server)
            .await;

        let provider = GeminiApiProvider::new("g-test", "gemini-1.5-flash")
            .with_name("Gemini (Backup)")
            .with_base_url(mock_server.uri());
        let err = provider.attempt(&request()).await.unwrap_err();

        assert_eq!(
            err,
            ProviderError::EmptyResponse {
                provider: "Gemini (Backup)".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_gemini_server_error_is_http_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-1.5-flash:generateContent"))
            .respond_with(ResponseTemplate::new(503).set_body_json(json!({
                "error": {"code": 503, "message": "overloaded", "status": "UNAVAILABLE"}
            })))
            .mount(&mock_server)
            .await;

        let provider =
            GeminiApiProvider::new("g-test", "gemini-1.5-flash").with_base_url(mock_server.uri());
        let err = provider.attempt(&request()).await.unwrap_err();

        match err {
            ProviderError::Http {
                status, message, ..
            } => {
                assert_eq!(status, 503);
                assert_eq!(message, "UNAVAILABLE: overloaded");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}

mod cascade_tests {
    use super::*;
    use concise_interaction::{
        GeminiApiProvider, LocalSynthesizerProvider, OpenAiApiProvider, ResponseOrchestrator,
    };
    use std::sync::Arc;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_openai_failure_falls_back_to_gemini() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": {"message": "Invalid API key"}
            })))
            .expect(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-1.5-flash:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"parts": [{"text": "From Gemini."}]}}]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let openai = OpenAiApiProvider::new("bad", "gpt-3.5-turbo").with_base_url(mock_server.uri());
        let gemini =
            GeminiApiProvider::new("good", "gemini-1.5-flash").with_base_url(mock_server.uri());
        let orchestrator = ResponseOrchestrator::new(
            vec![
                Arc::new(openai),
                Arc::new(gemini),
                Arc::new(LocalSynthesizerProvider::new()),
            ],
            "system",
            Duration::from_secs(10),
        );

        let response = orchestrator.get_response("hello there", &[]).await.unwrap();
        assert_eq!(response.expanded, "From Gemini.");
    }

    #[tokio::test]
    async fn test_all_remote_failures_use_local_answer() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let openai = OpenAiApiProvider::new("k", "gpt-3.5-turbo").with_base_url(mock_server.uri());
        let gemini = GeminiApiProvider::new("k", "gemini-1.5-flash").with_base_url(mock_server.uri());
        let orchestrator = ResponseOrchestrator::new(
            vec![
                Arc::new(openai),
                Arc::new(gemini),
                Arc::new(LocalSynthesizerProvider::new()),
            ],
            "system",
            Duration::from_secs(10),
        );

        let response = orchestrator
            .get_response("what is the capital of france", &[])
            .await
            .unwrap();
        assert!(response.short.contains("Paris"));
    }
}
