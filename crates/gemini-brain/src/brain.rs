//! GeminiBrain implementation using the OpenAI-compatible endpoint.

use brain_core::{async_trait, Brain, BrainError};
use reqwest::Client;
use tracing::{debug, info};

use crate::api_types::{ApiError, ChatCompletionRequest, ChatCompletionResponse, ChatMessage};
use crate::config::GeminiBrainConfig;

/// A stateless completion backend talking to a hosted Gemini model.
///
/// Every call is independent: one user message out, one completion back.
pub struct GeminiBrain {
    client: Client,
    config: GeminiBrainConfig,
}

impl GeminiBrain {
    /// Create a new GeminiBrain with the given configuration.
    pub fn new(config: GeminiBrainConfig) -> Result<Self, BrainError> {
        if config.api_key.trim().is_empty() {
            return Err(BrainError::Configuration("API key is empty".to_string()));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| BrainError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        info!(
            "GeminiBrain initialized with model: {}, timeout: {:?}",
            config.model, config.timeout
        );

        Ok(Self { client, config })
    }

    /// Create a GeminiBrain from environment variables.
    ///
    /// See [`GeminiBrainConfig::from_env`] for required environment variables.
    pub fn from_env() -> Result<Self, BrainError> {
        let config = GeminiBrainConfig::from_env()?;
        Self::new(config)
    }

    /// Get the configuration.
    pub fn config(&self) -> &GeminiBrainConfig {
        &self.config
    }

    /// Make a chat completion request.
    async fn chat_completion(
        &self,
        messages: Vec<ChatMessage>,
    ) -> Result<ChatCompletionResponse, BrainError> {
        let url = self.config.completions_url();

        let request = ChatCompletionRequest {
            model: self.config.model.clone(),
            messages,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            stream: false,
        };

        debug!(model = %request.model, "Sending chat completion request");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    BrainError::Timeout
                } else {
                    BrainError::Network(format!("Failed to send request: {}", e))
                }
            })?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();

            // Try to parse as API error
            let detail = serde_json::from_str::<ApiError>(&error_text)
                .ok()
                .and_then(|api_error| api_error.message().map(str::to_string))
                .unwrap_or(error_text);

            return Err(BrainError::ProcessingFailed(format!(
                "API error ({}): {}",
                status.as_u16(),
                detail
            )));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| BrainError::ProcessingFailed(format!("Failed to parse response: {}", e)))?;

        Ok(completion)
    }
}

#[async_trait]
impl Brain for GeminiBrain {
    async fn complete(&self, prompt: &str) -> Result<String, BrainError> {
        let completion = self.chat_completion(vec![ChatMessage::user(prompt)]).await?;

        debug!(
            response_id = completion.id.as_deref().unwrap_or("-"),
            model = completion.model.as_deref().unwrap_or("-"),
            "Completion received"
        );

        // Log usage if available
        if let Some(usage) = &completion.usage {
            debug!(
                "Token usage - prompt: {}, completion: {}, total: {}",
                usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
            );
        }

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| BrainError::ProcessingFailed("empty completion".to_string()))
    }

    fn name(&self) -> &str {
        "GeminiBrain"
    }

    async fn is_ready(&self) -> bool {
        !self.config.api_key.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use axum::extract::State;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};

    use super::*;

    #[derive(Clone)]
    struct Upstream {
        status: StatusCode,
        body: Value,
        seen: Arc<Mutex<Vec<(Option<String>, Value)>>>,
    }

    async fn completions(
        State(upstream): State<Upstream>,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> (StatusCode, Json<Value>) {
        let auth = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        upstream.seen.lock().unwrap().push((auth, body));
        (upstream.status, Json(upstream.body.clone()))
    }

    /// Serve a fake completions endpoint and return a brain pointed at it.
    async fn fake_upstream(status: StatusCode, body: Value) -> (GeminiBrain, Upstream) {
        let upstream = Upstream {
            status,
            body,
            seen: Arc::new(Mutex::new(Vec::new())),
        };
        let app = Router::new()
            .route("/v1/chat/completions", post(completions))
            .with_state(upstream.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let config = GeminiBrainConfig::builder()
            .api_key("test-key")
            .api_url(format!("http://{}/v1", addr))
            .timeout(Duration::from_secs(5))
            .build();

        (GeminiBrain::new(config).unwrap(), upstream)
    }

    #[test]
    fn test_brain_name() {
        let config = GeminiBrainConfig::builder().api_key("test-key").build();

        let brain = GeminiBrain::new(config).unwrap();
        assert_eq!(brain.name(), "GeminiBrain");
    }

    #[test]
    fn test_empty_api_key_rejected() {
        let result = GeminiBrain::new(GeminiBrainConfig::default());
        assert!(matches!(result, Err(BrainError::Configuration(_))));
    }

    #[tokio::test]
    async fn test_complete_sends_single_user_message() {
        let (brain, upstream) = fake_upstream(
            StatusCode::OK,
            json!({
                "choices": [{"index": 0, "message": {"role": "assistant", "content": "[1]"}, "finish_reason": "stop"}],
                "usage": {"prompt_tokens": 10, "completion_tokens": 2, "total_tokens": 12}
            }),
        )
        .await;

        let reply = brain.complete("rank these").await.unwrap();
        assert_eq!(reply, "[1]");

        let seen = upstream.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        let (auth, body) = &seen[0];
        assert_eq!(auth.as_deref(), Some("Bearer test-key"));
        assert_eq!(body["model"], "gemini-2.5-flash");
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
        assert_eq!(body["messages"][0]["content"], "rank these");
        assert_eq!(body["stream"], false);
    }

    #[tokio::test]
    async fn test_upstream_error_maps_to_processing_failed() {
        let (brain, _) = fake_upstream(
            StatusCode::TOO_MANY_REQUESTS,
            json!([{"error": {"message": "Resource exhausted", "status": "RESOURCE_EXHAUSTED"}}]),
        )
        .await;

        match brain.complete("hi").await {
            Err(BrainError::ProcessingFailed(msg)) => {
                assert!(msg.contains("429"));
                assert!(msg.contains("Resource exhausted"));
            }
            other => panic!("Expected ProcessingFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_choice_is_an_error() {
        let (brain, _) = fake_upstream(
            StatusCode::OK,
            json!({"choices": [{"message": {"role": "assistant", "content": null}}]}),
        )
        .await;

        assert!(matches!(
            brain.complete("hi").await,
            Err(BrainError::ProcessingFailed(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_upstream_is_network_error() {
        let config = GeminiBrainConfig::builder()
            .api_key("test-key")
            .api_url("http://127.0.0.1:1")
            .timeout(Duration::from_secs(2))
            .build();
        let brain = GeminiBrain::new(config).unwrap();

        assert!(matches!(
            brain.complete("hi").await,
            Err(BrainError::Network(_)) | Err(BrainError::Timeout)
        ));
    }
}
