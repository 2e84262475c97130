//! LLM client used for proofreading.
//!
//! Sends a single-turn prompt to Zhipu, an OpenAI-compatible gateway, or
//! Anthropic and returns the raw text answer.

pub mod anthropic;
pub mod chat;
mod config;

use thiserror::Error;
use tracing::debug;

pub use config::{LlmConfig, LlmProvider};

use crate::http_client::{bearer_headers, retry_on_rate_limit, HttpClient};
use anthropic::{
    anthropic_headers, messages_url, AnthropicContent, AnthropicMessage, MessagesRequest,
    MessagesResponse,
};
use chat::{openai_chat_url, zhipu_chat_url, ChatMessage, ChatRequest, ChatResponse};

/// Errors that can occur during LLM operations.
#[derive(Debug, Error)]
pub enum LlmError {
    /// Provider is missing a key or endpoint
    #[error("LLM not configured: {0}")]
    NotConfigured(String),
    /// Failed to connect to LLM service
    #[error("Connection error: {0}")]
    Connection(#[from] reqwest::Error),
    /// API returned an error
    #[error("API error: {0}")]
    Api(String),
    /// Failed to parse response
    #[error("Parse error: {0}")]
    Parse(String),
    /// Too many 429 responses
    #[error("Rate limited, retry after {0:?}s")]
    RateLimited(Option<u64>),
}

/// LLM client for single-turn prompts.
pub struct LlmClient {
    config: LlmConfig,
    http: HttpClient,
}

impl LlmClient {
    /// Create a new LLM client with the given configuration.
    pub fn new(config: LlmConfig, http: HttpClient) -> Self {
        Self { config, http }
    }

    /// Get the config.
    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    /// Check whether key and endpoint are known.
    pub fn is_configured(&self) -> bool {
        self.config.effective_api_key().is_some() && self.config.effective_endpoint().is_some()
    }

    /// Send a prompt and return the model's text.
    pub async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let api_key = self.config.effective_api_key().ok_or_else(|| {
            LlmError::NotConfigured(format!(
                "no API key for provider {}",
                self.config.provider.as_str()
            ))
        })?;
        let endpoint = self.config.effective_endpoint().ok_or_else(|| {
            LlmError::NotConfigured(format!(
                "no endpoint for provider {}",
                self.config.provider.as_str()
            ))
        })?;

        debug!(
            "LLM request: provider={}, model={}, {} prompt chars",
            self.config.provider.as_str(),
            self.config.effective_model(),
            prompt.chars().count()
        );

        match self.config.provider {
            LlmProvider::Zhipu => {
                self.call_chat(&zhipu_chat_url(&endpoint), &api_key, prompt)
                    .await
            }
            LlmProvider::NewApi => {
                self.call_chat(&openai_chat_url(&endpoint), &api_key, prompt)
                    .await
            }
            LlmProvider::Anthropic => self.call_anthropic(&endpoint, &api_key, prompt).await,
        }
    }

    /// Call an OpenAI-style chat completions endpoint.
    async fn call_chat(&self, url: &str, api_key: &str, prompt: &str) -> Result<String, LlmError> {
        let request = ChatRequest {
            model: self.config.effective_model(),
            messages: vec![ChatMessage::user_text(prompt)],
            temperature: Some(self.config.temperature),
            max_tokens: Some(self.config.max_tokens),
        };
        let headers = bearer_headers(api_key);

        let resp = retry_on_rate_limit(
            "LLM",
            || async {
                self.http
                    .post_json(url, &request, &headers)
                    .await
                    .map_err(LlmError::from)
            },
            LlmError::RateLimited,
        )
        .await?;

        if !resp.is_success() {
            let status = resp.status;
            let body = resp.text().await.unwrap_or_default();
            return Err(LlmError::Api(format!("HTTP {}: {}", status, body)));
        }

        let chat: ChatResponse = resp
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        if let Some(error) = chat.error {
            return Err(LlmError::Api(error.message));
        }

        Ok(chat.first_content().unwrap_or_default().to_string())
    }

    /// Call the Anthropic Messages API.
    async fn call_anthropic(
        &self,
        endpoint: &str,
        api_key: &str,
        prompt: &str,
    ) -> Result<String, LlmError> {
        let request = MessagesRequest {
            model: self.config.effective_model(),
            max_tokens: self.config.max_tokens,
            temperature: Some(self.config.temperature),
            messages: vec![AnthropicMessage {
                role: "user".to_string(),
                content: vec![AnthropicContent::Text {
                    text: prompt.to_string(),
                }],
            }],
        };
        let url = messages_url(endpoint);
        let headers = anthropic_headers(api_key);

        let resp = retry_on_rate_limit(
            "LLM",
            || async {
                self.http
                    .post_json(&url, &request, &headers)
                    .await
                    .map_err(LlmError::from)
            },
            LlmError::RateLimited,
        )
        .await?;

        if !resp.is_success() {
            let status = resp.status;
            let body = resp.text().await.unwrap_or_default();
            return Err(LlmError::Api(format!("HTTP {}: {}", status, body)));
        }

        let messages: MessagesResponse = resp
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        if let Some(error) = messages.error {
            return Err(LlmError::Api(error.message));
        }

        Ok(messages.joined_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use axum::{http::HeaderMap, routing::post, Json, Router};
    use serde_json::{json, Value};

    async fn spawn_mock(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn http() -> HttpClient {
        HttpClient::new(Duration::from_secs(5), None).unwrap()
    }

    #[tokio::test]
    async fn test_zhipu_chat_round_trip() {
        let router = Router::new().route(
            "/api/paas/v4/chat/completions",
            post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                assert_eq!(headers["authorization"], "Bearer zk-test");
                assert_eq!(body["model"], "glm-4");
                assert_eq!(body["messages"][0]["role"], "user");
                Json(json!({"choices": [{"message": {"content": "比对完成"}}]}))
            }),
        );
        let base = spawn_mock(router).await;

        let config = LlmConfig::base_default()
            .with_endpoint(&base)
            .with_api_key("zk-test");
        let client = LlmClient::new(config, http());

        assert!(client.is_configured());
        assert_eq!(client.complete("比对这两段").await.unwrap(), "比对完成");
    }

    #[tokio::test]
    async fn test_anthropic_round_trip() {
        let router = Router::new().route(
            "/v1/messages",
            post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                assert_eq!(headers["x-api-key"], "sk-ant");
                assert_eq!(body["messages"][0]["content"][0]["type"], "text");
                Json(json!({"content": [{"type": "text", "text": "{\"suggestions\":[]}"}]}))
            }),
        );
        let base = spawn_mock(router).await;

        let config = LlmConfig::base_default()
            .with_provider(LlmProvider::Anthropic)
            .with_endpoint(&base)
            .with_api_key("sk-ant");
        let client = LlmClient::new(config, http());

        assert_eq!(client.complete("hi").await.unwrap(), "{\"suggestions\":[]}");
    }

    #[tokio::test]
    async fn test_http_error_is_api_error() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|| async { (axum::http::StatusCode::UNAUTHORIZED, "bad key") }),
        );
        let base = spawn_mock(router).await;

        let config = LlmConfig::base_default()
            .with_provider(LlmProvider::NewApi)
            .with_endpoint(&base)
            .with_api_key("sk-wrong");
        let client = LlmClient::new(config, http());

        let err = client.complete("hi").await.unwrap_err();
        assert!(matches!(err, LlmError::Api(ref msg) if msg.contains("401")));
    }

    #[tokio::test]
    async fn test_missing_key_is_not_configured() {
        let config = LlmConfig {
            api_key: None,
            ..LlmConfig::base_default()
        }
        .with_provider(LlmProvider::NewApi)
        .with_endpoint("http://127.0.0.1:9");
        // Provider env var may be set on the host; only assert when it is not
        if std::env::var("NEWAPI_API_KEY").is_err() {
            let client = LlmClient::new(config, http());
            assert!(matches!(
                client.complete("hi").await,
                Err(LlmError::NotConfigured(_))
            ));
        }
    }
}
