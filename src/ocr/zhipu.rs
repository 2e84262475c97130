//! Zhipu GLM-4V OCR backend.
//!
//! Uses the OpenAI-style chat completions endpoint with an `image_url` part.
//! The API reports no confidence, so a fixed configured value is returned.

use std::time::Instant;

use async_trait::async_trait;
use tracing::debug;

use super::backend::{count_visible_chars, OcrBackend, OcrBackendType, OcrError, OcrResult};
use super::config::ZhipuConfig;
use super::image::ImagePayload;
use super::prompts::CLASSICAL_OCR_PROMPT;
use crate::http_client::{bearer_headers, HttpClient};
use crate::llm::chat::{zhipu_chat_url, ChatMessage, ChatRequest, ChatResponse};

/// Zhipu GLM-4V backend.
pub struct ZhipuBackend {
    config: ZhipuConfig,
    http: HttpClient,
}

impl ZhipuBackend {
    pub fn new(config: ZhipuConfig, http: HttpClient) -> Self {
        Self { config, http }
    }
}

#[async_trait]
impl OcrBackend for ZhipuBackend {
    fn backend_type(&self) -> OcrBackendType {
        OcrBackendType::Zhipu
    }

    fn display_name(&self) -> String {
        "智谱AI (GLM-4V)".to_string()
    }

    fn is_available(&self) -> bool {
        self.config.api_key.is_some()
    }

    fn availability_hint(&self) -> String {
        if self.is_available() {
            "Zhipu OCR is available".to_string()
        } else {
            "ZHIPU_API_KEY not set. Get an API key from https://open.bigmodel.cn/".to_string()
        }
    }

    async fn recognize(&self, image: &ImagePayload) -> Result<OcrResult, OcrError> {
        let api_key = self.config.api_key.as_deref().ok_or_else(|| {
            OcrError::BackendNotAvailable(self.availability_hint())
        })?;
        let start = Instant::now();

        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![ChatMessage::user_image(
                image.data_url(),
                CLASSICAL_OCR_PROMPT,
            )],
            temperature: None,
            max_tokens: None,
        };

        let response = self
            .http
            .post_json(
                &zhipu_chat_url(&self.config.endpoint),
                &request,
                &bearer_headers(api_key),
            )
            .await?;

        if response.is_rate_limited() {
            let retry_after_secs = response.retry_after().and_then(|s| s.trim().parse().ok());
            return Err(OcrError::RateLimited {
                backend: OcrBackendType::Zhipu,
                retry_after_secs,
            });
        }

        if !response.is_success() {
            return Err(OcrError::OcrFailed(format!(
                "智谱AI请求失败: {}",
                response.status.as_u16()
            )));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| OcrError::OcrFailed(format!("Failed to parse Zhipu response: {}", e)))?;

        let text = chat
            .first_content()
            .filter(|t| !t.is_empty())
            .unwrap_or("识别失败")
            .to_string();
        let elapsed = start.elapsed();
        debug!("Zhipu OCR: {} chars in {:?}", text.chars().count(), elapsed);

        Ok(OcrResult {
            word_count: count_visible_chars(&text),
            text,
            confidence: Some(self.config.confidence),
            processing_time_ms: elapsed.as_millis() as u64,
            engine: self.display_name(),
            model: Some(self.config.model.clone()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use axum::{http::HeaderMap, http::StatusCode, routing::post, Json, Router};
    use serde_json::{json, Value};

    async fn spawn_mock(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn backend(endpoint: &str) -> ZhipuBackend {
        let config = ZhipuConfig {
            api_key: Some("zk-test".to_string()),
            endpoint: endpoint.to_string(),
            model: "glm-4v".to_string(),
            confidence: 0.82,
        };
        ZhipuBackend::new(config, HttpClient::new(Duration::from_secs(5), None).unwrap())
    }

    fn image() -> ImagePayload {
        ImagePayload::parse("data:image/jpeg;base64,/9j/4AAQ").unwrap()
    }

    #[tokio::test]
    async fn test_recognize_sends_image_url_first() {
        let router = Router::new().route(
            "/api/paas/v4/chat/completions",
            post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                assert_eq!(headers["authorization"], "Bearer zk-test");
                assert_eq!(body["model"], "glm-4v");
                let content = &body["messages"][0]["content"];
                assert_eq!(content[0]["type"], "image_url");
                assert!(content[0]["image_url"]["url"]
                    .as_str()
                    .unwrap()
                    .starts_with("data:image/jpeg;base64,"));
                assert_eq!(content[1]["type"], "text");
                Json(json!({"choices": [{"message": {"content": "天地玄黃 宇宙洪荒"}}]}))
            }),
        );
        let base = spawn_mock(router).await;

        let result = backend(&base).recognize(&image()).await.unwrap();
        assert_eq!(result.text, "天地玄黃 宇宙洪荒");
        assert_eq!(result.word_count, 8);
        assert_eq!(result.confidence, Some(0.82));
        assert_eq!(result.engine, "智谱AI (GLM-4V)");
    }

    #[tokio::test]
    async fn test_missing_content_reads_as_failure_text() {
        let router = Router::new().route(
            "/api/paas/v4/chat/completions",
            post(|| async { Json(json!({"choices": []})) }),
        );
        let base = spawn_mock(router).await;

        let result = backend(&base).recognize(&image()).await.unwrap();
        assert_eq!(result.text, "识别失败");
    }

    #[tokio::test]
    async fn test_http_error_names_status() {
        let router = Router::new().route(
            "/api/paas/v4/chat/completions",
            post(|| async { StatusCode::UNAUTHORIZED }),
        );
        let base = spawn_mock(router).await;

        let err = backend(&base).recognize(&image()).await.unwrap_err();
        assert_eq!(err.to_string(), "智谱AI请求失败: 401");
    }
}
