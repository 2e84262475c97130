//! NewAPI OCR backend.
//!
//! Routes the page through an OpenAI-compatible gateway (NewAPI, one-api)
//! to whichever vision model it serves. Retries on 429 with backoff.

use std::time::Instant;

use async_trait::async_trait;
use tracing::debug;

use super::backend::{count_visible_chars, OcrBackend, OcrBackendType, OcrError, OcrResult};
use super::config::NewApiConfig;
use super::image::ImagePayload;
use super::prompts::CLASSICAL_OCR_PROMPT;
use crate::http_client::{bearer_headers, retry_on_rate_limit, HttpClient};
use crate::llm::chat::{openai_chat_url, ChatMessage, ChatRequest, ChatResponse};

/// OpenAI-compatible gateway backend.
pub struct NewApiBackend {
    config: NewApiConfig,
    http: HttpClient,
}

impl NewApiBackend {
    pub fn new(config: NewApiConfig, http: HttpClient) -> Self {
        Self { config, http }
    }
}

#[async_trait]
impl OcrBackend for NewApiBackend {
    fn backend_type(&self) -> OcrBackendType {
        OcrBackendType::NewApi
    }

    fn display_name(&self) -> String {
        format!("NewAPI ({})", self.config.model)
    }

    fn is_available(&self) -> bool {
        self.config.api_key.is_some() && self.config.base_url.is_some()
    }

    fn availability_hint(&self) -> String {
        match (&self.config.api_key, &self.config.base_url) {
            (Some(_), Some(_)) => "NewAPI OCR is available".to_string(),
            (None, Some(_)) => "NEWAPI_API_KEY not set".to_string(),
            (Some(_), None) => "NEWAPI_BASE_URL not set".to_string(),
            (None, None) => "NEWAPI_API_KEY and NEWAPI_BASE_URL not set".to_string(),
        }
    }

    async fn recognize(&self, image: &ImagePayload) -> Result<OcrResult, OcrError> {
        let (api_key, base_url) = match (&self.config.api_key, &self.config.base_url) {
            (Some(api_key), Some(base_url)) => (api_key, base_url),
            _ => return Err(OcrError::BackendNotAvailable(self.availability_hint())),
        };
        let start = Instant::now();

        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![ChatMessage::user_image(
                image.data_url(),
                CLASSICAL_OCR_PROMPT,
            )],
            temperature: None,
            max_tokens: Some(self.config.max_tokens),
        };
        let url = openai_chat_url(base_url);
        let headers = bearer_headers(api_key);

        let response = retry_on_rate_limit(
            "NewAPI",
            || async {
                self.http
                    .post_json(&url, &request, &headers)
                    .await
                    .map_err(OcrError::from)
            },
            |retry_after_secs| OcrError::RateLimited {
                backend: OcrBackendType::NewApi,
                retry_after_secs,
            },
        )
        .await?;

        if !response.is_success() {
            let status = response.status;
            let body = response.text().await.unwrap_or_default();
            return Err(OcrError::OcrFailed(format!(
                "NewAPI请求失败: {} {}",
                status.as_u16(),
                body
            )));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| OcrError::OcrFailed(format!("Failed to parse NewAPI response: {}", e)))?;

        if let Some(error) = chat.error {
            return Err(OcrError::OcrFailed(format!("NewAPI error: {}", error.message)));
        }

        let text = chat
            .first_content()
            .filter(|t| !t.is_empty())
            .unwrap_or("识别失败")
            .to_string();
        let elapsed = start.elapsed();
        debug!("NewAPI OCR: {} chars in {:?}", text.chars().count(), elapsed);

        Ok(OcrResult {
            word_count: count_visible_chars(&text),
            text,
            confidence: None,
            processing_time_ms: elapsed.as_millis() as u64,
            engine: self.display_name(),
            model: Some(self.config.model.clone()),
        })
    }
}
