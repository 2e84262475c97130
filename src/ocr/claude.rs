//! Claude vision OCR backend.
//!
//! Sends the page as a base64 image block followed by the recognition
//! prompt to the Anthropic Messages API.
//! Requires ANTHROPIC_API_KEY.

use std::time::Instant;

use async_trait::async_trait;
use tracing::debug;

use super::backend::{count_visible_chars, OcrBackend, OcrBackendType, OcrError, OcrResult};
use super::config::ClaudeConfig;
use super::image::ImagePayload;
use super::prompts::CLASSICAL_OCR_PROMPT;
use crate::http_client::HttpClient;
use crate::llm::anthropic::{
    anthropic_headers, messages_url, AnthropicContent, AnthropicMessage, ImageSource,
    MessagesRequest, MessagesResponse,
};

/// Claude vision backend.
pub struct ClaudeBackend {
    config: ClaudeConfig,
    http: HttpClient,
}

impl ClaudeBackend {
    pub fn new(config: ClaudeConfig, http: HttpClient) -> Self {
        Self { config, http }
    }
}

#[async_trait]
impl OcrBackend for ClaudeBackend {
    fn backend_type(&self) -> OcrBackendType {
        OcrBackendType::Claude
    }

    fn display_name(&self) -> String {
        "Claude".to_string()
    }

    fn is_available(&self) -> bool {
        self.config.api_key.is_some()
    }

    fn availability_hint(&self) -> String {
        if self.is_available() {
            "Claude OCR is available".to_string()
        } else {
            "ANTHROPIC_API_KEY not set. Get an API key from https://console.anthropic.com/"
                .to_string()
        }
    }

    async fn recognize(&self, image: &ImagePayload) -> Result<OcrResult, OcrError> {
        let api_key = self.config.api_key.as_deref().ok_or_else(|| {
            OcrError::BackendNotAvailable(self.availability_hint())
        })?;
        let start = Instant::now();

        let request = MessagesRequest {
            model: self.config.model.clone(),
            max_tokens: self.config.max_tokens,
            temperature: None,
            messages: vec![AnthropicMessage {
                role: "user".to_string(),
                content: vec![
                    AnthropicContent::Image {
                        source: ImageSource {
                            kind: "base64".to_string(),
                            media_type: image.media_type.clone(),
                            data: image.base64.clone(),
                        },
                    },
                    AnthropicContent::Text {
                        text: CLASSICAL_OCR_PROMPT.to_string(),
                    },
                ],
            }],
        };

        let response = self
            .http
            .post_json(
                &messages_url(&self.config.endpoint),
                &request,
                &anthropic_headers(api_key),
            )
            .await?;

        if response.is_rate_limited() {
            let retry_after_secs = response.retry_after().and_then(|s| s.trim().parse().ok());
            return Err(OcrError::RateLimited {
                backend: OcrBackendType::Claude,
                retry_after_secs,
            });
        }

        if !response.is_success() {
            let status = response.status;
            let body = response.text().await.unwrap_or_default();
            return Err(OcrError::OcrFailed(format!(
                "Claude API error: HTTP {}: {}",
                status.as_u16(),
                body
            )));
        }

        let messages: MessagesResponse = response
            .json()
            .await
            .map_err(|e| OcrError::OcrFailed(format!("Failed to parse Claude response: {}", e)))?;

        if let Some(error) = messages.error {
            return Err(OcrError::OcrFailed(format!("Claude API error: {}", error.message)));
        }

        let text = messages.joined_text();
        let elapsed = start.elapsed();
        debug!("Claude OCR: {} chars in {:?}", text.chars().count(), elapsed);

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
