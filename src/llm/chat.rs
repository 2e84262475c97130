//! OpenAI-style chat completions wire format.
//!
//! Zhipu's `/api/paas/v4/chat/completions` and NewAPI gateways both speak this
//! dialect, for text prompts and for image + text prompts alike.

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: ChatContent,
}

impl ChatMessage {
    /// Plain text user message.
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: ChatContent::Text(text.into()),
        }
    }

    /// User message carrying an image followed by an instruction.
    pub fn user_image(data_url: String, text: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: ChatContent::Parts(vec![
                ContentPart::ImageUrl {
                    image_url: ImageUrl { url: data_url },
                },
                ContentPart::Text { text: text.into() },
            ]),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ChatContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum ContentPart {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "image_url")]
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
pub struct ImageUrl {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
    pub error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
}

/// Error object returned by OpenAI-style and Anthropic APIs.
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub message: String,
}

impl ChatResponse {
    /// Content of the first choice, if any.
    pub fn first_content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
    }
}

/// `{base}/v1/chat/completions` for OpenAI-compatible gateways.
pub fn openai_chat_url(base_url: &str) -> String {
    let base = base_url.trim_end_matches('/');
    if base.ends_with("/v1") {
        format!("{}/chat/completions", base)
    } else {
        format!("{}/v1/chat/completions", base)
    }
}

/// Zhipu's chat completions path.
pub fn zhipu_chat_url(endpoint: &str) -> String {
    format!(
        "{}/api/paas/v4/chat/completions",
        endpoint.trim_end_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_message_shape() {
        let request = ChatRequest {
            model: "glm-4v".to_string(),
            messages: vec![ChatMessage::user_image(
                "data:image/jpeg;base64,AAAA".to_string(),
                "识别",
            )],
            temperature: None,
            max_tokens: None,
        };

        let json = serde_json::to_value(&request).unwrap();
        let content = &json["messages"][0]["content"];
        assert_eq!(content[0]["type"], "image_url");
        assert_eq!(content[0]["image_url"]["url"], "data:image/jpeg;base64,AAAA");
        assert_eq!(content[1]["type"], "text");
        assert_eq!(content[1]["text"], "识别");
        assert!(json.get("temperature").is_none());
    }

    #[test]
    fn test_text_message_is_plain_string() {
        let message = ChatMessage::user_text("比对");
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["content"], "比对");
        assert_eq!(json["role"], "user");
    }

    #[test]
    fn test_first_content_tolerates_missing_fields() {
        let response: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert_eq!(response.first_content(), None);

        let response: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":"天下"}}]}"#).unwrap();
        assert_eq!(response.first_content(), Some("天下"));

        let response: ChatResponse =
            serde_json::from_str(r#"{"error":{"message":"invalid key"}}"#).unwrap();
        assert_eq!(response.error.unwrap().message, "invalid key");
    }

    #[test]
    fn test_chat_urls() {
        assert_eq!(
            openai_chat_url("https://gateway.example.com/"),
            "https://gateway.example.com/v1/chat/completions"
        );
        assert_eq!(
            openai_chat_url("https://gateway.example.com/v1"),
            "https://gateway.example.com/v1/chat/completions"
        );
        assert_eq!(
            zhipu_chat_url("https://open.bigmodel.cn"),
            "https://open.bigmodel.cn/api/paas/v4/chat/completions"
        );
    }
}
