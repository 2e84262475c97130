//! Anthropic Messages API wire format.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::chat::ApiErrorBody;

/// API version header value.
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Serialize)]
pub struct MessagesRequest {
    pub model: String,
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    pub messages: Vec<AnthropicMessage>,
}

#[derive(Debug, Serialize)]
pub struct AnthropicMessage {
    pub role: String,
    pub content: Vec<AnthropicContent>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AnthropicContent {
    Text { text: String },
    Image { source: ImageSource },
}

#[derive(Debug, Serialize)]
pub struct ImageSource {
    #[serde(rename = "type")]
    pub kind: String,
    pub media_type: String,
    pub data: String,
}

#[derive(Debug, Deserialize)]
pub struct MessagesResponse {
    #[serde(default)]
    pub content: Vec<ResponseBlock>,
    pub error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
pub struct ResponseBlock {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub text: Option<String>,
}

impl MessagesResponse {
    /// All text blocks joined by newlines.
    pub fn joined_text(&self) -> String {
        self.content
            .iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text.as_deref())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Authentication and version headers.
pub fn anthropic_headers(api_key: &str) -> HashMap<String, String> {
    let mut headers = HashMap::new();
    headers.insert("x-api-key".to_string(), api_key.to_string());
    headers.insert(
        "anthropic-version".to_string(),
        ANTHROPIC_VERSION.to_string(),
    );
    headers
}

/// `{endpoint}/v1/messages`.
pub fn messages_url(endpoint: &str) -> String {
    format!("{}/v1/messages", endpoint.trim_end_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_block_shape() {
        let request = MessagesRequest {
            model: "claude-sonnet-4-20250514".to_string(),
            max_tokens: 2000,
            temperature: None,
            messages: vec![AnthropicMessage {
                role: "user".to_string(),
                content: vec![
                    AnthropicContent::Image {
                        source: ImageSource {
                            kind: "base64".to_string(),
                            media_type: "image/jpeg".to_string(),
                            data: "AAAA".to_string(),
                        },
                    },
                    AnthropicContent::Text {
                        text: "识别".to_string(),
                    },
                ],
            }],
        };

        let json = serde_json::to_value(&request).unwrap();
        let content = &json["messages"][0]["content"];
        assert_eq!(content[0]["type"], "image");
        assert_eq!(content[0]["source"]["type"], "base64");
        assert_eq!(content[0]["source"]["media_type"], "image/jpeg");
        assert_eq!(content[1]["type"], "text");
    }

    #[test]
    fn test_joined_text_skips_other_blocks() {
        let response: MessagesResponse = serde_json::from_str(
            r#"{"content":[
                {"type":"text","text":"大學之道"},
                {"type":"tool_use","id":"x"},
                {"type":"text","text":"在明明德"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(response.joined_text(), "大學之道\n在明明德");
    }

    #[test]
    fn test_headers() {
        let headers = anthropic_headers("sk-ant");
        assert_eq!(headers["x-api-key"], "sk-ant");
        assert_eq!(headers["anthropic-version"], "2023-06-01");
    }
}
