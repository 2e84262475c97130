//! OCR provider configuration.
//!
//! Each provider section reads its credentials from the environment by
//! default, so a config file only needs to mention what it overrides.

use serde::{Deserialize, Serialize};

use super::backend::OcrBackendType;

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

/// Anthropic Claude vision configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClaudeConfig {
    /// API key (`ANTHROPIC_API_KEY`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// API base URL, without `/v1/messages`.
    pub endpoint: String,
    /// Model name.
    pub model: String,
    /// Maximum tokens in the response.
    pub max_tokens: u32,
}

impl Default for ClaudeConfig {
    fn default() -> Self {
        Self {
            api_key: env_var("ANTHROPIC_API_KEY"),
            endpoint: env_var("ANTHROPIC_ENDPOINT")
                .unwrap_or_else(|| "https://api.anthropic.com".to_string()),
            model: env_var("ANTHROPIC_MODEL")
                .unwrap_or_else(|| "claude-sonnet-4-20250514".to_string()),
            max_tokens: 2000,
        }
    }
}

/// Zhipu GLM-4V configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZhipuConfig {
    /// API key (`ZHIPU_API_KEY`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// API base URL, without `/api/paas/v4/chat/completions`.
    pub endpoint: String,
    /// Vision model name.
    pub model: String,
    /// Confidence reported for results (the API does not return one).
    pub confidence: f32,
}

impl Default for ZhipuConfig {
    fn default() -> Self {
        Self {
            api_key: env_var("ZHIPU_API_KEY"),
            endpoint: env_var("ZHIPU_ENDPOINT")
                .unwrap_or_else(|| "https://open.bigmodel.cn".to_string()),
            model: env_var("ZHIPU_OCR_MODEL").unwrap_or_else(|| "glm-4v".to_string()),
            confidence: 0.82,
        }
    }
}

/// Baidu accurate OCR configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaiduConfig {
    /// API key (`BAIDU_API_KEY`), used as OAuth client id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Secret key (`BAIDU_SECRET_KEY`), used as OAuth client secret.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_key: Option<String>,
    /// OAuth token endpoint.
    pub token_url: String,
    /// Recognition endpoint.
    pub ocr_url: String,
    /// Horizontal distance (px) under which two lines count as one column.
    pub column_tolerance: i64,
}

impl Default for BaiduConfig {
    fn default() -> Self {
        Self {
            api_key: env_var("BAIDU_API_KEY"),
            secret_key: env_var("BAIDU_SECRET_KEY"),
            token_url: "https://aip.baidubce.com/oauth/2.0/token".to_string(),
            ocr_url: "https://aip.baidubce.com/rest/2.0/ocr/v1/accurate".to_string(),
            column_tolerance: 50,
        }
    }
}

/// OpenAI-compatible gateway (NewAPI, one-api and friends).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewApiConfig {
    /// API key (`NEWAPI_API_KEY`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Gateway base URL (`NEWAPI_BASE_URL`), without `/v1/chat/completions`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Vision-capable model routed by the gateway (`NEWAPI_MODEL`).
    pub model: String,
    /// Maximum tokens in the response.
    pub max_tokens: u32,
}

impl Default for NewApiConfig {
    fn default() -> Self {
        Self {
            api_key: env_var("NEWAPI_API_KEY"),
            base_url: env_var("NEWAPI_BASE_URL"),
            model: env_var("NEWAPI_MODEL").unwrap_or_else(|| "gpt-4o".to_string()),
            max_tokens: 4096,
        }
    }
}

/// OCR section of the config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Engine used by `/api/ocr` when the request names none.
    pub default_engine: OcrBackendType,
    pub claude: ClaudeConfig,
    pub zhipu: ZhipuConfig,
    pub baidu: BaiduConfig,
    pub newapi: NewApiConfig,
}

impl Default for OcrConfig {
    fn default() -> Self {
        let default_engine = env_var("GUJIFLOW_DEFAULT_ENGINE")
            .and_then(|s| OcrBackendType::from_str(&s))
            .unwrap_or_default();

        Self {
            default_engine,
            claude: ClaudeConfig::default(),
            zhipu: ZhipuConfig::default(),
            baidu: BaiduConfig::default(),
            newapi: NewApiConfig::default(),
        }
    }
}

impl OcrConfig {
    /// Copy of this config with every credential masked.
    pub fn redacted(&self) -> Self {
        let mask = |v: &Option<String>| v.as_ref().map(|_| "***".to_string());
        let mut config = self.clone();
        config.claude.api_key = mask(&self.claude.api_key);
        config.zhipu.api_key = mask(&self.zhipu.api_key);
        config.baidu.api_key = mask(&self.baidu.api_key);
        config.baidu.secret_key = mask(&self.baidu.secret_key);
        config.newapi.api_key = mask(&self.newapi.api_key);
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = OcrConfig::default();
        assert_eq!(config.baidu.column_tolerance, 50);
        assert_eq!(config.claude.max_tokens, 2000);
        assert!((config.zhipu.confidence - 0.82).abs() < f32::EPSILON);
    }

    #[test]
    fn test_redacted_masks_keys() {
        let mut config = OcrConfig::default();
        config.claude.api_key = Some("sk-ant-secret".to_string());
        config.baidu.secret_key = Some("baidu-secret".to_string());
        config.newapi.api_key = None;

        let redacted = config.redacted();
        assert_eq!(redacted.claude.api_key.as_deref(), Some("***"));
        assert_eq!(redacted.baidu.secret_key.as_deref(), Some("***"));
        assert_eq!(redacted.newapi.api_key, None);
        assert_eq!(redacted.claude.model, config.claude.model);
    }

    #[test]
    fn test_partial_toml_keeps_other_defaults() {
        let config: OcrConfig = toml::from_str(
            r#"
            default_engine = "baidu"

            [newapi]
            base_url = "http://gateway.local"
            model = "qwen-vl-max"
            "#,
        )
        .unwrap();

        assert_eq!(config.default_engine, OcrBackendType::Baidu);
        assert_eq!(config.newapi.base_url.as_deref(), Some("http://gateway.local"));
        assert_eq!(config.newapi.model, "qwen-vl-max");
        assert_eq!(config.newapi.max_tokens, 4096);
        assert_eq!(config.baidu.column_tolerance, 50);
    }
}
