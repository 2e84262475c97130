//! LLM client configuration.

use serde::{Deserialize, Serialize};

/// LLM provider type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    /// Zhipu GLM chat completions (default)
    #[default]
    Zhipu,
    /// OpenAI-compatible gateway (NewAPI, one-api, OpenAI itself)
    NewApi,
    /// Anthropic Messages API
    Anthropic,
}

impl LlmProvider {
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "zhipu" | "glm" => Some(Self::Zhipu),
            "newapi" | "openai" => Some(Self::NewApi),
            "anthropic" | "claude" => Some(Self::Anthropic),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Zhipu => "zhipu",
            Self::NewApi => "newapi",
            Self::Anthropic => "anthropic",
        }
    }

    fn default_model(&self) -> String {
        match self {
            Self::Zhipu => "glm-4".to_string(),
            Self::NewApi => std::env::var("NEWAPI_MODEL").unwrap_or_else(|_| "gpt-4o".to_string()),
            Self::Anthropic => "claude-sonnet-4-20250514".to_string(),
        }
    }

    fn default_endpoint(&self) -> Option<String> {
        match self {
            Self::Zhipu => Some("https://open.bigmodel.cn".to_string()),
            Self::NewApi => std::env::var("NEWAPI_BASE_URL").ok(),
            Self::Anthropic => Some("https://api.anthropic.com".to_string()),
        }
    }

    fn key_env_var(&self) -> &'static str {
        match self {
            Self::Zhipu => "ZHIPU_API_KEY",
            Self::NewApi => "NEWAPI_API_KEY",
            Self::Anthropic => "ANTHROPIC_API_KEY",
        }
    }
}

/// Configuration for the proofreading LLM.
///
/// Unset endpoint, key, and model resolve to the provider's defaults at use
/// time, so switching `provider` alone is enough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Which API to talk to
    pub provider: LlmProvider,
    /// API base URL (provider-specific default applies)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// API key (falls back to the provider's own env var)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Model name (provider-specific default applies)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Temperature for generation (0.0 - 1.0)
    pub temperature: f32,
    /// Maximum tokens in response
    pub max_tokens: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self::base_default().with_env_overrides()
    }
}

impl LlmConfig {
    /// Base default without env overrides.
    pub(crate) fn base_default() -> Self {
        Self {
            provider: LlmProvider::default(),
            endpoint: None,
            api_key: None,
            model: None,
            temperature: 0.3,
            max_tokens: 2048,
        }
    }

    /// Apply environment variable overrides.
    ///
    /// Supported env vars:
    /// - `LLM_PROVIDER`: "zhipu" (default), "newapi", or "anthropic"
    /// - `LLM_ENDPOINT`: API base URL
    /// - `LLM_API_KEY`: API key (otherwise the provider's own key is used)
    /// - `LLM_MODEL`: Model name
    /// - `LLM_TEMPERATURE`: Generation temperature (0.0-1.0)
    /// - `LLM_MAX_TOKENS`: Maximum tokens in response
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(provider) = std::env::var("LLM_PROVIDER")
            .ok()
            .and_then(|v| LlmProvider::from_str(&v))
        {
            self.provider = provider;
        }
        if let Ok(val) = std::env::var("LLM_ENDPOINT") {
            self.endpoint = Some(val);
        }
        if let Ok(val) = std::env::var("LLM_API_KEY") {
            self.api_key = Some(val);
        }
        if let Ok(val) = std::env::var("LLM_MODEL") {
            self.model = Some(val);
        }
        if let Ok(val) = std::env::var("LLM_TEMPERATURE") {
            if let Ok(t) = val.parse() {
                self.temperature = t;
            }
        }
        if let Ok(val) = std::env::var("LLM_MAX_TOKENS") {
            if let Ok(n) = val.parse() {
                self.max_tokens = n;
            }
        }
        self
    }

    pub fn with_provider(mut self, provider: LlmProvider) -> Self {
        self.provider = provider;
        self
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = Some(endpoint.to_string());
        self
    }

    pub fn with_api_key(mut self, api_key: &str) -> Self {
        self.api_key = Some(api_key.to_string());
        self
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = Some(model.to_string());
        self
    }

    /// Model to request.
    pub fn effective_model(&self) -> String {
        self.model
            .clone()
            .unwrap_or_else(|| self.provider.default_model())
    }

    /// API base URL, if one is known.
    pub fn effective_endpoint(&self) -> Option<String> {
        self.endpoint
            .clone()
            .or_else(|| self.provider.default_endpoint())
    }

    /// API key, falling back to the provider's env var.
    pub fn effective_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(self.provider.key_env_var()).ok())
            .filter(|k| !k.is_empty())
    }

    /// Copy with the API key masked.
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        config.api_key = self.api_key.as_ref().map(|_| "***".to_string());
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_default() {
        let config = LlmConfig::base_default();
        assert_eq!(config.provider, LlmProvider::Zhipu);
        assert_eq!(config.effective_model(), "glm-4");
        assert_eq!(
            config.effective_endpoint().as_deref(),
            Some("https://open.bigmodel.cn")
        );
        assert!((config.temperature - 0.3).abs() < f32::EPSILON);
    }

    #[test]
    fn test_provider_switch_changes_defaults() {
        let config = LlmConfig::base_default().with_provider(LlmProvider::Anthropic);
        assert_eq!(config.effective_model(), "claude-sonnet-4-20250514");
        assert_eq!(
            config.effective_endpoint().as_deref(),
            Some("https://api.anthropic.com")
        );
    }

    #[test]
    fn test_explicit_values_win() {
        let config = LlmConfig::base_default()
            .with_provider(LlmProvider::NewApi)
            .with_endpoint("http://gateway.local")
            .with_model("deepseek-chat")
            .with_api_key("sk-local");
        assert_eq!(config.effective_model(), "deepseek-chat");
        assert_eq!(config.effective_endpoint().as_deref(), Some("http://gateway.local"));
        assert_eq!(config.effective_api_key().as_deref(), Some("sk-local"));
        assert_eq!(config.redacted().api_key.as_deref(), Some("***"));
    }

    #[test]
    fn test_provider_from_str() {
        assert_eq!(LlmProvider::from_str("GLM"), Some(LlmProvider::Zhipu));
        assert_eq!(LlmProvider::from_str("openai"), Some(LlmProvider::NewApi));
        assert_eq!(LlmProvider::from_str("claude"), Some(LlmProvider::Anthropic));
        assert_eq!(LlmProvider::from_str("ollama"), None);
    }
}
