//! OCR backend abstraction over the remote recognition providers.
//!
//! Supports multiple OCR backends:
//! - Claude: Anthropic Messages API with an image block
//! - Zhipu: GLM-4V chat completions
//! - Baidu: accurate OCR REST API (OAuth client credentials)
//! - NewAPI: any OpenAI-compatible gateway with a vision model

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::image::ImagePayload;

/// Errors from OCR backends.
#[derive(Debug, Error)]
pub enum OcrError {
    #[error("Backend not available: {0}")]
    BackendNotAvailable(String),

    #[error("Invalid image: {0}")]
    InvalidImage(String),

    #[error("{0}")]
    OcrFailed(String),

    #[error("Rate limited by {backend}, retry after {retry_after_secs:?}s")]
    RateLimited {
        backend: OcrBackendType,
        retry_after_secs: Option<u64>,
    },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result of OCR processing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OcrResult {
    /// Extracted text content.
    pub text: String,
    /// Confidence score (0.0 - 1.0), if the provider reports one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
    /// Processing time in milliseconds.
    #[serde(rename = "processingTime")]
    pub processing_time_ms: u64,
    /// Lines (Baidu) or non-whitespace characters (vision models).
    pub word_count: usize,
    /// Human-readable engine name.
    pub engine: String,
    /// Which model was used, when the provider is model-based.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// Available OCR backend types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OcrBackendType {
    /// Anthropic Claude vision.
    #[default]
    Claude,
    /// Zhipu GLM-4V.
    Zhipu,
    /// Baidu accurate OCR.
    Baidu,
    /// OpenAI-compatible NewAPI gateway.
    NewApi,
}

impl OcrBackendType {
    pub const ALL: [OcrBackendType; 4] = [
        OcrBackendType::Claude,
        OcrBackendType::Zhipu,
        OcrBackendType::Baidu,
        OcrBackendType::NewApi,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OcrBackendType::Claude => "claude",
            OcrBackendType::Zhipu => "zhipu",
            OcrBackendType::Baidu => "baidu",
            OcrBackendType::NewApi => "newapi",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "claude" | "anthropic" => Some(OcrBackendType::Claude),
            "zhipu" | "glm" | "glm-4v" => Some(OcrBackendType::Zhipu),
            "baidu" => Some(OcrBackendType::Baidu),
            "newapi" | "openai" => Some(OcrBackendType::NewApi),
            _ => None,
        }
    }
}

impl std::fmt::Display for OcrBackendType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Trait for OCR backends.
#[async_trait]
pub trait OcrBackend: Send + Sync {
    /// Get the backend type.
    fn backend_type(&self) -> OcrBackendType;

    /// Name shown to users and reported in results.
    fn display_name(&self) -> String;

    /// Check if this backend is available (credentials configured).
    fn is_available(&self) -> bool;

    /// Get a description of what's needed to make this backend available.
    fn availability_hint(&self) -> String;

    /// Recognize the text in an image.
    async fn recognize(&self, image: &ImagePayload) -> Result<OcrResult, OcrError>;
}

/// Registry of OCR backends, selected per request.
pub struct OcrManager {
    backends: Vec<Box<dyn OcrBackend>>,
    primary: OcrBackendType,
}

impl OcrManager {
    /// Create a new OCR manager with the specified primary backend.
    pub fn new(primary: OcrBackendType) -> Self {
        Self {
            backends: Vec::new(),
            primary,
        }
    }

    /// Register a backend.
    pub fn register(&mut self, backend: Box<dyn OcrBackend>) {
        self.backends.push(backend);
    }

    /// The backend used when a request names none.
    pub fn primary_type(&self) -> OcrBackendType {
        self.primary
    }

    /// Get a specific backend by type.
    pub fn get(&self, backend_type: OcrBackendType) -> Option<&dyn OcrBackend> {
        self.backends
            .iter()
            .find(|b| b.backend_type() == backend_type)
            .map(|b| b.as_ref())
    }

    /// List all registered backends.
    pub fn backends(&self) -> impl Iterator<Item = &dyn OcrBackend> {
        self.backends.iter().map(|b| b.as_ref())
    }

    /// List available backends (those that can actually run).
    pub fn available_backends(&self) -> impl Iterator<Item = &dyn OcrBackend> {
        self.backends
            .iter()
            .filter(|b| b.is_available())
            .map(|b| b.as_ref())
    }

    /// Get a specific backend, validated and ready to use.
    fn get_ready_backend(&self, backend_type: OcrBackendType) -> Result<&dyn OcrBackend, OcrError> {
        let backend = self.get(backend_type).ok_or_else(|| {
            OcrError::BackendNotAvailable(format!("Backend {} not registered", backend_type))
        })?;
        if !backend.is_available() {
            return Err(OcrError::BackendNotAvailable(backend.availability_hint()));
        }
        Ok(backend)
    }

    /// Run OCR using the primary backend.
    pub async fn recognize(&self, image: &ImagePayload) -> Result<OcrResult, OcrError> {
        self.recognize_with(image, self.primary).await
    }

    /// Run OCR using a specific backend.
    pub async fn recognize_with(
        &self,
        image: &ImagePayload,
        backend_type: OcrBackendType,
    ) -> Result<OcrResult, OcrError> {
        self.get_ready_backend(backend_type)?.recognize(image).await
    }
}

/// Count the non-whitespace characters of recognized text.
pub fn count_visible_chars(text: &str) -> usize {
    text.chars().filter(|c| !c.is_whitespace()).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedBackend {
        kind: OcrBackendType,
        available: bool,
    }

    #[async_trait]
    impl OcrBackend for FixedBackend {
        fn backend_type(&self) -> OcrBackendType {
            self.kind
        }

        fn display_name(&self) -> String {
            format!("fixed-{}", self.kind)
        }

        fn is_available(&self) -> bool {
            self.available
        }

        fn availability_hint(&self) -> String {
            "set FIXED_KEY".to_string()
        }

        async fn recognize(&self, _image: &ImagePayload) -> Result<OcrResult, OcrError> {
            Ok(OcrResult {
                text: "天命".to_string(),
                confidence: Some(1.0),
                processing_time_ms: 0,
                word_count: 2,
                engine: self.display_name(),
                model: None,
            })
        }
    }

    fn image() -> ImagePayload {
        ImagePayload::parse("data:image/png;base64,iVBORw0KGgo=").unwrap()
    }

    #[test]
    fn test_backend_type_round_trip_names() {
        for kind in OcrBackendType::ALL {
            assert_eq!(OcrBackendType::from_str(kind.as_str()), Some(kind));
        }
        assert_eq!(OcrBackendType::from_str("Anthropic"), Some(OcrBackendType::Claude));
        assert_eq!(OcrBackendType::from_str("glm-4v"), Some(OcrBackendType::Zhipu));
        assert_eq!(OcrBackendType::from_str("tesseract"), None);
    }

    #[test]
    fn test_count_visible_chars() {
        assert_eq!(count_visible_chars("天 命\n之謂性"), 5);
        assert_eq!(count_visible_chars("  \n\t"), 0);
    }

    #[test]
    fn test_result_serializes_with_wire_names() {
        let result = OcrResult {
            text: "子曰".to_string(),
            confidence: None,
            processing_time_ms: 12,
            word_count: 2,
            engine: "Claude".to_string(),
            model: None,
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["processingTime"], 12);
        assert_eq!(json["wordCount"], 2);
        assert!(json.get("confidence").is_none());
    }

    #[tokio::test]
    async fn test_manager_selects_backend() {
        let mut manager = OcrManager::new(OcrBackendType::Zhipu);
        manager.register(Box::new(FixedBackend {
            kind: OcrBackendType::Zhipu,
            available: true,
        }));
        manager.register(Box::new(FixedBackend {
            kind: OcrBackendType::Baidu,
            available: false,
        }));

        let result = manager.recognize(&image()).await.unwrap();
        assert_eq!(result.engine, "fixed-zhipu");
        assert_eq!(manager.available_backends().count(), 1);

        let err = manager
            .recognize_with(&image(), OcrBackendType::Baidu)
            .await
            .unwrap_err();
        assert!(matches!(err, OcrError::BackendNotAvailable(ref hint) if hint == "set FIXED_KEY"));

        let err = manager
            .recognize_with(&image(), OcrBackendType::Claude)
            .await
            .unwrap_err();
        assert!(matches!(err, OcrError::BackendNotAvailable(_)));
    }
}
