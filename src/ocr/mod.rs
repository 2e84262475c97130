//! Text recognition for classical Chinese page images.
//!
//! ## OCR Backends
//!
//! - **Claude**: Anthropic vision model, no confidence reported (default)
//! - **Zhipu**: GLM-4V via chat completions, fixed confidence
//! - **Baidu**: accurate OCR REST API, per-line probabilities, vertical line ordering
//! - **NewAPI**: any vision model behind an OpenAI-compatible gateway
//!
//! Use `build_manager` to register every backend from config and pick one
//! per request.

mod backend;
mod baidu;
mod claude;
mod config;
mod image;
mod newapi;
mod prompts;
mod zhipu;

pub use backend::{
    count_visible_chars, OcrBackend, OcrBackendType, OcrError, OcrManager, OcrResult,
};
pub use baidu::{average_confidence, order_lines, BaiduBackend, WordsResult, NO_TEXT_FOUND};
pub use claude::ClaudeBackend;
pub use config::{BaiduConfig, ClaudeConfig, NewApiConfig, OcrConfig, ZhipuConfig};
pub use image::ImagePayload;
pub use newapi::NewApiBackend;
pub use prompts::CLASSICAL_OCR_PROMPT;
pub use zhipu::ZhipuBackend;

use crate::http_client::HttpClient;

/// Register all four backends, with `config.default_engine` as primary.
pub fn build_manager(config: &OcrConfig, http: &HttpClient) -> OcrManager {
    let mut manager = OcrManager::new(config.default_engine);
    manager.register(Box::new(ClaudeBackend::new(
        config.claude.clone(),
        http.clone(),
    )));
    manager.register(Box::new(ZhipuBackend::new(
        config.zhipu.clone(),
        http.clone(),
    )));
    manager.register(Box::new(BaiduBackend::new(
        config.baidu.clone(),
        http.clone(),
    )));
    manager.register(Box::new(NewApiBackend::new(
        config.newapi.clone(),
        http.clone(),
    )));
    manager
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_build_manager_registers_all() {
        let mut config = OcrConfig::default();
        config.default_engine = OcrBackendType::Baidu;
        config.baidu.api_key = None;

        let http = HttpClient::new(Duration::from_secs(5), None).unwrap();
        let manager = build_manager(&config, &http);

        assert_eq!(manager.primary_type(), OcrBackendType::Baidu);
        assert_eq!(manager.backends().count(), 4);
        for kind in OcrBackendType::ALL {
            assert!(manager.get(kind).is_some());
        }
        assert!(!manager.get(OcrBackendType::Baidu).unwrap().is_available());
    }
}
