//! Web server for the research workflow.
//!
//! Serves the single-page UI and the JSON API it calls:
//! - OCR of uploaded page images through a chosen engine
//! - Literature search across ctext.org and Wikisource
//! - LLM proofreading of recognized text against a reference

mod assets;
mod handlers;
mod routes;
mod template_structs;

pub use routes::create_router;

use std::net::SocketAddr;
use std::sync::Arc;

use crate::compare::TextComparer;
use crate::config::{Config, Settings};
use crate::http_client::HttpClient;
use crate::llm::LlmClient;
use crate::ocr::{build_manager, OcrManager};
use crate::search::LiteratureSearch;

/// Shared state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub ocr: Arc<OcrManager>,
    pub comparer: Arc<TextComparer>,
    pub search: Arc<LiteratureSearch>,
    /// Request body limit applied by the router.
    pub max_body_bytes: usize,
}

impl AppState {
    pub fn new(settings: &Settings, config: &Config) -> anyhow::Result<Self> {
        let http = HttpClient::new(settings.request_timeout(), settings.user_agent.as_deref())?;

        let ocr = build_manager(&config.ocr, &http);
        let comparer = TextComparer::new(LlmClient::new(config.llm.clone(), http.clone()));
        let search = LiteratureSearch::new(&config.search, &http, settings.request_timeout())?;

        Ok(Self::from_parts(
            ocr,
            comparer,
            search,
            settings.max_body_bytes,
        ))
    }

    /// Assemble state from already-built services.
    pub fn from_parts(
        ocr: OcrManager,
        comparer: TextComparer,
        search: LiteratureSearch,
        max_body_bytes: usize,
    ) -> Self {
        Self {
            ocr: Arc::new(ocr),
            comparer: Arc::new(comparer),
            search: Arc::new(search),
            max_body_bytes,
        }
    }
}

/// Start the web server.
pub async fn serve(settings: &Settings, config: &Config, addr: SocketAddr) -> anyhow::Result<()> {
    let state = AppState::new(settings, config)?;

    let available: Vec<_> = state
        .ocr
        .available_backends()
        .map(|b| b.backend_type().as_str())
        .collect();
    if available.is_empty() {
        tracing::warn!("No OCR engine has credentials configured");
    } else {
        tracing::info!("OCR engines available: {}", available.join(", "));
    }

    let app = create_router(state);

    tracing::info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
