//! Health and engine discovery endpoints.

use axum::{extract::State, response::IntoResponse, Json};
use serde::Serialize;
use serde_json::json;

use super::super::AppState;

/// Health check endpoint for container orchestration.
pub async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// One entry of the engine listing.
#[derive(Debug, Serialize)]
pub struct EngineInfo {
    pub id: &'static str,
    pub name: String,
    pub available: bool,
    pub hint: String,
}

/// List registered OCR engines and which one `/api/ocr` uses by default.
pub async fn api_engines(State(state): State<AppState>) -> impl IntoResponse {
    let engines: Vec<EngineInfo> = state
        .ocr
        .backends()
        .map(|backend| EngineInfo {
            id: backend.backend_type().as_str(),
            name: backend.display_name(),
            available: backend.is_available(),
            hint: backend.availability_hint(),
        })
        .collect();

    Json(json!({
        "default": state.ocr.primary_type().as_str(),
        "engines": engines,
    }))
}
