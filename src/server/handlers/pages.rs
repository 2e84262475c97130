//! HTML page handlers.

use askama::Template;
use axum::{extract::State, response::Html};

use super::super::template_structs::{EngineOption, IndexTemplate};
use super::super::AppState;

/// Single-page UI with the engine selector filled in.
pub async fn index(State(state): State<AppState>) -> Html<String> {
    let primary = state.ocr.primary_type();
    let engines = state
        .ocr
        .backends()
        .map(|backend| EngineOption {
            id: backend.backend_type().as_str(),
            name: backend.display_name(),
            available: backend.is_available(),
            selected: backend.backend_type() == primary,
        })
        .collect();

    let template = IndexTemplate {
        title: "古籍研究智能工作流系统",
        engines,
    };
    Html(template.render().unwrap_or_else(|e| e.to_string()))
}
