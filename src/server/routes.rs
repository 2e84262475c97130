//! Router configuration for the web server.

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, MethodRouter},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::handlers;
use super::AppState;

/// POST-only route answering other methods with a JSON 405.
fn post_only<H, T>(handler: H) -> MethodRouter<AppState>
where
    H: axum::handler::Handler<T, AppState>,
    T: 'static,
{
    post(handler).fallback(handlers::method_not_allowed)
}

/// Create the main router with all routes.
pub fn create_router(state: AppState) -> Router {
    let body_limit = state.max_body_bytes;

    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route("/api/engines", get(handlers::api_engines))
        // OCR, by requested engine or pinned to one
        .route("/api/ocr", post_only(handlers::api_ocr))
        .route("/api/ocr-claude", post_only(handlers::api_ocr_claude))
        .route("/api/ocr-zhipu", post_only(handlers::api_ocr_zhipu))
        .route("/api/ocr-baidu", post_only(handlers::api_ocr_baidu))
        .route("/api/ocr-newapi", post_only(handlers::api_ocr_newapi))
        // Proofreading and search
        .route("/api/compare", post_only(handlers::api_compare))
        .route(
            "/api/search-literature",
            post_only(handlers::api_search_literature),
        )
        // Static assets (CSS/JS)
        .route("/static/style.css", get(handlers::serve_css))
        .route("/static/app.js", get(handlers::serve_js))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
