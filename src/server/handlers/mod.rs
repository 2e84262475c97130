//! HTTP request handlers for the web server.

mod api;
mod compare;
mod ocr;
mod pages;
mod search;
mod static_files;

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

// Re-export handlers for use by the router
pub use api::{api_engines, health};
pub use compare::api_compare;
pub use ocr::{api_ocr, api_ocr_baidu, api_ocr_claude, api_ocr_newapi, api_ocr_zhipu};
pub use pages::index;
pub use search::api_search_literature;
pub use static_files::{serve_css, serve_js};

/// Fallback for API routes hit with anything but POST.
pub async fn method_not_allowed() -> Response {
    error_response(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
}

/// `{"error": message}` with the given status.
pub(crate) fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

/// Status and message for a body that could not be read as JSON.
pub(crate) fn rejection_parts(rejection: &JsonRejection) -> (StatusCode, String) {
    (rejection.status(), rejection.body_text())
}
