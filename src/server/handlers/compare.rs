//! Proofreading endpoint.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use super::super::AppState;
use super::{error_response, rejection_parts};
use crate::compare::{CompareError, ComparisonReport};

/// Request body for `/api/compare`.
#[derive(Debug, Deserialize)]
pub struct CompareRequest {
    /// Recognized text, treated as the standard version.
    #[serde(default)]
    pub source: Option<String>,
    /// Text to proofread.
    #[serde(default)]
    pub target: Option<String>,
}

pub async fn api_compare(
    State(state): State<AppState>,
    payload: Result<Json<CompareRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            let (status, message) = rejection_parts(&rejection);
            return error_response(status, &message);
        }
    };

    let source = request.source.unwrap_or_default();
    let target = request.target.unwrap_or_default();

    match state.comparer.compare(&source, &target).await {
        Ok(result) => Json(json!({ "result": result })).into_response(),
        Err(CompareError::MissingText) => {
            error_response(StatusCode::BAD_REQUEST, &CompareError::MissingText.to_string())
        }
        Err(CompareError::Llm(e)) => {
            error!("Comparison failed: {}", e);
            let message = e.to_string();
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": message,
                    "result": ComparisonReport::from_error(&message),
                })),
            )
                .into_response()
        }
    }
}
