//! Literature search endpoint.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use super::super::AppState;
use super::{error_response, rejection_parts};
use crate::search::SearchError;

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub query: Option<String>,
}

pub async fn api_search_literature(
    State(state): State<AppState>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            let (status, message) = rejection_parts(&rejection);
            return error_response(status, &message);
        }
    };

    let query = request.query.unwrap_or_default();
    match state.search.search(&query).await {
        Ok(results) => Json(json!({ "results": results })).into_response(),
        Err(e @ SearchError::QueryTooShort) => {
            error_response(StatusCode::BAD_REQUEST, &e.to_string())
        }
        Err(e) => {
            tracing::error!("Search failed: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())
        }
    }
}
