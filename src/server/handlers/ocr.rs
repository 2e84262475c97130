//! OCR endpoint handlers.

use std::time::Instant;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

use super::super::AppState;
use super::rejection_parts;
use crate::ocr::{ImagePayload, OcrBackendType, OcrError};

/// Request body for the OCR endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct OcrRequest {
    /// Data URL or bare base64.
    #[serde(default)]
    pub image: Option<String>,
    /// Engine id, only honoured by `/api/ocr`.
    #[serde(default)]
    pub engine: Option<String>,
}

/// OCR with the requested engine, or the configured default.
pub async fn api_ocr(
    State(state): State<AppState>,
    payload: Result<Json<OcrRequest>, JsonRejection>,
) -> Response {
    run_ocr(&state, payload, None).await
}

pub async fn api_ocr_claude(
    State(state): State<AppState>,
    payload: Result<Json<OcrRequest>, JsonRejection>,
) -> Response {
    run_ocr(&state, payload, Some(OcrBackendType::Claude)).await
}

pub async fn api_ocr_zhipu(
    State(state): State<AppState>,
    payload: Result<Json<OcrRequest>, JsonRejection>,
) -> Response {
    run_ocr(&state, payload, Some(OcrBackendType::Zhipu)).await
}

pub async fn api_ocr_baidu(
    State(state): State<AppState>,
    payload: Result<Json<OcrRequest>, JsonRejection>,
) -> Response {
    run_ocr(&state, payload, Some(OcrBackendType::Baidu)).await
}

pub async fn api_ocr_newapi(
    State(state): State<AppState>,
    payload: Result<Json<OcrRequest>, JsonRejection>,
) -> Response {
    run_ocr(&state, payload, Some(OcrBackendType::NewApi)).await
}

async fn run_ocr(
    state: &AppState,
    payload: Result<Json<OcrRequest>, JsonRejection>,
    fixed: Option<OcrBackendType>,
) -> Response {
    let start = Instant::now();

    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            let (status, message) = rejection_parts(&rejection);
            let engine = fixed.unwrap_or_else(|| state.ocr.primary_type());
            return failure(status, &message, start, &engine_name(state, engine));
        }
    };

    let engine = match (fixed, request.engine.as_deref()) {
        (Some(engine), _) => engine,
        (None, None) | (None, Some("")) => state.ocr.primary_type(),
        (None, Some(name)) => match OcrBackendType::from_str(name) {
            Some(engine) => engine,
            None => {
                return failure(
                    StatusCode::BAD_REQUEST,
                    &format!("Unknown OCR engine: {}", name),
                    start,
                    name,
                );
            }
        },
    };
    let name = engine_name(state, engine);

    let image = match ImagePayload::parse(request.image.as_deref().unwrap_or_default()) {
        Ok(image) => image,
        Err(e) => return failure(StatusCode::BAD_REQUEST, &e.to_string(), start, &name),
    };

    match state.ocr.recognize_with(&image, engine).await {
        Ok(result) => {
            info!(
                "OCR via {}: {} chars in {}ms",
                engine,
                result.text.chars().count(),
                result.processing_time_ms
            );
            Json(result).into_response()
        }
        Err(e) => {
            error!("OCR via {} failed: {}", engine, e);
            failure(status_for(&e), &e.to_string(), start, &name)
        }
    }
}

/// Display name of a registered engine, or its id.
fn engine_name(state: &AppState, engine: OcrBackendType) -> String {
    state
        .ocr
        .get(engine)
        .map(|backend| backend.display_name())
        .unwrap_or_else(|| engine.as_str().to_string())
}

fn status_for(error: &OcrError) -> StatusCode {
    match error {
        OcrError::InvalidImage(_) => StatusCode::BAD_REQUEST,
        OcrError::BackendNotAvailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        OcrError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
        OcrError::OcrFailed(_) | OcrError::Http(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn failure(status: StatusCode, message: &str, start: Instant, engine: &str) -> Response {
    (
        status,
        Json(json!({
            "error": message,
            "processingTime": start.elapsed().as_millis() as u64,
            "engine": engine,
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_for(&OcrError::InvalidImage("x".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&OcrError::BackendNotAvailable("x".to_string())),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_for(&OcrError::RateLimited {
                backend: OcrBackendType::NewApi,
                retry_after_secs: Some(3)
            }),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            status_for(&OcrError::OcrFailed("百度OCR错误: x".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
