use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::Response,
};
use tracing::info;

use crate::error::AppError;
use crate::models::{AppState, DeleteResponse};

/// Handle audio deletion
///
/// Delete is best-effort cleanup from the uploader's browser: it reports
/// success whether or not the entry still existed, so a retry or a race
/// with the sweeper looks no different from a first delete.
pub async fn delete_audio(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Response, AppError> {
    state.store.delete(&token).await;
    info!("delete handled for token {}", token);

    let json_body = serde_json::to_string(&DeleteResponse { ok: true })
        .map_err(|e| AppError::InternalError(format!("Failed to serialize response: {}", e)))?;

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json_body))
        .map_err(|e| AppError::InternalError(format!("Failed to build response: {}", e)))
}

/// Reject delete requests that carry no token segment
pub async fn delete_missing_token() -> AppError {
    AppError::BadRequest("missing token".to_string())
}

/// Explicit 405 for verbs outside the delete contract
pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed("use DELETE or POST".to_string())
}
