use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::Response,
};
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::constants::GONE_MESSAGE;
use crate::error::AppError;
use crate::models::{AppState, CheckResponse};

/// Existence check for a share token.
///
/// A deleted, expired, or never-issued token all produce the same 404 body;
/// lifecycle state never leaks.
pub async fn check_audio(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Response, AppError> {
    let (status, payload) = match state.store.head(&token).await {
        Some(meta) => {
            let created_at = DateTime::<Utc>::from(meta.created_at).to_rfc3339();
            (
                StatusCode::OK,
                CheckResponse {
                    exists: true,
                    filename: Some(meta.filename),
                    created_at: Some(created_at),
                    message: None,
                },
            )
        }
        None => {
            debug!("check miss for token {}", token);
            (
                StatusCode::NOT_FOUND,
                CheckResponse {
                    exists: false,
                    filename: None,
                    created_at: None,
                    message: Some(GONE_MESSAGE.to_string()),
                },
            )
        }
    };

    let json_body = serde_json::to_string(&payload)
        .map_err(|e| AppError::InternalError(format!("Failed to serialize response: {}", e)))?;

    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json_body))
        .map_err(|e| AppError::InternalError(format!("Failed to build response: {}", e)))
}
