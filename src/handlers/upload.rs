use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    response::Response,
};
use tracing::{error, info};

use crate::error::AppError;
use crate::models::{AppState, UploadResponse};
use crate::services::ingest;
use crate::store::AudioMeta;
use crate::token::generate_token;
use crate::utils::{extract_content_type, extract_filename};

/// Handle audio uploads
///
/// The raw request body is the payload; content type and the original
/// filename arrive as header hints. This is the only path that creates an
/// entry, and it commits nothing until the whole payload has passed the
/// size guard.
pub async fn upload_audio(
    State(state): State<AppState>,
    headers: HeaderMap,
    req: Request<Body>,
) -> Result<Response, AppError> {
    let content_type = extract_content_type(&headers);
    let filename = extract_filename(&headers);

    let body_stream = req.into_body().into_data_stream();
    let payload = ingest::read_body_capped(body_stream, state.max_upload_bytes).await?;

    if payload.is_empty() {
        return Err(AppError::BadRequest("no audio data received".to_string()));
    }

    let token = generate_token();
    let size = payload.len() as u64;

    state
        .store
        .put(
            &token,
            payload,
            AudioMeta {
                content_type: content_type.clone(),
                filename: filename.clone(),
            },
        )
        .await
        .map_err(|e| {
            error!("failed to commit upload: {}", e);
            AppError::InternalError("failed to store upload".to_string())
        })?;

    info!(
        "stored upload {} ({} bytes, type: {}, name: {})",
        token, size, content_type, filename
    );

    let json_body = serde_json::to_string(&UploadResponse { token })
        .map_err(|e| AppError::InternalError(format!("Failed to serialize response: {}", e)))?;

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json_body))
        .map_err(|e| AppError::InternalError(format!("Failed to build response: {}", e)))
}
