use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::Response,
};
use tracing::{debug, info};

use crate::constants::*;
use crate::error::AppError;
use crate::models::AppState;
use crate::store::ByteRange;
use crate::utils::parse_range_header;

/// Stream audio with range support
///
/// Absence wins over range validity: a vanished entry is a 404 even when
/// the Range header is garbage. Responses are marked `no-store` because the
/// payload can be deleted at any moment and a cached slice would outlive
/// the uploader's delete.
pub async fn stream_audio(
    State(state): State<AppState>,
    Path(token): Path<String>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let meta = state
        .store
        .head(&token)
        .await
        .ok_or_else(|| AppError::NotFound(GONE_MESSAGE.to_string()))?;

    let range_header = headers.get(header::RANGE).and_then(|r| r.to_str().ok());

    if let Some(range_header) = range_header {
        let (start, end) = parse_range_header(range_header, meta.size).ok_or_else(|| {
            debug!("unsatisfiable range {:?} for token {}", range_header, token);
            AppError::RangeNotSatisfiable(format!("cannot satisfy range: {}", range_header))
        })?;

        let range = ByteRange { start, end };
        let content = state
            .store
            .get(&token, Some(range))
            .await
            .ok_or_else(|| AppError::NotFound(GONE_MESSAGE.to_string()))?;

        debug!(
            "serving range bytes {}-{}/{} for token {}",
            start, end, content.total_size, token
        );

        return Response::builder()
            .status(StatusCode::PARTIAL_CONTENT)
            .header(header::CONTENT_TYPE, content.content_type)
            .header(header::CONTENT_LENGTH, range.len())
            .header(
                header::CONTENT_RANGE,
                format!("bytes {}-{}/{}", start, end, content.total_size),
            )
            .header(header::ACCEPT_RANGES, "bytes")
            .header(header::CACHE_CONTROL, CACHE_CONTROL_NO_STORE)
            .body(Body::from_stream(content.stream))
            .map_err(|e| AppError::InternalError(format!("Failed to build range response: {}", e)));
    }

    let content = state
        .store
        .get(&token, None)
        .await
        .ok_or_else(|| AppError::NotFound(GONE_MESSAGE.to_string()))?;

    info!(
        "serving full audio for token {} ({} bytes)",
        token, content.total_size
    );

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content.content_type)
        .header(header::CONTENT_LENGTH, content.total_size)
        .header(header::ACCEPT_RANGES, "bytes")
        .header(header::CACHE_CONTROL, CACHE_CONTROL_NO_STORE)
        .body(Body::from_stream(content.stream))
        .map_err(|e| AppError::InternalError(format!("Failed to build stream response: {}", e)))
}
