use axum::http::{header, HeaderMap};
use percent_encoding::percent_decode_str;

use crate::constants::*;

/// Parse a `Range: bytes=start-end` header against a known total size.
///
/// Returns the inclusive byte range, or `None` when the header is malformed
/// or the requested range falls outside the payload. An omitted end means
/// "through the last byte".
pub fn parse_range_header(header_value: &str, total_size: u64) -> Option<(u64, u64)> {
    if !header_value.starts_with("bytes=") {
        return None;
    }
    let range = &header_value[6..];
    let parts: Vec<&str> = range.split('-').collect();
    if parts.len() != 2 {
        return None;
    }
    let start = parts[0].parse::<u64>().ok()?;
    let end = if parts[1].is_empty() {
        total_size.checked_sub(1)?
    } else {
        parts[1].parse::<u64>().ok()?
    };
    if start > end || end >= total_size {
        return None;
    }
    Some((start, end))
}

/// Extract content type from headers with the audio fallback
pub fn extract_content_type(headers: &HeaderMap) -> String {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or(DEFAULT_AUDIO_CONTENT_TYPE)
        .to_string()
}

/// Extract the display filename from the X-File-Name header.
///
/// The browser sends the original name percent-encoded. When decoding does
/// not yield valid UTF-8 the raw header value is kept; when the header is
/// missing entirely the fixed fallback label is used.
pub fn extract_filename(headers: &HeaderMap) -> String {
    match headers.get(X_FILE_NAME_HEADER).and_then(|v| v.to_str().ok()) {
        Some(raw) => match percent_decode_str(raw).decode_utf8() {
            Ok(decoded) => decoded.into_owned(),
            Err(_) => raw.to_string(),
        },
        None => DEFAULT_FILENAME.to_string(),
    }
}
