use bytes::{Bytes, BytesMut};
use futures_util::{Stream, StreamExt};
use tracing::{error, info};

use crate::constants::*;
use crate::error::{AppError, AppResult};

/// Consume an inbound body stream up to a hard byte cap.
///
/// The cap is checked against the running total before each chunk is
/// buffered, so an oversized upload is rejected without ever being
/// truncated or committed. An empty stream yields an empty buffer; the
/// caller decides what that means.
pub async fn read_body_capped<S>(mut body_stream: S, max_bytes: u64) -> AppResult<Bytes>
where
    S: Stream<Item = Result<Bytes, axum::Error>> + Unpin,
{
    let mut buf = BytesMut::new();
    let mut last_log_time = std::time::Instant::now();

    while let Some(chunk) = body_stream.next().await {
        let data = chunk.map_err(|e| {
            error!("failed to read upload chunk: {}", e);
            AppError::BadRequest(format!("failed to read upload: {}", e))
        })?;

        if buf.len() as u64 + data.len() as u64 > max_bytes {
            error!(
                "upload aborted: {} bytes received exceeds limit of {} bytes",
                buf.len() as u64 + data.len() as u64,
                max_bytes
            );
            return Err(AppError::PayloadTooLarge(format!(
                "upload exceeds limit of {} MB",
                max_bytes / (1024 * 1024)
            )));
        }

        buf.extend_from_slice(&data);

        if last_log_time.elapsed() >= LOG_INTERVAL {
            info!("upload progress: {} MB received", buf.len() / 1_048_576);
            last_log_time = std::time::Instant::now();
        }
    }

    Ok(buf.freeze())
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;

    fn chunks(parts: Vec<&'static [u8]>) -> impl Stream<Item = Result<Bytes, axum::Error>> + Unpin {
        stream::iter(
            parts
                .into_iter()
                .map(|p| Ok(Bytes::from_static(p)))
                .collect::<Vec<_>>(),
        )
    }

    #[tokio::test]
    async fn buffers_all_chunks_under_cap() {
        let body = chunks(vec![b"abc", b"def", b"g"]);
        let bytes = read_body_capped(body, 100).await.unwrap();
        assert_eq!(&bytes[..], b"abcdefg");
    }

    #[tokio::test]
    async fn exact_cap_is_accepted() {
        let body = chunks(vec![b"12345"]);
        let bytes = read_body_capped(body, 5).await.unwrap();
        assert_eq!(bytes.len(), 5);
    }

    #[tokio::test]
    async fn one_byte_over_cap_is_rejected() {
        let body = chunks(vec![b"123456"]);
        let err = read_body_capped(body, 5).await.unwrap_err();
        assert!(matches!(err, AppError::PayloadTooLarge(_)));
    }

    #[tokio::test]
    async fn cap_applies_across_chunks() {
        let body = chunks(vec![b"1234", b"5678"]);
        let err = read_body_capped(body, 6).await.unwrap_err();
        assert!(matches!(err, AppError::PayloadTooLarge(_)));
    }

    #[tokio::test]
    async fn empty_stream_yields_empty_buffer() {
        let body = chunks(vec![]);
        let bytes = read_body_capped(body, 5).await.unwrap();
        assert!(bytes.is_empty());
    }
}
