//! Single byte-range delivery (`Range: bytes=...`)

use std::io::SeekFrom;
use std::path::Path;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, HeaderValue, StatusCode};
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;

use super::error::DeliveryError;
use super::sink::ResponseSink;
use super::strategy::{DeliveryStrategy, ReadfileStrategy, STREAM_CHUNK_SIZE};

/// Outcome of interpreting a `Range` header against a file size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteRange {
    /// No usable range: send the whole file
    Full,
    /// Inclusive byte range
    Partial { start: u64, end: u64 },
    /// Syntactically valid but outside the file
    Unsatisfiable,
}

impl ByteRange {
    /// Interpret a `Range` header value.
    ///
    /// Only a single `bytes` range is honoured; multiple ranges and anything
    /// unparseable fall back to the full file.
    pub fn parse(value: &str, size: u64) -> Self {
        let Some(spec) = value.trim().strip_prefix("bytes=") else {
            return ByteRange::Full;
        };
        if spec.contains(',') {
            return ByteRange::Full;
        }
        let Some((first, last)) = spec.trim().split_once('-') else {
            return ByteRange::Full;
        };

        match (first.trim(), last.trim()) {
            ("", "") => ByteRange::Full,
            // Suffix range: the last N bytes
            ("", suffix) => match suffix.parse::<u64>() {
                Ok(0) => ByteRange::Unsatisfiable,
                Ok(_) if size == 0 => ByteRange::Unsatisfiable,
                Ok(n) => ByteRange::Partial {
                    start: size.saturating_sub(n),
                    end: size - 1,
                },
                Err(_) => ByteRange::Full,
            },
            (start, end) => {
                let Ok(start) = start.parse::<u64>() else {
                    return ByteRange::Full;
                };
                let end = if end.is_empty() {
                    None
                } else {
                    match end.parse::<u64>() {
                        Ok(end) if end >= start => Some(end),
                        _ => return ByteRange::Full,
                    }
                };

                if start >= size {
                    return ByteRange::Unsatisfiable;
                }
                let last = size - 1;
                ByteRange::Partial {
                    start,
                    end: end.map_or(last, |e| e.min(last)),
                }
            }
        }
    }
}

/// Serves the full file or a single requested byte range
///
/// Always advertises `Accept-Ranges: bytes`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RangeStrategy;

#[async_trait]
impl DeliveryStrategy for RangeStrategy {
    async fn serve(&self, path: &Path, sink: &mut ResponseSink) -> Result<(), DeliveryError> {
        sink.set_header(header::ACCEPT_RANGES, HeaderValue::from_static("bytes"));

        let requested = sink
            .request_headers()
            .get(header::RANGE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let Some(requested) = requested else {
            let body = ReadfileStrategy::open_body(path).await?;
            sink.set_status(StatusCode::OK);
            sink.set_body(body);
            return Ok(());
        };

        let mut file = tokio::fs::File::open(path).await?;
        let size = file.metadata().await?.len();

        match ByteRange::parse(&requested, size) {
            ByteRange::Full => {
                sink.set_status(StatusCode::OK);
                sink.set_body(Body::from_stream(ReaderStream::with_capacity(
                    file,
                    STREAM_CHUNK_SIZE,
                )));
            }
            ByteRange::Partial { start, end } => {
                let length = end - start + 1;
                file.seek(SeekFrom::Start(start)).await?;

                sink.set_status(StatusCode::PARTIAL_CONTENT);
                sink.set_header(header::CONTENT_LENGTH, HeaderValue::from(length));
                sink.set_header(
                    header::CONTENT_RANGE,
                    content_range(&format!("bytes {start}-{end}/{size}"))?,
                );
                sink.set_body(Body::from_stream(ReaderStream::with_capacity(
                    file.take(length),
                    STREAM_CHUNK_SIZE,
                )));
            }
            ByteRange::Unsatisfiable => {
                sink.set_status(StatusCode::RANGE_NOT_SATISFIABLE);
                sink.set_header(header::CONTENT_LENGTH, HeaderValue::from(0u64));
                sink.set_header(header::CONTENT_RANGE, content_range(&format!("bytes */{size}"))?);
                sink.set_body(Body::empty());
            }
        }

        Ok(())
    }
}

fn content_range(value: &str) -> Result<HeaderValue, DeliveryError> {
    HeaderValue::from_str(value).map_err(|_| DeliveryError::InvalidHeader { name: "Content-Range" })
}
