//! Response generation.
//!
//! # Responsibilities
//! - Append the reload snippet to HTML bodies
//! - Gzip compressible bodies off the async workers
//! - Set content type and CORS headers
//! - Produce plain-text error responses
//! - Log every emitted response once, after its body has been written
//!
//! # Design Decisions
//! - Non-compressible bodies are passed through untouched
//! - A compression failure degrades to a 500 instead of a partial body

use std::convert::Infallible;
use std::io::Write;

use axum::{
    body::{Body, Bytes},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use flate2::{write::GzEncoder, Compression};
use futures_util::stream;

use crate::http::mime;
use crate::observability::logging::log_response;

/// Write a successful (or fallback) response for `content`.
pub async fn emit(
    status: StatusCode,
    path: &str,
    mut content: Vec<u8>,
    extension: &str,
    snippet: &str,
) -> Response {
    let content_type = mime::content_type(extension);

    if !mime::is_compressible(extension) {
        return finish(status, path, content_type, None, content);
    }

    if mime::is_html(extension) && !snippet.is_empty() {
        content.extend_from_slice(snippet.as_bytes());
    }

    match tokio::task::spawn_blocking(move || gzip(&content)).await {
        Ok(Ok(compressed)) => finish(status, path, content_type, Some("gzip"), compressed),
        Ok(Err(err)) => {
            tracing::error!(path = %path, error = %err, "Compression failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, path)
        }
        Err(err) => {
            tracing::error!(path = %path, error = %err, "Compression task failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, path)
        }
    }
}

/// Error response whose body is the numeric status.
pub fn error_response(status: StatusCode, path: &str) -> Response {
    let body = status.as_u16().to_string().into_bytes();
    finish(status, path, "text/plain", None, body)
}

/// Gzip a complete body.
pub fn gzip(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::with_capacity(data.len() / 2 + 32), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}

fn finish(
    status: StatusCode,
    path: &str,
    content_type: &'static str,
    encoding: Option<&'static str>,
    body: Vec<u8>,
) -> Response {
    let length = HeaderValue::from(body.len());
    let mut response = (
        status,
        [
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
            (header::CONTENT_TYPE, content_type),
        ],
        logged_body(status, path, body),
    )
        .into_response();

    let headers = response.headers_mut();
    headers.insert(header::CONTENT_LENGTH, length);
    if let Some(encoding) = encoding {
        headers.insert(header::CONTENT_ENCODING, HeaderValue::from_static(encoding));
    }
    response
}

/// Access line for one response, written when dropped.
struct AccessLine {
    status: StatusCode,
    path: String,
}

impl Drop for AccessLine {
    fn drop(&mut self) {
        log_response(self.status, &self.path);
    }
}

/// Single-chunk body that owns the access line until the transport is done
/// with it: either the stream is exhausted or the body is dropped.
fn logged_body(status: StatusCode, path: &str, content: Vec<u8>) -> Body {
    let line = AccessLine {
        status,
        path: path.to_string(),
    };
    let state = (Some(Bytes::from(content)), line);
    Body::from_stream(stream::unfold(state, |(chunk, line)| async move {
        chunk.map(|chunk| (Ok::<_, Infallible>(chunk), (None, line)))
    }))
}
