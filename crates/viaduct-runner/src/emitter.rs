//! Response emission.
//!
//! The [`Emitter`] trait is the sink a [`RequestRunner`](crate::RequestRunner)
//! hands finished responses to. The runner decides whether the body should
//! be suppressed (HEAD requests and bodyless status codes); the emitter
//! only executes that decision.

use bytes::Bytes;
use http_body_util::BodyExt;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;
use viaduct_core::{Response, ViaductResult};
use viaduct_middleware::BoxFuture;

/// Sink consuming finished responses.
pub trait Emitter: Send + Sync {
    /// Emits a response, omitting the body when `without_body` is set.
    fn emit(&self, response: Response, without_body: bool) -> BoxFuture<'_, ViaductResult<()>>;
}

/// Emitter serializing responses in HTTP/1.1 wire format to a writer.
///
/// Status line and headers are always written; the body is collected and
/// written only when not suppressed. Useful for plain-socket transports
/// and for capturing emitted output in tests.
pub struct WriteEmitter<W> {
    writer: Mutex<W>,
}

impl<W> WriteEmitter<W> {
    /// Creates an emitter writing to `writer`.
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Consumes the emitter, returning the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

impl<W> Emitter for WriteEmitter<W>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    fn emit(&self, response: Response, without_body: bool) -> BoxFuture<'_, ViaductResult<()>> {
        Box::pin(async move {
            let (parts, body) = response.into_parts();

            let mut head = Vec::with_capacity(256);
            head.extend_from_slice(version_token(parts.version).as_bytes());
            head.extend_from_slice(b" ");
            head.extend_from_slice(parts.status.as_str().as_bytes());
            if let Some(reason) = parts.status.canonical_reason() {
                head.extend_from_slice(b" ");
                head.extend_from_slice(reason.as_bytes());
            }
            head.extend_from_slice(b"\r\n");

            for (name, value) in &parts.headers {
                head.extend_from_slice(name.as_str().as_bytes());
                head.extend_from_slice(b": ");
                head.extend_from_slice(value.as_bytes());
                head.extend_from_slice(b"\r\n");
            }
            head.extend_from_slice(b"\r\n");

            let mut writer = self.writer.lock().await;
            writer.write_all(&head).await?;

            if !without_body {
                let bytes = collect_body(body).await;
                if !bytes.is_empty() {
                    writer.write_all(&bytes).await?;
                }
            }

            writer.flush().await?;
            Ok(())
        })
    }
}

/// Collects a `Full<Bytes>` body; its error type is uninhabited.
async fn collect_body(body: http_body_util::Full<Bytes>) -> Bytes {
    match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(never) => match never {},
    }
}

fn version_token(version: http::Version) -> &'static str {
    match version {
        http::Version::HTTP_09 => "HTTP/0.9",
        http::Version::HTTP_10 => "HTTP/1.0",
        http::Version::HTTP_2 => "HTTP/2.0",
        http::Version::HTTP_3 => "HTTP/3.0",
        _ => "HTTP/1.1",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;
    use viaduct_core::ResponseExt;

    async fn emit_to_string(response: Response, without_body: bool) -> String {
        let emitter = WriteEmitter::new(Vec::new());
        emitter.emit(response, without_body).await.unwrap();
        String::from_utf8(emitter.into_inner()).unwrap()
    }

    #[tokio::test]
    async fn test_emits_status_line_headers_and_body() {
        let response = Response::text(StatusCode::OK, "hello");
        let output = emit_to_string(response, false).await;

        assert!(output.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(output.contains("content-type: text/plain; charset=utf-8\r\n"));
        assert!(output.ends_with("\r\n\r\nhello"));
    }

    #[tokio::test]
    async fn test_suppressed_body_is_not_written() {
        let response = Response::text(StatusCode::OK, "hello");
        let output = emit_to_string(response, true).await;

        assert!(output.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(output.ends_with("\r\n\r\n"));
        assert!(!output.contains("hello"));
    }

    #[tokio::test]
    async fn test_status_without_canonical_reason() {
        let response = Response::empty(StatusCode::from_u16(599).unwrap());
        let output = emit_to_string(response, false).await;

        assert!(output.starts_with("HTTP/1.1 599\r\n"));
    }
}
