//! Common HTTP types used throughout the dispatch pipeline.
//!
//! From the pipeline's perspective requests and responses are opaque value
//! objects; middleware that wants to modify a request builds a new value and
//! passes it down the chain.

use bytes::Bytes;
use http_body_util::Full;

/// The HTTP request type flowing through the pipeline.
///
/// This is a standard `http::Request` with a `Full<Bytes>` body.
pub type Request = http::Request<Full<Bytes>>;

/// The HTTP response type produced by handlers.
///
/// This is a standard `http::Response` with a `Full<Bytes>` body.
pub type Response = http::Response<Full<Bytes>>;

/// Extension trait for building common responses.
pub trait ResponseExt {
    /// Creates a plain-text response with the given status code.
    fn text(status: http::StatusCode, body: &str) -> Response;

    /// Creates a response with the given status code and an empty body.
    fn empty(status: http::StatusCode) -> Response;

    /// Creates a JSON error response.
    fn json_error(status: http::StatusCode, code: &str, message: &str) -> Response;
}

impl ResponseExt for Response {
    fn text(status: http::StatusCode, body: &str) -> Response {
        http::Response::builder()
            .status(status)
            .header(http::header::CONTENT_TYPE, "text/plain; charset=utf-8")
            .body(Full::new(Bytes::from(body.to_string())))
            .expect("failed to build text response")
    }

    fn empty(status: http::StatusCode) -> Response {
        http::Response::builder()
            .status(status)
            .body(Full::new(Bytes::new()))
            .expect("failed to build empty response")
    }

    fn json_error(status: http::StatusCode, code: &str, message: &str) -> Response {
        let body = serde_json::json!({
            "error": {
                "code": code,
                "message": message
            }
        });

        http::Response::builder()
            .status(status)
            .header(http::header::CONTENT_TYPE, "application/json")
            .body(Full::new(Bytes::from(body.to_string())))
            .expect("failed to build JSON error response")
    }
}
