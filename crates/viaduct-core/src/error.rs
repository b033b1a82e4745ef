//! Error types for Viaduct.
//!
//! Two kinds of failure are visible to callers of the dispatch core:
//!
//! - [`ViaductError::EmptyPipeline`]: a pipeline was asked to handle a
//!   request with no middleware able to produce a response
//! - [`InvalidHandlerError`]: a raw handler description did not resolve
//!   to a usable middleware
//!
//! Both are programming/configuration errors, not runtime transients.
//! They propagate synchronously out of the `resolve`/`process`/`handle`
//! call that detected them; translating them into a transport-level
//! response (e.g. a 500 with a JSON body) is the caller's choice, via
//! [`ViaductError::to_envelope`].

use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using [`ViaductError`].
pub type ViaductResult<T> = Result<T, ViaductError>;

/// Standard error type for Viaduct dispatch.
#[derive(Debug, Error)]
pub enum ViaductError {
    /// The pipeline ran out of middleware without producing a response.
    ///
    /// Raised by the implicit fallback handler installed by the
    /// zero-default `handle` form; a pipeline driven with an explicit
    /// default handler never fails this way.
    #[error("`{pipeline}` cannot handle request; there is no middleware in the pipeline to process the request")]
    EmptyPipeline {
        /// Type name of the pipeline that refused the request.
        pipeline: &'static str,
    },

    /// A raw handler description could not be resolved.
    #[error(transparent)]
    InvalidHandler(#[from] InvalidHandlerError),

    /// An application handler failed while processing a request.
    #[error("handler error: {message}")]
    Handler {
        /// Human-readable error message.
        message: String,
        /// The underlying error, if any.
        #[source]
        source: Option<anyhow::Error>,
    },

    /// Writing a response to the emission sink failed.
    #[error("failed to emit response")]
    Emit {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },
}

impl ViaductError {
    /// Creates an empty-pipeline error naming the refusing pipeline type.
    #[must_use]
    pub const fn empty_pipeline(pipeline: &'static str) -> Self {
        Self::EmptyPipeline { pipeline }
    }

    /// Creates a handler error with a message.
    #[must_use]
    pub fn handler(message: impl Into<String>) -> Self {
        Self::Handler {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a handler error with a source error.
    pub fn handler_with_source(
        message: impl Into<String>,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        Self::Handler {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Returns a machine-readable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::EmptyPipeline { .. } => "EMPTY_PIPELINE",
            Self::InvalidHandler(_) => "INVALID_HANDLER",
            Self::Handler { .. } => "HANDLER_ERROR",
            Self::Emit { .. } => "EMIT_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    ///
    /// Every dispatch failure is a server-side defect, so the mapping is
    /// uniformly `500 Internal Server Error`.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    /// Converts this error to a serializable error envelope.
    #[must_use]
    pub fn to_envelope(&self) -> ErrorEnvelope {
        ErrorEnvelope {
            error: ErrorDetail {
                code: self.code().to_string(),
                message: self.to_string(),
            },
        }
    }
}

/// Raised when a raw handler description does not match any usable shape.
///
/// Each variant carries a human-readable description of the offending
/// value (its kind or its identifier), never the value itself.
#[derive(Debug, Error)]
pub enum InvalidHandlerError {
    /// The description matched none of the recognized handler shapes.
    #[error("`{kind}` is not a valid handler")]
    NotAHandler {
        /// Kind of the received value (e.g. `null`, `number`, `empty list`).
        kind: String,
    },

    /// A string identifier did not materialize a usable instance.
    #[error("string handler `{name}` did not resolve to a middleware or request handler instance")]
    UnresolvedName {
        /// The identifier that failed to resolve.
        name: String,
    },

    /// A callable handler returned something other than a response.
    #[error("callable handler must return a response; received `{returned}`")]
    CallableNotAResponse {
        /// Kind of the returned value (e.g. `integer`, `string`).
        returned: &'static str,
    },
}

impl InvalidHandlerError {
    /// Creates an error describing an unrecognized handler shape.
    #[must_use]
    pub fn not_a_handler(kind: impl Into<String>) -> Self {
        Self::NotAHandler { kind: kind.into() }
    }

    /// Creates an error for an identifier that failed to resolve.
    #[must_use]
    pub fn unresolved_name(name: impl Into<String>) -> Self {
        Self::UnresolvedName { name: name.into() }
    }

    /// Creates an error for a callable that returned a non-response value.
    #[must_use]
    pub const fn callable_not_a_response(returned: &'static str) -> Self {
        Self::CallableNotAResponse { returned }
    }
}

/// Serializable error envelope for HTTP responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// The error details.
    pub error: ErrorDetail,
}

/// Error detail within an envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable error code.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_pipeline_message() {
        let error = ViaductError::empty_pipeline("viaduct_middleware::pipeline::Pipeline");
        let message = error.to_string();
        assert!(message.contains("viaduct_middleware::pipeline::Pipeline"));
        assert!(message.contains("no middleware in the pipeline"));
        assert_eq!(error.code(), "EMPTY_PIPELINE");
    }

    #[test]
    fn test_not_a_handler_names_kind() {
        let error = InvalidHandlerError::not_a_handler("number");
        assert_eq!(error.to_string(), "`number` is not a valid handler");
    }

    #[test]
    fn test_unresolved_name_names_identifier() {
        let error = InvalidHandlerError::unresolved_name("App\\AuthMiddleware");
        assert!(error.to_string().contains("App\\AuthMiddleware"));
    }

    #[test]
    fn test_callable_not_a_response_names_kind() {
        let error = InvalidHandlerError::callable_not_a_response("integer");
        assert!(error.to_string().contains("`integer`"));
    }

    #[test]
    fn test_invalid_handler_converts() {
        let error: ViaductError = InvalidHandlerError::not_a_handler("boolean").into();
        assert_eq!(error.code(), "INVALID_HANDLER");
        assert!(matches!(error, ViaductError::InvalidHandler(_)));
    }

    #[test]
    fn test_handler_error_with_source() {
        let source = std::io::Error::new(std::io::ErrorKind::Other, "backend down");
        let error = ViaductError::handler_with_source("lookup failed", source);
        assert!(std::error::Error::source(&error).is_some());
        assert_eq!(error.code(), "HANDLER_ERROR");
    }

    #[test]
    fn test_all_errors_map_to_server_error_status() {
        let errors = [
            ViaductError::empty_pipeline("Pipeline"),
            ViaductError::from(InvalidHandlerError::not_a_handler("null")),
            ViaductError::handler("boom"),
        ];
        for error in errors {
            assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        }
    }

    #[test]
    fn test_envelope_serialization() {
        let error = ViaductError::empty_pipeline("Pipeline");
        let envelope = error.to_envelope();

        let json = serde_json::to_string(&envelope).expect("serialization should work");
        assert!(json.contains("\"code\":\"EMPTY_PIPELINE\""));
        assert!(json.contains("cannot handle request"));
    }
}
