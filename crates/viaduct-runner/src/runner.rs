//! Request running.
//!
//! [`RequestRunner`] is the thin glue between a transport and the dispatch
//! core: it drives a request through its pipeline, decides whether the
//! response body must be suppressed, and hands the response to the
//! configured [`Emitter`].
//!
//! Dispatch failures propagate to the caller untranslated; a server loop
//! that prefers answering with a 500 can build one with
//! [`error_response`].

use std::sync::Arc;

use http::StatusCode;
use viaduct_core::{Request, Response, ResponseExt, ViaductError, ViaductResult};
use viaduct_middleware::{Pipeline, RequestHandler};

use crate::emitter::Emitter;

/// Status codes whose responses carry no body.
pub const NO_BODY_STATUS: [u16; 6] = [100, 101, 102, 204, 205, 304];

/// Drives requests through a pipeline and emits the responses.
///
/// # Example
///
/// ```ignore
/// let runner = RequestRunner::new(pipeline, Arc::new(emitter));
/// runner.run(request).await?;
/// ```
pub struct RequestRunner {
    /// The dispatch pipeline.
    pipeline: Pipeline,

    /// Sink receiving finished responses.
    emitter: Arc<dyn Emitter>,
}

impl RequestRunner {
    /// Creates a runner over `pipeline`, emitting through `emitter`.
    #[must_use]
    pub fn new(pipeline: Pipeline, emitter: Arc<dyn Emitter>) -> Self {
        Self { pipeline, emitter }
    }

    /// Returns a reference to the pipeline.
    #[must_use]
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Returns a mutable reference to the pipeline, for piping middleware
    /// before serving begins.
    pub fn pipeline_mut(&mut self) -> &mut Pipeline {
        &mut self.pipeline
    }

    /// Runs a request with no explicit default handler.
    ///
    /// Fails with [`ViaductError::EmptyPipeline`] when the pipeline cannot
    /// produce a response.
    pub async fn run(&self, request: Request) -> ViaductResult<()> {
        let method = request.method().clone();
        tracing::debug!(method = %method, path = request.uri().path(), "dispatching request");

        let response = self.pipeline.handle(request).await?;
        self.finish(method.as_str(), response).await
    }

    /// Runs a request, falling back to `default_handler` when the chain is
    /// exhausted.
    pub async fn run_with(
        &self,
        request: Request,
        default_handler: Arc<dyn RequestHandler>,
    ) -> ViaductResult<()> {
        let method = request.method().clone();
        tracing::debug!(method = %method, path = request.uri().path(), "dispatching request");

        let response = self.pipeline.process(request, default_handler).await?;
        self.finish(method.as_str(), response).await
    }

    async fn finish(&self, method: &str, response: Response) -> ViaductResult<()> {
        let without_body = response_without_body(method, response.status());
        tracing::debug!(
            status = response.status().as_u16(),
            without_body,
            "emitting response"
        );
        self.emitter.emit(response, without_body).await
    }
}

/// Returns `true` if a response to `method` with `status` carries no body.
///
/// HEAD responses never carry a body, regardless of status; otherwise the
/// decision follows [`NO_BODY_STATUS`].
#[must_use]
pub fn response_without_body(method: &str, status: StatusCode) -> bool {
    method.eq_ignore_ascii_case("HEAD") || NO_BODY_STATUS.contains(&status.as_u16())
}

/// Builds a JSON error response for a dispatch failure.
///
/// For server loops that translate failures into a transport-level
/// response instead of propagating them.
#[must_use]
pub fn error_response(error: &ViaductError) -> Response {
    Response::json_error(error.status_code(), error.code(), &error.to_string())
}
