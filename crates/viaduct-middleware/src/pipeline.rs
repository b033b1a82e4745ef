//! Ordered middleware pipeline.
//!
//! The [`Pipeline`] owns an ordered, append-only sequence of middleware and
//! drives a request through it as a chain of responsibility: the first piped
//! middleware is tried first, each middleware decides whether to delegate to
//! the rest of the chain, and a default handler sits behind the last one.
//!
//! ```text
//! Request → m1 → m2 → ... → mN → default handler
//!             ↘ (any middleware may short-circuit with its own response)
//! ```
//!
//! Middleware may be piped with a path prefix, in which case it only
//! participates for requests whose URI path starts with that prefix; for
//! every other request it is transparently skipped while keeping its
//! position in the sequence.
//!
//! The sequence is read-only during a request: `process` snapshots it into
//! a fresh [`Next`] cursor per invocation, so concurrent requests never
//! share mutable state. Piping is `&mut self` and therefore cannot overlap
//! with in-flight requests.

use std::any::type_name;
use std::sync::Arc;

use viaduct_core::{Request, Response, ViaductError, ViaductResult};

use crate::middleware::{BoxFuture, Middleware, Next, RequestHandler};
use crate::path::PathMiddleware;

/// An ordered, append-only middleware pipeline.
///
/// # Example
///
/// ```ignore
/// let mut pipeline = Pipeline::new();
/// pipeline.pipe(auth_middleware, Some("/admin"));
/// pipeline.pipe(logging_middleware, None);
///
/// let response = pipeline.process(request, terminal_handler).await?;
/// ```
#[derive(Default)]
pub struct Pipeline {
    /// Middleware in insertion order; first piped is first tried.
    middleware: Vec<Arc<dyn Middleware>>,
}

impl Pipeline {
    /// Creates an empty pipeline.
    #[must_use]
    pub fn new() -> Self {
        Self {
            middleware: Vec::new(),
        }
    }

    /// Appends a middleware to the pipeline.
    ///
    /// With `path_prefix` of `None`, `""`, or `"/"` the middleware is
    /// attached unscoped and participates for every request. Any other
    /// prefix wraps the middleware so that it only participates for
    /// requests whose URI path starts with the prefix; leading and
    /// trailing slashes in the prefix are optional (`"api"`, `"/api"`,
    /// `"api/"`, and `"/api/"` are equivalent).
    ///
    /// The same middleware can be attached to several paths, and several
    /// middleware to the same path; insertion order defines priority.
    pub fn pipe<M>(&mut self, middleware: M, path_prefix: Option<&str>)
    where
        M: Middleware,
    {
        self.pipe_shared(Arc::new(middleware), path_prefix);
    }

    /// Appends an externally shared middleware to the pipeline.
    ///
    /// Same semantics as [`pipe`](Self::pipe), for middleware already
    /// behind an `Arc` (e.g. the output of a resolver).
    pub fn pipe_shared(&mut self, middleware: Arc<dyn Middleware>, path_prefix: Option<&str>) {
        let entry = match path_prefix {
            None | Some("") | Some("/") => middleware,
            Some(prefix) => Arc::new(PathMiddleware::new(prefix, middleware)) as Arc<dyn Middleware>,
        };
        self.middleware.push(entry);
    }

    /// Handles a request with no explicit default handler.
    ///
    /// Equivalent to [`process`](Self::process) with a fallback that
    /// refuses every request: if the pipeline is empty, or every
    /// middleware falls through without producing a response, the call
    /// fails with [`ViaductError::EmptyPipeline`].
    pub async fn handle(&self, request: Request) -> ViaductResult<Response> {
        self.process(request, Arc::new(RefuseAll)).await
    }

    /// Drives a request through the chain, falling back to `default_handler`.
    ///
    /// Middleware is tried in insertion order over a snapshot of the
    /// current sequence; when the chain is exhausted, `default_handler`
    /// produces the response. With zero piped middleware the default
    /// handler is invoked directly.
    pub async fn process(
        &self,
        request: Request,
        default_handler: Arc<dyn RequestHandler>,
    ) -> ViaductResult<Response> {
        let chain: Arc<[Arc<dyn Middleware>]> = self.middleware.clone().into();
        tracing::trace!(middleware = chain.len(), "dispatching request through pipeline");
        Next::new(chain, default_handler).handle(request).await
    }

    /// Number of piped middleware.
    #[must_use]
    pub fn len(&self) -> usize {
        self.middleware.len()
    }

    /// Returns `true` if nothing has been piped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.middleware.is_empty()
    }
}

impl Middleware for Pipeline {
    fn process(&self, request: Request, next: Next) -> BoxFuture<'_, ViaductResult<Response>> {
        // A nested pipeline delegates to the outer chain once its own
        // middleware is exhausted.
        Box::pin(self.process(request, Arc::new(next) as Arc<dyn RequestHandler>))
    }
}

impl RequestHandler for Pipeline {
    fn handle(&self, request: Request) -> BoxFuture<'_, ViaductResult<Response>> {
        Box::pin(self.handle(request))
    }
}

/// Terminal handler behind [`Pipeline::handle`]; refuses every request.
struct RefuseAll;

impl RequestHandler for RefuseAll {
    fn handle(&self, _request: Request) -> BoxFuture<'_, ViaductResult<Response>> {
        Box::pin(async {
            Err(ViaductError::empty_pipeline(type_name::<Pipeline>()))
        })
    }
}
