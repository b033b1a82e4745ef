//! Core middleware and request-handler contracts.
//!
//! This module defines the two traits every participant in the dispatch
//! chain implements, and the [`Next`] cursor that links them together.
//!
//! A [`Middleware`] receives the request together with a [`Next`] cursor
//! representing the rest of the chain. It may short-circuit with its own
//! response, delegate by invoking the cursor, or invoke the cursor several
//! times (e.g. a retry wrapper); every invocation resumes from the same
//! unconsumed remainder.
//!
//! A [`RequestHandler`] is terminal: it has no concept of delegation and
//! always produces a response directly.
//!
//! # Example
//!
//! ```ignore
//! use viaduct_middleware::{Middleware, Next, BoxFuture};
//! use viaduct_core::{Request, Response, ViaductResult};
//!
//! struct LoggingMiddleware;
//!
//! impl Middleware for LoggingMiddleware {
//!     fn process(&self, request: Request, next: Next) -> BoxFuture<'_, ViaductResult<Response>> {
//!         Box::pin(async move {
//!             println!("-> {}", request.uri().path());
//!             let response = next.handle(request).await?;
//!             println!("<- {}", response.status());
//!             Ok(response)
//!         })
//!     }
//! }
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use viaduct_core::{Request, Response, ViaductResult};

/// A boxed future resolving to `T`.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A terminal request handler.
///
/// Terminal handlers produce a response directly, with no downstream chain
/// to delegate to. The pipeline uses them as the fallback reached when every
/// middleware has passed the request along.
pub trait RequestHandler: Send + Sync + 'static {
    /// Handles a request and produces a response.
    fn handle(&self, request: Request) -> BoxFuture<'_, ViaductResult<Response>>;
}

/// A middleware participating in the dispatch chain.
///
/// # Invariants
///
/// - Middleware decides independently whether to invoke `next`: zero times
///   (short-circuit), once (normal delegation), or more than once (retry).
/// - Middleware MUST NOT assume it is the only observer of a request; later
///   middleware sees whatever request value is passed to `next`.
pub trait Middleware: Send + Sync + 'static {
    /// Processes the request, optionally delegating to the rest of the chain.
    fn process(&self, request: Request, next: Next) -> BoxFuture<'_, ViaductResult<Response>>;
}

impl<M> Middleware for Arc<M>
where
    M: Middleware + ?Sized,
{
    fn process(&self, request: Request, next: Next) -> BoxFuture<'_, ViaductResult<Response>> {
        (**self).process(request, next)
    }
}

impl<H> RequestHandler for Arc<H>
where
    H: RequestHandler + ?Sized,
{
    fn handle(&self, request: Request) -> BoxFuture<'_, ViaductResult<Response>> {
        (**self).handle(request)
    }
}

/// Cursor over the rest of the dispatch chain.
///
/// A `Next` is an ephemeral, request-scoped view of `{remaining middleware,
/// fallback handler}`. Invoking it consumes exactly one middleware from the
/// front of the remainder and hands that middleware a fresh cursor for the
/// rest; once the remainder is empty, control passes to the fallback
/// handler.
///
/// The remainder is an index into an immutable snapshot of the pipeline's
/// middleware sequence, so invoking the same cursor twice resumes from the
/// same position both times.
#[derive(Clone)]
pub struct Next {
    /// Snapshot of the full middleware sequence for this invocation.
    chain: Arc<[Arc<dyn Middleware>]>,

    /// Position of the next middleware to try.
    index: usize,

    /// Handler invoked when the chain is exhausted.
    fallback: Arc<dyn RequestHandler>,
}

impl Next {
    /// Creates a cursor over `chain` falling back to `fallback`.
    ///
    /// Normally created by `Pipeline::process`; exposed for driving a
    /// single middleware directly, e.g. in tests.
    #[must_use]
    pub fn new(chain: Arc<[Arc<dyn Middleware>]>, fallback: Arc<dyn RequestHandler>) -> Self {
        Self {
            chain,
            index: 0,
            fallback,
        }
    }

    /// Creates a cursor with an empty chain: invoking it goes straight to
    /// `fallback`.
    #[must_use]
    pub fn terminal(fallback: Arc<dyn RequestHandler>) -> Self {
        Self::new(Arc::from(Vec::new()), fallback)
    }

    /// Number of middleware left in front of the fallback handler.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.chain.len().saturating_sub(self.index)
    }

    /// The cursor for everything after the middleware at the front.
    fn advance(&self) -> Self {
        Self {
            chain: Arc::clone(&self.chain),
            index: self.index + 1,
            fallback: Arc::clone(&self.fallback),
        }
    }
}

impl RequestHandler for Next {
    fn handle(&self, request: Request) -> BoxFuture<'_, ViaductResult<Response>> {
        match self.chain.get(self.index) {
            Some(middleware) => middleware.process(request, self.advance()),
            None => self.fallback.handle(request),
        }
    }
}

impl std::fmt::Debug for Next {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Next")
            .field("remaining", &self.remaining())
            .finish_non_exhaustive()
    }
}

/// A middleware created from an async closure.
///
/// # Example
///
/// ```ignore
/// let middleware = FnMiddleware::new(|request, next| async move {
///     next.handle(request).await
/// });
/// ```
pub struct FnMiddleware<F> {
    func: F,
}

impl<F> FnMiddleware<F> {
    /// Creates a new function-based middleware.
    pub const fn new(func: F) -> Self {
        Self { func }
    }
}

impl<F, Fut> Middleware for FnMiddleware<F>
where
    F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ViaductResult<Response>> + Send + 'static,
{
    fn process(&self, request: Request, next: Next) -> BoxFuture<'_, ViaductResult<Response>> {
        Box::pin((self.func)(request, next))
    }
}

/// A terminal handler created from an async closure.
pub struct FnRequestHandler<F> {
    func: F,
}

impl<F> FnRequestHandler<F> {
    /// Creates a new function-based request handler.
    pub const fn new(func: F) -> Self {
        Self { func }
    }
}

impl<F, Fut> RequestHandler for FnRequestHandler<F>
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ViaductResult<Response>> + Send + 'static,
{
    fn handle(&self, request: Request) -> BoxFuture<'_, ViaductResult<Response>> {
        Box::pin((self.func)(request))
    }
}
