//! # Viaduct
//!
//! **Request-dispatch core for HTTP servers**
//!
//! Viaduct routes an incoming request through an ordered chain of
//! middleware, each able to inspect or replace the request, short-circuit
//! with a response, or delegate to the rest of the chain, terminating in a
//! default handler:
//!
//! ```text
//! Request → m1 → m2 → ... → mN → default handler
//!                 ↓
//!              Response
//! ```
//!
//! - **Pipeline**: ordered, append-only chain of responsibility with
//!   path-prefix scoping
//! - **Resolver**: normalizes heterogeneous handler descriptions
//!   (instances, identifiers, callables, nested lists) into one contract
//! - **Runner**: drives the pipeline and emits responses, suppressing
//!   bodies for HEAD requests and bodyless status codes
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use viaduct::prelude::*;
//!
//! let mut registry = HandlerRegistry::new();
//! registry.register("auth", RawHandler::middleware(AuthMiddleware::new(keys)));
//!
//! let resolver = Resolver::with_lookup(Arc::new(registry));
//!
//! let mut pipeline = Pipeline::new();
//! pipeline.pipe_shared(resolver.resolve(RawHandler::named("auth"))?, Some("/admin"));
//! pipeline.pipe(router_middleware, None);
//!
//! let runner = RequestRunner::new(pipeline, Arc::new(emitter));
//! runner.run(request).await?;
//! ```

#![doc(html_root_url = "https://docs.rs/viaduct/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use viaduct_core as core;

// Re-export middleware types
pub use viaduct_middleware as middleware;

// Re-export runner types
pub use viaduct_runner as runner;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust,ignore
/// use viaduct::prelude::*;
/// ```
pub mod prelude {
    pub use viaduct_core::{
        ErrorEnvelope, InvalidHandlerError, Request, Response, ResponseExt, ViaductError,
        ViaductResult,
    };

    // Re-export pipeline and resolver types
    pub use viaduct_middleware::{
        BoxFuture, FnMiddleware, FnRequestHandler, HandlerLookup, HandlerRegistry, Middleware,
        Next, PathMiddleware, Pipeline, RawHandler, RequestHandler, Resolver,
    };

    // Re-export runner types
    pub use viaduct_runner::{error_response, Emitter, RequestRunner, WriteEmitter};
}
