//! # Viaduct Middleware
//!
//! Middleware pipeline and handler resolver for the Viaduct framework.
//!
//! Requests flow through an ordered chain of middleware, each able to
//! inspect or replace the request, short-circuit with its own response, or
//! delegate to the rest of the chain, terminating in a default handler:
//!
//! ```text
//! Request → m1 → m2 → ... → mN → default handler
//!                 ↓
//!              Response (any middleware may answer directly)
//! ```
//!
//! ## Components
//!
//! | Component | Purpose |
//! |-----------|---------|
//! | [`Middleware`] / [`RequestHandler`] | The two handler contracts |
//! | [`Next`] | Per-request cursor over the remaining chain |
//! | [`Pipeline`] | Ordered, append-only middleware sequence |
//! | [`PathMiddleware`] | Scopes a middleware to a path prefix |
//! | [`RawHandler`] | Closed union of raw handler descriptions |
//! | [`Resolver`] | Normalizes descriptions into middleware |
//! | [`HandlerRegistry`] | String-keyed lookup service implementation |
//!
//! ## Example
//!
//! ```ignore
//! use viaduct_middleware::{Pipeline, RawHandler, Resolver};
//!
//! let resolver = Resolver::with_lookup(registry);
//! let mut pipeline = Pipeline::new();
//!
//! pipeline.pipe_shared(resolver.resolve(RawHandler::named("auth"))?, Some("/admin"));
//! pipeline.pipe_shared(resolver.resolve(RawHandler::named("router"))?, None);
//!
//! let response = pipeline.process(request, not_found_handler).await?;
//! ```

#![doc(html_root_url = "https://docs.rs/viaduct-middleware/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod middleware;
pub mod path;
pub mod pipeline;
pub mod raw;
pub mod registry;
pub mod resolve;

// Re-export main types at crate root
pub use middleware::{BoxFuture, FnMiddleware, FnRequestHandler, Middleware, Next, RequestHandler};
pub use path::PathMiddleware;
pub use pipeline::Pipeline;
pub use raw::RawHandler;
pub use registry::{HandlerLookup, HandlerRegistry};
pub use resolve::Resolver;
