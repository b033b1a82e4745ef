//! Handler resolution.
//!
//! The [`Resolver`] normalizes heterogeneous [`RawHandler`] descriptions
//! into the uniform [`Middleware`] contract:
//!
//! - middleware instances resolve to themselves;
//! - terminal handlers are wrapped so they ignore the chain cursor;
//! - string identifiers are materialized through the optional lookup
//!   service, or the resolver's own constructor table, and re-classified;
//! - callables are wrapped so their return value is checked at
//!   process-time;
//! - lists resolve element by element into a nested [`Pipeline`].
//!
//! Resolution is eager and all-or-nothing: a malformed description, or a
//! malformed element anywhere inside a nested list, fails the whole
//! `resolve` call before any request is processed, and no partially-built
//! handler is ever returned.

use std::collections::HashMap;
use std::sync::Arc;

use viaduct_core::{InvalidHandlerError, Request, Response, ViaductResult};

use crate::middleware::{BoxFuture, Middleware, Next, RequestHandler};
use crate::pipeline::Pipeline;
use crate::raw::{describe_return, BinaryCallable, NullaryCallable, RawHandler, UnaryCallable};
use crate::registry::HandlerLookup;

/// Factory constructing a handler description for an identifier.
type ConstructorFn = Box<dyn Fn() -> RawHandler + Send + Sync>;

/// Normalizes raw handler descriptions into middleware.
///
/// # Example
///
/// ```ignore
/// let mut resolver = Resolver::with_lookup(registry);
/// resolver.register::<CorsMiddleware>("cors");
///
/// let middleware = resolver.resolve(RawHandler::list([
///     RawHandler::named("cors"),
///     RawHandler::middleware(LoggingMiddleware::default()),
/// ]))?;
/// pipeline.pipe_shared(middleware, None);
/// ```
#[derive(Default)]
pub struct Resolver {
    /// Optional external lookup service, consulted first for identifiers.
    lookup: Option<Arc<dyn HandlerLookup>>,

    /// Identifiers constructible directly, without the lookup service.
    constructors: HashMap<String, ConstructorFn>,
}

impl Resolver {
    /// Creates a resolver without a lookup service.
    ///
    /// Identifiers then resolve only through the constructor table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a resolver backed by a lookup service.
    #[must_use]
    pub fn with_lookup(lookup: Arc<dyn HandlerLookup>) -> Self {
        Self {
            lookup: Some(lookup),
            constructors: HashMap::new(),
        }
    }

    /// Makes a default-constructible middleware resolvable by name.
    pub fn register<M>(&mut self, name: impl Into<String>)
    where
        M: Middleware + Default,
    {
        self.register_with(name, || RawHandler::middleware(M::default()));
    }

    /// Makes a default-constructible terminal handler resolvable by name.
    pub fn register_handler<H>(&mut self, name: impl Into<String>)
    where
        H: RequestHandler + Default,
    {
        self.register_with(name, || RawHandler::handler(H::default()));
    }

    /// Makes an identifier resolvable through an explicit constructor.
    pub fn register_with<F>(&mut self, name: impl Into<String>, constructor: F)
    where
        F: Fn() -> RawHandler + Send + Sync + 'static,
    {
        self.constructors.insert(name.into(), Box::new(constructor));
    }

    /// Resolves a raw handler description into middleware.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidHandlerError`] if the description (or any element
    /// of a nested list) does not resolve to a usable handler.
    pub fn resolve(&self, handler: RawHandler) -> Result<Arc<dyn Middleware>, InvalidHandlerError> {
        match handler {
            RawHandler::Middleware(middleware) => Ok(middleware),
            RawHandler::Handler(handler) => Ok(Arc::new(HandlerMiddleware { inner: handler })),
            RawHandler::Named(name) => self.resolve_named(&name),
            RawHandler::Callable0(func) => Ok(callable_middleware(Callable::Nullary(func))),
            RawHandler::Callable1(func) => Ok(callable_middleware(Callable::Unary(func))),
            RawHandler::Callable2(func) => Ok(callable_middleware(Callable::Binary(func))),
            RawHandler::List(handlers) => self.resolve_list(handlers),
        }
    }

    /// Materializes an identifier and re-classifies the resulting instance.
    ///
    /// The lookup service wins when it knows the name; otherwise the
    /// constructor table is tried. The materialized instance must itself be
    /// a middleware, terminal handler, or callable; anything else, or a
    /// miss in both sources, fails naming the identifier.
    fn resolve_named(&self, name: &str) -> Result<Arc<dyn Middleware>, InvalidHandlerError> {
        let instance = match &self.lookup {
            Some(lookup) if lookup.has(name) => {
                tracing::debug!(name, "resolving handler through lookup service");
                lookup.get(name)
            }
            _ => self.constructors.get(name).map(|constructor| {
                tracing::debug!(name, "constructing handler directly");
                constructor()
            }),
        };

        match instance {
            Some(RawHandler::Middleware(middleware)) => Ok(middleware),
            Some(RawHandler::Handler(handler)) => {
                Ok(Arc::new(HandlerMiddleware { inner: handler }))
            }
            Some(RawHandler::Callable0(func)) => Ok(callable_middleware(Callable::Nullary(func))),
            Some(RawHandler::Callable1(func)) => Ok(callable_middleware(Callable::Unary(func))),
            Some(RawHandler::Callable2(func)) => Ok(callable_middleware(Callable::Binary(func))),
            Some(RawHandler::Named(_) | RawHandler::List(_)) | None => {
                Err(InvalidHandlerError::unresolved_name(name))
            }
        }
    }

    /// Resolves a list into a nested pipeline, preserving order.
    fn resolve_list(
        &self,
        handlers: Vec<RawHandler>,
    ) -> Result<Arc<dyn Middleware>, InvalidHandlerError> {
        if handlers.is_empty() {
            return Err(InvalidHandlerError::not_a_handler("empty list"));
        }

        let mut pipeline = Pipeline::new();
        for handler in handlers {
            pipeline.pipe_shared(self.resolve(handler)?, None);
        }
        Ok(Arc::new(pipeline))
    }
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("lookup", &self.lookup.is_some())
            .field("constructors", &self.constructors.len())
            .finish()
    }
}

/// Adapter making a terminal handler usable as middleware.
///
/// It never delegates: the chain cursor is ignored and the wrapped handler
/// always produces the response.
struct HandlerMiddleware {
    inner: Arc<dyn RequestHandler>,
}

impl Middleware for HandlerMiddleware {
    fn process(&self, request: Request, _next: Next) -> BoxFuture<'_, ViaductResult<Response>> {
        self.inner.handle(request)
    }
}

/// A resolved callable, tagged by arity.
enum Callable {
    Nullary(NullaryCallable),
    Unary(UnaryCallable),
    Binary(BinaryCallable),
}

/// Adapter invoking a callable and checking its return value.
struct CallableMiddleware {
    callable: Callable,
}

fn callable_middleware(callable: Callable) -> Arc<dyn Middleware> {
    Arc::new(CallableMiddleware { callable })
}

impl Middleware for CallableMiddleware {
    fn process(&self, request: Request, next: Next) -> BoxFuture<'_, ViaductResult<Response>> {
        Box::pin(async move {
            let returned = match &self.callable {
                Callable::Nullary(func) => func(),
                Callable::Unary(func) => func(request),
                Callable::Binary(func) => func(request, next),
            };

            match returned.downcast::<Response>() {
                Ok(response) => Ok(*response),
                Err(other) => Err(InvalidHandlerError::callable_not_a_response(
                    describe_return(other.as_ref()),
                )
                .into()),
            }
        })
    }
}
