//! Raw handler descriptions.
//!
//! A [`RawHandler`] is the input accepted by the resolver: a closed union
//! over every handler shape the framework recognizes. Descriptions are
//! classified once, at the boundary where they enter the system (either
//! directly through the constructors here, or from configuration via
//! [`RawHandler::from_config`]) and then dispatched by pattern match, so
//! an unrecognized shape is a constructor-time or resolve-time error, never
//! a surprise mid-request.
//!
//! Descriptions are not persisted: they are consumed by
//! [`Resolver::resolve`](crate::Resolver::resolve).

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use viaduct_core::{InvalidHandlerError, Request};

use crate::middleware::{Middleware, Next, RequestHandler};

/// Type-erased value returned by a callable handler.
///
/// Callables are synchronous; whatever they return is inspected at
/// process-time and must downcast to a [`Response`](viaduct_core::Response).
pub type CallableReturn = Box<dyn Any + Send>;

/// A callable taking no arguments.
pub type NullaryCallable = Arc<dyn Fn() -> CallableReturn + Send + Sync>;

/// A callable taking the request.
pub type UnaryCallable = Arc<dyn Fn(Request) -> CallableReturn + Send + Sync>;

/// A callable taking the request and the chain cursor.
pub type BinaryCallable = Arc<dyn Fn(Request, Next) -> CallableReturn + Send + Sync>;

/// A raw, not-yet-resolved handler description.
#[derive(Clone)]
pub enum RawHandler {
    /// An existing middleware instance; resolves to itself.
    Middleware(Arc<dyn Middleware>),

    /// A terminal handler instance; resolves to a middleware that never
    /// delegates.
    Handler(Arc<dyn RequestHandler>),

    /// A string identifier resolved through the lookup service or the
    /// resolver's constructor table.
    Named(String),

    /// A zero-argument callable.
    Callable0(NullaryCallable),

    /// A callable over the request.
    Callable1(UnaryCallable),

    /// A callable over the request and the chain cursor.
    Callable2(BinaryCallable),

    /// An ordered list of descriptions; resolves to a nested pipeline.
    /// Must be non-empty.
    List(Vec<RawHandler>),
}

impl RawHandler {
    /// Wraps a middleware instance.
    pub fn middleware<M: Middleware>(middleware: M) -> Self {
        Self::Middleware(Arc::new(middleware))
    }

    /// Wraps a terminal handler instance.
    pub fn handler<H: RequestHandler>(handler: H) -> Self {
        Self::Handler(Arc::new(handler))
    }

    /// Describes a handler by identifier.
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    /// Wraps a zero-argument callable.
    pub fn callable0<F, R>(func: F) -> Self
    where
        F: Fn() -> R + Send + Sync + 'static,
        R: Any + Send,
    {
        Self::Callable0(Arc::new(move || Box::new(func()) as CallableReturn))
    }

    /// Wraps a callable over the request.
    pub fn callable1<F, R>(func: F) -> Self
    where
        F: Fn(Request) -> R + Send + Sync + 'static,
        R: Any + Send,
    {
        Self::Callable1(Arc::new(move |request| {
            Box::new(func(request)) as CallableReturn
        }))
    }

    /// Wraps a callable over the request and the chain cursor.
    pub fn callable2<F, R>(func: F) -> Self
    where
        F: Fn(Request, Next) -> R + Send + Sync + 'static,
        R: Any + Send,
    {
        Self::Callable2(Arc::new(move |request, next| {
            Box::new(func(request, next)) as CallableReturn
        }))
    }

    /// Describes an ordered list of handlers.
    pub fn list(handlers: impl IntoIterator<Item = RawHandler>) -> Self {
        Self::List(handlers.into_iter().collect())
    }

    /// Short name of this description's shape, for diagnostics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Middleware(_) => "middleware",
            Self::Handler(_) => "request handler",
            Self::Named(_) => "string",
            Self::Callable0(_) | Self::Callable1(_) | Self::Callable2(_) => "callable",
            Self::List(_) => "list",
        }
    }

    /// Classifies a configuration value into a handler description.
    ///
    /// Strings become identifiers and non-empty arrays become lists,
    /// recursively. Every other kind (null, booleans, numbers, empty
    /// arrays, objects) is rejected with an error naming the kind.
    pub fn from_config(value: &Value) -> Result<Self, InvalidHandlerError> {
        match value {
            Value::String(name) => Ok(Self::Named(name.clone())),
            Value::Array(items) if !items.is_empty() => {
                let handlers = items
                    .iter()
                    .map(Self::from_config)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Self::List(handlers))
            }
            Value::Array(_) => Err(InvalidHandlerError::not_a_handler("empty array")),
            Value::Null => Err(InvalidHandlerError::not_a_handler("null")),
            Value::Bool(_) => Err(InvalidHandlerError::not_a_handler("boolean")),
            Value::Number(_) => Err(InvalidHandlerError::not_a_handler("number")),
            Value::Object(_) => Err(InvalidHandlerError::not_a_handler("object")),
        }
    }
}

impl fmt::Debug for RawHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => f.debug_tuple("Named").field(name).finish(),
            Self::List(handlers) => f.debug_tuple("List").field(&handlers.len()).finish(),
            other => f.write_str(other.kind()),
        }
    }
}

impl From<&str> for RawHandler {
    fn from(name: &str) -> Self {
        Self::named(name)
    }
}

impl From<String> for RawHandler {
    fn from(name: String) -> Self {
        Self::Named(name)
    }
}

impl From<Vec<RawHandler>> for RawHandler {
    fn from(handlers: Vec<RawHandler>) -> Self {
        Self::List(handlers)
    }
}

/// Describes the kind of a callable's return value for error reporting.
///
/// The counterpart of reporting a dynamic value's type name: the value
/// itself is never echoed back, only its kind.
pub(crate) fn describe_return(value: &(dyn Any + Send)) -> &'static str {
    if value.is::<i8>()
        || value.is::<i16>()
        || value.is::<i32>()
        || value.is::<i64>()
        || value.is::<i128>()
        || value.is::<isize>()
        || value.is::<u8>()
        || value.is::<u16>()
        || value.is::<u32>()
        || value.is::<u64>()
        || value.is::<u128>()
        || value.is::<usize>()
    {
        "integer"
    } else if value.is::<f32>() || value.is::<f64>() {
        "float"
    } else if value.is::<bool>() {
        "boolean"
    } else if value.is::<String>() || value.is::<&str>() {
        "string"
    } else if value.is::<()>() {
        "unit"
    } else {
        "unrecognized value"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_names() {
        assert_eq!(RawHandler::named("auth").kind(), "string");
        assert_eq!(RawHandler::callable0(|| 1).kind(), "callable");
        assert_eq!(RawHandler::list([RawHandler::named("a")]).kind(), "list");
    }

    #[test]
    fn test_from_config_strings_and_arrays() {
        let raw = RawHandler::from_config(&json!(["auth", ["logging", "router"]])).unwrap();

        let RawHandler::List(outer) = raw else {
            panic!("expected list");
        };
        assert_eq!(outer.len(), 2);
        assert!(matches!(&outer[0], RawHandler::Named(name) if name == "auth"));
        assert!(matches!(&outer[1], RawHandler::List(inner) if inner.len() == 2));
    }

    #[test]
    fn test_from_config_rejects_invalid_kinds() {
        for (value, kind) in [
            (json!(null), "null"),
            (json!(true), "boolean"),
            (json!(42), "number"),
            (json!([]), "empty array"),
            (json!({"name": "auth"}), "object"),
        ] {
            let error = RawHandler::from_config(&value).unwrap_err();
            assert!(
                error.to_string().contains(kind),
                "expected `{kind}` in `{error}`"
            );
        }
    }

    #[test]
    fn test_from_config_rejects_nested_invalid_element() {
        let error = RawHandler::from_config(&json!(["auth", 7])).unwrap_err();
        assert!(error.to_string().contains("number"));
    }

    #[test]
    fn test_describe_return_kinds() {
        let cases: Vec<(CallableReturn, &str)> = vec![
            (Box::new(42_i32), "integer"),
            (Box::new(42_u64), "integer"),
            (Box::new(1.5_f64), "float"),
            (Box::new(true), "boolean"),
            (Box::new("text".to_string()), "string"),
            (Box::new(()), "unit"),
            (Box::new(vec![1_u8]), "unrecognized value"),
        ];
        for (value, expected) in cases {
            assert_eq!(describe_return(value.as_ref()), expected);
        }
    }
}
