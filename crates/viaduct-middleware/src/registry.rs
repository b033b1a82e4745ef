//! Handler lookup service and registry.
//!
//! The resolver materializes string identifiers through an optional
//! [`HandlerLookup`] capability. [`HandlerRegistry`] is the in-crate
//! implementation: a string-keyed registry holding ready handler
//! descriptions or zero-argument factories.
//!
//! # Example
//!
//! ```ignore
//! let mut registry = HandlerRegistry::new();
//! registry.register("auth", RawHandler::middleware(AuthMiddleware::new(keys)));
//! registry.register_factory("request-log", || RawHandler::middleware(LogMiddleware::default()));
//!
//! let resolver = Resolver::with_lookup(Arc::new(registry));
//! ```

use std::collections::HashMap;

use crate::raw::RawHandler;

/// Capability for materializing handler instances by identifier.
///
/// `get` returning `None` is the "not found" failure; a well-behaved
/// implementation returns `Some` for every identifier `has` reports.
pub trait HandlerLookup: Send + Sync {
    /// Returns `true` if this lookup knows the identifier.
    fn has(&self, id: &str) -> bool;

    /// Materializes the handler registered under `id`, if any.
    fn get(&self, id: &str) -> Option<RawHandler>;
}

/// A registered entry: a ready description or a factory producing one.
enum RegistryEntry {
    Instance(RawHandler),
    Factory(Box<dyn Fn() -> RawHandler + Send + Sync>),
}

/// String-keyed registry of handler descriptions.
///
/// Entries registered with [`register`](Self::register) are shared: every
/// lookup returns a clone of the same description (handler instances are
/// behind `Arc`s). Entries registered with
/// [`register_factory`](Self::register_factory) are constructed fresh on
/// every lookup.
#[derive(Default)]
pub struct HandlerRegistry {
    entries: HashMap<String, RegistryEntry>,
}

impl HandlerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Registers a ready handler description under `id`.
    pub fn register(&mut self, id: impl Into<String>, handler: RawHandler) {
        self.entries
            .insert(id.into(), RegistryEntry::Instance(handler));
    }

    /// Registers a factory constructing the description on every lookup.
    pub fn register_factory<F>(&mut self, id: impl Into<String>, factory: F)
    where
        F: Fn() -> RawHandler + Send + Sync + 'static,
    {
        self.entries
            .insert(id.into(), RegistryEntry::Factory(Box::new(factory)));
    }

    /// Returns `true` if an entry is registered under `id`.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Number of registered entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no entries are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl HandlerLookup for HandlerRegistry {
    fn has(&self, id: &str) -> bool {
        self.contains(id)
    }

    fn get(&self, id: &str) -> Option<RawHandler> {
        self.entries.get(id).map(|entry| match entry {
            RegistryEntry::Instance(handler) => handler.clone(),
            RegistryEntry::Factory(factory) => factory(),
        })
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("entries", &self.entries.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_registry() {
        let registry = HandlerRegistry::new();
        assert!(registry.is_empty());
        assert!(!registry.has("auth"));
        assert!(registry.get("auth").is_none());
    }

    #[test]
    fn test_register_instance() {
        let mut registry = HandlerRegistry::new();
        registry.register("auth", RawHandler::named("auth-inner"));

        assert!(registry.has("auth"));
        assert_eq!(registry.len(), 1);
        assert!(matches!(
            registry.get("auth"),
            Some(RawHandler::Named(name)) if name == "auth-inner"
        ));
    }

    #[test]
    fn test_register_factory_constructs_per_lookup() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        let constructed = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&constructed);

        let mut registry = HandlerRegistry::new();
        registry.register_factory("fresh", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            RawHandler::named("fresh-inner")
        });

        assert!(registry.get("fresh").is_some());
        assert!(registry.get("fresh").is_some());
        assert_eq!(constructed.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_reregistration_replaces_entry() {
        let mut registry = HandlerRegistry::new();
        registry.register("auth", RawHandler::named("v1"));
        registry.register("auth", RawHandler::named("v2"));

        assert_eq!(registry.len(), 1);
        assert!(matches!(
            registry.get("auth"),
            Some(RawHandler::Named(name)) if name == "v2"
        ));
    }
}
