//! Path-prefix normalization and scoping.
//!
//! Prefixes and request paths are compared in a single normalized form:
//! `/` for the root, otherwise `/segment/.../segment/` with exactly one
//! leading and one trailing slash. Normalizing is idempotent, so a prefix
//! normalized at pipe-time and a request path normalized at process-time
//! compare consistently.

use std::sync::Arc;

use viaduct_core::{Request, Response, ViaductResult};

use crate::middleware::{BoxFuture, Middleware, Next, RequestHandler};

/// Normalizes a path or path prefix.
///
/// All leading and trailing slashes are trimmed and the remainder is
/// re-wrapped as `/segments/`; an empty remainder normalizes to `/`.
///
/// # Example
///
/// ```
/// use viaduct_middleware::path::normalize_path;
///
/// assert_eq!(normalize_path("api"), "/api/");
/// assert_eq!(normalize_path("/api/"), "/api/");
/// assert_eq!(normalize_path("foo/bar"), "/foo/bar/");
/// assert_eq!(normalize_path("/"), "/");
/// assert_eq!(normalize_path(""), "/");
/// ```
#[must_use]
pub fn normalize_path(path: &str) -> String {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        "/".to_owned()
    } else {
        format!("/{trimmed}/")
    }
}

/// Returns `true` if a normalized path falls under a normalized prefix.
///
/// The root prefix `/` matches every path; any other prefix matches iff
/// the path starts with it, compared ASCII case-insensitively. Both
/// arguments are expected in the form produced by [`normalize_path`],
/// which is what makes `/foo/` match `/foo/bar/` but not `/foobar/`.
#[must_use]
pub fn path_matches(prefix: &str, path: &str) -> bool {
    if prefix == "/" {
        return true;
    }
    let prefix = prefix.as_bytes();
    let path = path.as_bytes();
    path.len() >= prefix.len() && path[..prefix.len()].eq_ignore_ascii_case(prefix)
}

/// Middleware wrapper that scopes its inner middleware to a path prefix.
///
/// On a matching request the wrapped middleware runs with the unchanged
/// cursor; on a mismatch the wrapper skips straight to the cursor, so a
/// non-matching scoped middleware behaves as if absent for this request
/// while keeping its position in the sequence for later ones.
pub struct PathMiddleware {
    /// Normalized prefix, fixed at construction.
    prefix: String,

    /// The scoped middleware.
    inner: Arc<dyn Middleware>,
}

impl PathMiddleware {
    /// Wraps `inner` so it only participates under `prefix`.
    ///
    /// The prefix is normalized once here; the request path is normalized
    /// lazily on every `process` call.
    #[must_use]
    pub fn new(prefix: &str, inner: Arc<dyn Middleware>) -> Self {
        Self {
            prefix: normalize_path(prefix),
            inner,
        }
    }

    /// The normalized prefix this middleware is attached to.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl Middleware for PathMiddleware {
    fn process(&self, request: Request, next: Next) -> BoxFuture<'_, ViaductResult<Response>> {
        let path = normalize_path(request.uri().path());

        if path_matches(&self.prefix, &path) {
            self.inner.process(request, next)
        } else {
            tracing::trace!(prefix = %self.prefix, path = %path, "path prefix mismatch, skipping middleware");
            Box::pin(async move { next.handle(request).await })
        }
    }
}
