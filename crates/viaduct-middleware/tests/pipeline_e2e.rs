//! End-to-end dispatch tests.
//!
//! These tests exercise the pipeline and resolver together the way a
//! server assembles them: descriptions resolved up front, piped with and
//! without path prefixes, then driven with real requests.

use std::sync::Arc;

use bytes::Bytes;
use http::StatusCode;
use http_body_util::Full;
use viaduct_core::{InvalidHandlerError, Request, Response, ResponseExt, ViaductError, ViaductResult};
use viaduct_middleware::{
    FnMiddleware, FnRequestHandler, HandlerRegistry, Next, Pipeline, RawHandler, RequestHandler,
    Resolver,
};

fn make_request(path: &str) -> Request {
    http::Request::builder()
        .uri(path)
        .body(Full::new(Bytes::new()))
        .unwrap()
}

fn terminal() -> Arc<dyn RequestHandler> {
    Arc::new(FnRequestHandler::new(|_request| async {
        Ok::<_, ViaductError>(Response::text(StatusCode::OK, "terminal"))
    }))
}

/// Middleware appending its name to the `x-trace` header after delegating.
fn tracing_middleware(name: &'static str) -> RawHandler {
    RawHandler::middleware(FnMiddleware::new(move |request, next: Next| async move {
        let mut response = next.handle(request).await?;
        response
            .headers_mut()
            .append("x-trace", name.parse().unwrap());
        Ok::<_, ViaductError>(response)
    }))
}

fn trace(response: &Response) -> Vec<&str> {
    response
        .headers()
        .get_all("x-trace")
        .iter()
        .map(|value| value.to_str().unwrap())
        .collect()
}

#[tokio::test]
async fn test_three_tracing_middlewares_unwind_in_reverse() {
    let resolver = Resolver::new();
    let mut pipeline = Pipeline::new();

    for name in ["M1", "M2", "M3"] {
        pipeline.pipe_shared(resolver.resolve(tracing_middleware(name)).unwrap(), None);
    }

    let response = pipeline
        .process(make_request("/"), terminal())
        .await
        .unwrap();
    // Each middleware appends after calling next, so the last middleware's
    // marker is observed first.
    assert_eq!(trace(&response), ["M3", "M2", "M1"]);
}

#[tokio::test]
async fn test_scoped_middleware_skipped_for_other_paths() {
    let mut pipeline = Pipeline::new();

    let resolver = Resolver::new();
    pipeline.pipe_shared(
        resolver.resolve(tracing_middleware("api")).unwrap(),
        Some("/api"),
    );
    pipeline.pipe_shared(
        resolver.resolve(tracing_middleware("root")).unwrap(),
        Some("/"),
    );

    let response = pipeline
        .process(make_request("/other"), terminal())
        .await
        .unwrap();
    // The `/api` middleware is transparently absent for this request.
    assert_eq!(trace(&response), ["root"]);

    let api_response = pipeline
        .process(make_request("/api/users"), terminal())
        .await
        .unwrap();
    // Position is preserved: on a matching request it participates again,
    // ahead of the unscoped middleware.
    assert_eq!(trace(&api_response), ["root", "api"]);
}

#[tokio::test]
async fn test_scoped_and_unscoped_share_one_total_order() {
    let mut pipeline = Pipeline::new();
    let resolver = Resolver::new();

    pipeline.pipe_shared(resolver.resolve(tracing_middleware("first")).unwrap(), None);
    pipeline.pipe_shared(
        resolver.resolve(tracing_middleware("admin")).unwrap(),
        Some("/admin"),
    );
    pipeline.pipe_shared(resolver.resolve(tracing_middleware("last")).unwrap(), None);

    let response = pipeline
        .process(make_request("/admin/settings"), terminal())
        .await
        .unwrap();
    assert_eq!(trace(&response), ["last", "admin", "first"]);
}

#[tokio::test]
async fn test_resolver_registry_round_trip() {
    let mut registry = HandlerRegistry::new();
    registry.register("trace-a", tracing_middleware("A"));
    registry.register_factory("trace-b", || tracing_middleware("B"));

    let resolver = Resolver::with_lookup(Arc::new(registry));
    let resolved = resolver
        .resolve(RawHandler::list([
            RawHandler::named("trace-a"),
            RawHandler::named("trace-b"),
        ]))
        .unwrap();

    let mut pipeline = Pipeline::new();
    pipeline.pipe_shared(resolved, None);

    let response = pipeline
        .process(make_request("/"), terminal())
        .await
        .unwrap();
    assert_eq!(trace(&response), ["B", "A"]);
}

#[tokio::test]
async fn test_config_described_pipeline() {
    let mut registry = HandlerRegistry::new();
    registry.register("auth", tracing_middleware("auth"));
    registry.register("logging", tracing_middleware("logging"));

    let raw = RawHandler::from_config(&serde_json::json!(["auth", ["logging"]])).unwrap();
    let resolver = Resolver::with_lookup(Arc::new(registry));
    let resolved = resolver.resolve(raw).unwrap();

    let mut pipeline = Pipeline::new();
    pipeline.pipe_shared(resolved, None);

    let response = pipeline
        .process(make_request("/"), terminal())
        .await
        .unwrap();
    assert_eq!(trace(&response), ["logging", "auth"]);
}

#[tokio::test]
async fn test_unresolvable_name_without_lookup_service() {
    let resolver = Resolver::new();
    let error = resolver
        .resolve(RawHandler::named("Nonexistent\\Class"))
        .err()
        .unwrap();

    assert!(matches!(error, InvalidHandlerError::UnresolvedName { .. }));
    assert!(error.to_string().contains("Nonexistent\\Class"));
}

#[tokio::test]
async fn test_callable_integer_return_reported_per_request() {
    let resolver = Resolver::new();
    let mut pipeline = Pipeline::new();
    pipeline.pipe_shared(resolver.resolve(RawHandler::callable0(|| 42)).unwrap(), None);

    let error = pipeline
        .process(make_request("/"), terminal())
        .await
        .unwrap_err();
    assert!(matches!(
        error,
        ViaductError::InvalidHandler(InvalidHandlerError::CallableNotAResponse {
            returned: "integer"
        })
    ));
}

#[tokio::test]
async fn test_retrying_middleware_observes_stable_remainder() {
    use std::sync::atomic::{AtomicUsize, Ordering};

    let downstream_hits = Arc::new(AtomicUsize::new(0));
    let hits = Arc::clone(&downstream_hits);

    let mut pipeline = Pipeline::new();
    pipeline.pipe(
        FnMiddleware::new(|request, next: Next| async move {
            // First attempt, then retry over the same remainder.
            let _first: ViaductResult<Response> = next.handle(clone_request(&request)).await;
            next.handle(request).await
        }),
        None,
    );
    pipeline.pipe(
        FnMiddleware::new(move |request, next: Next| {
            hits.fetch_add(1, Ordering::SeqCst);
            async move { next.handle(request).await }
        }),
        None,
    );

    let response = pipeline
        .process(make_request("/"), terminal())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    // The downstream middleware ran once per cursor invocation.
    assert_eq!(downstream_hits.load(Ordering::SeqCst), 2);
}

fn clone_request(request: &Request) -> Request {
    http::Request::builder()
        .uri(request.uri().clone())
        .method(request.method().clone())
        .body(Full::new(Bytes::new()))
        .unwrap()
}
