use axum::{
    extract::{MatchedPath, Request, State},
    middleware::Next,
    response::Response,
};
use metrics::{counter, histogram};
use std::time::Instant;

/// Record request count and latency per route.
///
/// The route template is used as the `path` label, so `/api/session/:session_id`
/// is one series however many ids are seen. Must be applied with `route_layer`;
/// anything without a matched route is labelled `unmatched`.
pub async fn metrics_middleware(req: Request, next: Next) -> Response {
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    record(path, req, next).await
}

/// Same as [`metrics_middleware`] for services mounted with `nest_service`,
/// which get no `MatchedPath`. Every request is labelled with the mount prefix
/// given as state, e.g. `from_fn_with_state("/audio", prefixed_metrics_middleware)`.
pub async fn prefixed_metrics_middleware(
    State(prefix): State<&'static str>,
    req: Request,
    next: Next,
) -> Response {
    record(prefix.to_string(), req, next).await
}

async fn record(path: String, req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().to_string();

    let response = next.run(req).await;

    let duration = start.elapsed();
    let status = response.status().as_u16().to_string();

    let labels = [("method", method), ("path", path), ("status", status)];

    counter!("http_requests_total", &labels).increment(1);
    histogram!("http_request_duration_seconds", &labels).record(duration.as_secs_f64());

    response
}
