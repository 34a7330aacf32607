//! Prometheus metrics for the API server.

use axum::body::Body;
use axum::http::{Request, Response};
use axum::middleware::Next;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use std::time::Instant;

use bw_models::EventKind;

/// Initialize the Prometheus metrics recorder.
/// Returns a handle that can be used to render metrics.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Metric names as constants for consistency.
pub mod names {
    // HTTP metrics
    pub const HTTP_REQUESTS_TOTAL: &str = "bw_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "bw_http_request_duration_seconds";
    pub const HTTP_REQUESTS_IN_FLIGHT: &str = "bw_http_requests_in_flight";

    // Streaming metrics
    pub const SSE_STREAMS_ACTIVE: &str = "bw_sse_streams_active";
    pub const EVENTS_EMITTED_TOTAL: &str = "bw_events_emitted_total";

    // Workflow metrics
    pub const WORKFLOWS_TOTAL: &str = "bw_workflows_total";
}

/// Record an HTTP request.
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("path", sanitize_path(path)),
        ("status", status.to_string()),
    ];

    counter!(names::HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, &labels).record(duration_secs);
}

/// An SSE response started streaming.
pub fn record_stream_opened() {
    gauge!(names::SSE_STREAMS_ACTIVE).increment(1.0);
}

/// An SSE response finished or its client went away.
pub fn record_stream_closed() {
    gauge!(names::SSE_STREAMS_ACTIVE).decrement(1.0);
}

/// Record one delivered progress event.
pub fn record_event(kind: EventKind) {
    counter!(names::EVENTS_EMITTED_TOTAL, "kind" => kind.as_str()).increment(1);
}

/// Record a finished weather workflow.
pub fn record_workflow(outcome: &'static str) {
    counter!(names::WORKFLOWS_TOTAL, "outcome" => outcome).increment(1);
}

/// Collapse frontend asset paths so they do not explode label cardinality.
fn sanitize_path(path: &str) -> String {
    match path {
        "/health" | "/healthz" | "/ready" | "/metrics" => path.to_string(),
        p if p.starts_with("/api/") => p.to_string(),
        _ => "/static".to_string(),
    }
}

/// Metrics middleware for HTTP requests.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).increment(1.0);

    let response = next.run(request).await;

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).decrement(1.0);

    let status = response.status().as_u16();
    let duration = start.elapsed().as_secs_f64();

    record_http_request(&method, &path, status, duration);

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_path() {
        assert_eq!(sanitize_path("/api/weather"), "/api/weather");
        assert_eq!(sanitize_path("/health"), "/health");
        assert_eq!(sanitize_path("/assets/fonts/MaterialIcons.otf"), "/static");
        assert_eq!(sanitize_path("/"), "/static");
    }
}
