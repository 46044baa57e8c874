//! Prometheus metrics for the gateway.

use axum::body::Body;
use axum::extract::MatchedPath;
use axum::http::{Request, Response};
use axum::middleware::Next;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::time::Instant;

/// Initialize the Prometheus metrics recorder.
/// Returns a handle that can be used to render metrics.
pub fn init_metrics() -> anyhow::Result<PrometheusHandle> {
    Ok(PrometheusBuilder::new().install_recorder()?)
}

/// Metric names as constants for consistency.
pub mod names {
    // HTTP metrics
    pub const HTTP_REQUESTS_TOTAL: &str = "ffgate_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "ffgate_http_request_duration_seconds";
    pub const HTTP_REQUESTS_IN_FLIGHT: &str = "ffgate_http_requests_in_flight";

    // Intake and delivery
    pub const UPLOAD_BYTES_TOTAL: &str = "ffgate_upload_bytes_total";
    pub const ARTIFACTS_DELIVERED_TOTAL: &str = "ffgate_artifacts_delivered_total";
    pub const DELIVERY_FAILURES_TOTAL: &str = "ffgate_delivery_failures_total";
}

/// Record an HTTP request.
pub fn record_http_request(method: &str, route: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("route", route.to_string()),
        ("status", status.to_string()),
    ];

    counter!(names::HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record bytes received for one uploaded file.
pub fn record_upload(pipeline: &str, bytes: u64) {
    let labels = [("pipeline", pipeline.to_string())];
    counter!(names::UPLOAD_BYTES_TOTAL, &labels).increment(bytes);
}

/// Record a fully streamed artifact.
pub fn record_artifact_delivered(bytes: u64) {
    counter!(names::ARTIFACTS_DELIVERED_TOTAL).increment(1);
    histogram!("ffgate_artifact_bytes").record(bytes as f64);
}

/// Record an artifact whose delivery did not complete.
pub fn record_delivery_failure() {
    counter!(names::DELIVERY_FAILURES_TOTAL).increment(1);
}

/// Metrics middleware for HTTP requests.
///
/// Requests are labelled by route template, so pipeline ids do not create
/// a series per unknown path.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let method = request.method().to_string();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());
    let start = Instant::now();

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).increment(1.0);

    let response = next.run(request).await;

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).decrement(1.0);

    let status = response.status().as_u16();
    let duration = start.elapsed().as_secs_f64();

    record_http_request(&method, &route, status, duration);

    response
}
