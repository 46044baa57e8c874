//! API middleware.

use std::time::Instant;

use axum::body::Body;
use axum::http::{header, HeaderValue, Method, Request, Response};
use axum::middleware::Next;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

/// Create CORS layer.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed_headers = [header::CONTENT_TYPE, header::ACCEPT, header::ORIGIN];

    // Browsers need the disposition header to name downloaded artifacts
    let exposed_headers = [
        header::CONTENT_LENGTH,
        header::CONTENT_TYPE,
        header::CONTENT_DISPOSITION,
    ];

    let allowed_methods = [Method::GET, Method::POST, Method::OPTIONS];

    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_methods(Any)
            .allow_headers(Any)
            .expose_headers(Any)
            .allow_origin(Any)
            .max_age(std::time::Duration::from_secs(600))
    } else {
        let origins: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        CorsLayer::new()
            .allow_methods(allowed_methods)
            .allow_headers(allowed_headers)
            .expose_headers(exposed_headers)
            .allow_origin(origins)
            .max_age(std::time::Duration::from_secs(600))
    }
}

/// Request logging middleware. Server errors are logged at warn level.
pub async fn request_logging(request: Request<Body>, next: Next) -> Response<Body> {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let request_bytes = request
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(0);
    let start = Instant::now();

    let response = next.run(request).await;

    let status = response.status();
    let duration_ms = start.elapsed().as_millis() as u64;

    if uri.path() == "/health" || uri.path() == "/healthz" {
        return response;
    }

    if status.is_server_error() {
        warn!(
            method = %method,
            uri = %uri,
            status = %status,
            request_bytes = request_bytes,
            duration_ms = duration_ms,
            "Request failed"
        );
    } else {
        info!(
            method = %method,
            uri = %uri,
            status = %status,
            request_bytes = request_bytes,
            duration_ms = duration_ms,
            "Request completed"
        );
    }

    response
}
