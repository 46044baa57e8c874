//! API routes.

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::compression::CompressionLayer;
use tower_http::limit::RequestBodyLimitLayer;

use crate::handlers::{health, list_endpoints, readme, route_not_available, submit_upload, submit_urls};
use crate::metrics::metrics_middleware;
use crate::middleware::{cors_layer, request_logging};
use crate::state::AppState;

/// Create the API router.
pub fn create_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    // Uploads are capped per file in the handler and per request here
    let job_routes = Router::new()
        .route("/:id", post(submit_upload).fallback(route_not_available))
        .route("/:id/url", post(submit_urls).fallback(route_not_available))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(state.config.max_body_size()));

    let info_routes = Router::new()
        .route("/", get(readme).fallback(route_not_available))
        .route("/readme", get(readme).fallback(route_not_available))
        .route("/health", get(health).fallback(route_not_available))
        .route("/healthz", get(health).fallback(route_not_available))
        .route("/endpoints", get(list_endpoints).fallback(route_not_available));

    // Metrics endpoint (if enabled)
    let metrics_routes = match metrics_handle {
        Some(handle) if state.config.metrics_enabled => {
            Router::new().route(
                "/metrics",
                get(move || async move { handle.render() }).fallback(route_not_available),
            )
        }
        _ => Router::new(),
    };

    Router::new()
        .merge(info_routes)
        .merge(metrics_routes)
        .merge(job_routes)
        .fallback(route_not_available)
        .layer(CompressionLayer::new())
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(request_logging))
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}
