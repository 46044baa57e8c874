//! Health and discovery handlers.

use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use ffgate_media::check_ffmpeg;
use ffgate_models::PipelineDescriptor;

use crate::state::AppState;

const README_MD: &str = include_str!("../../../../README.md");

/// Health response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: String,
    /// Whether an `ffmpeg` binary is on the PATH
    pub engine_available: bool,
}

/// Health check endpoint (liveness probe).
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now().to_rfc3339(),
        engine_available: check_ffmpeg().is_ok(),
    })
}

/// GET / and GET /readme
///
/// Serves the usage guide.
pub async fn readme() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/markdown; charset=utf-8")], README_MD)
}

/// List every registered pipeline.
pub async fn list_endpoints(State(state): State<AppState>) -> Json<Vec<PipelineDescriptor>> {
    Json(state.coordinator.registry().iter().cloned().collect())
}
