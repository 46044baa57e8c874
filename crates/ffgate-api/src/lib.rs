//! Axum HTTP gateway.
//!
//! This crate provides:
//! - Multipart and URL intake into collecting jobs
//! - Per-file and per-job upload caps
//! - Artifact streaming with release on completion
//! - Health, endpoint listing and Prometheus metrics

pub mod config;
pub mod delivery;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::GatewayConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
