//! Axum gateway binary.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use ffgate_api::{create_router, metrics, AppState, GatewayConfig};
use ffgate_jobs::{Coordinator, CoordinatorConfig, IntakeConfig, PipelineRegistry, UrlIntake};
use ffgate_media::{check_ffmpeg, check_ffprobe, EngineConfig, FfmpegEngine};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env().add_directive("ffgate=info".parse()?);

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }

    info!("Starting ffgate-api");

    match (check_ffmpeg(), check_ffprobe()) {
        (Ok(ffmpeg), Ok(ffprobe)) => {
            info!(ffmpeg = %ffmpeg.display(), ffprobe = %ffprobe.display(), "Media engine found")
        }
        (ffmpeg, ffprobe) => warn!(
            ffmpeg = ffmpeg.is_ok(),
            ffprobe = ffprobe.is_ok(),
            "Media engine binaries missing; jobs will fail until they are installed"
        ),
    }

    // Load configuration
    let config = GatewayConfig::from_env();
    let coordinator_config = CoordinatorConfig::from_env();
    let engine_config = EngineConfig::from_env();
    let intake_config = IntakeConfig {
        max_file_size: config.max_file_size,
        ..IntakeConfig::from_env()
    };
    info!(
        host = %config.host,
        port = config.port,
        work_dir = %coordinator_config.work_dir.display(),
        max_parallel = engine_config.max_parallel,
        engine_timeout_secs = ?engine_config.timeout_secs,
        "Gateway config loaded"
    );

    tokio::fs::create_dir_all(&coordinator_config.work_dir)
        .await
        .with_context(|| format!("creating work dir {}", coordinator_config.work_dir.display()))?;

    // Initialize metrics
    let metrics_handle = if config.metrics_enabled {
        info!("Prometheus metrics enabled at /metrics");
        Some(metrics::init_metrics()?)
    } else {
        None
    };

    let coordinator = Coordinator::new(
        Arc::new(FfmpegEngine::new(engine_config)),
        PipelineRegistry::builtin(),
        coordinator_config,
    );
    info!(pipelines = coordinator.registry().len(), "Pipeline registry loaded");

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("Invalid bind address")?;

    let state = AppState::new(config, coordinator, UrlIntake::new(intake_config));
    let app = create_router(state, metrics_handle);

    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Received shutdown signal");
}
