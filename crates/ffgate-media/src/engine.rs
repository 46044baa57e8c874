//! The media-engine seam driven by the job orchestrator.

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tracing::debug;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};
use crate::probe::{probe_media, ProbeInfo};

/// Histogram of engine invocation wall time, labelled by operation.
pub const ENGINE_DURATION_SECONDS: &str = "ffgate_engine_duration_seconds";
/// Counter of failed engine invocations, labelled by operation.
pub const ENGINE_FAILURES_TOTAL: &str = "ffgate_engine_failures_total";

/// External media-transformation capabilities.
#[async_trait]
pub trait MediaEngine: Send + Sync {
    /// Run `command`; on success its output path holds the artifact.
    async fn transcode(&self, command: &FfmpegCommand) -> MediaResult<()>;

    /// Read container duration, start time and stream layout.
    async fn probe(&self, path: &Path) -> MediaResult<ProbeInfo>;
}

/// Engine tuning.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Maximum concurrent FFmpeg processes across all jobs
    pub max_parallel: usize,
    /// Optional ceiling for one FFmpeg invocation; `None` waits indefinitely
    pub timeout_secs: Option<u64>,
    /// Niceness for spawned FFmpeg processes
    pub niceness: Option<i32>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_parallel: 4,
            timeout_secs: None,
            niceness: Some(15),
        }
    }
}

impl EngineConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            max_parallel: std::env::var("MAX_PARALLEL_TRANSCODES")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|n: &usize| *n > 0)
                .unwrap_or(4),
            timeout_secs: std::env::var("ENGINE_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok()),
            niceness: match std::env::var("ENGINE_NICENESS") {
                Ok(s) if s.eq_ignore_ascii_case("off") => None,
                Ok(s) => s.parse().ok().or(Some(15)),
                Err(_) => Some(15),
            },
        }
    }
}

/// [`MediaEngine`] backed by the `ffmpeg`/`ffprobe` binaries.
pub struct FfmpegEngine {
    runner: FfmpegRunner,
    permits: Arc<Semaphore>,
}

impl FfmpegEngine {
    pub fn new(config: EngineConfig) -> Self {
        let mut runner = FfmpegRunner::new();
        if let Some(secs) = config.timeout_secs {
            runner = runner.with_timeout(secs);
        }
        if let Some(n) = config.niceness {
            runner = runner.with_niceness(n);
        }

        Self {
            runner,
            permits: Arc::new(Semaphore::new(config.max_parallel.max(1))),
        }
    }
}

#[async_trait]
impl MediaEngine for FfmpegEngine {
    async fn transcode(&self, command: &FfmpegCommand) -> MediaResult<()> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| MediaError::ffmpeg_failed("Engine semaphore closed", None, None))?;

        let start = Instant::now();
        let result = self.runner.run(command).await;
        record("transcode", start, result.is_ok());

        debug!(
            output = %command.output().display(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            ok = result.is_ok(),
            "Transcode finished"
        );
        result
    }

    async fn probe(&self, path: &Path) -> MediaResult<ProbeInfo> {
        let start = Instant::now();
        let result = probe_media(path).await;
        record("probe", start, result.is_ok());
        result
    }
}

fn record(operation: &'static str, start: Instant, ok: bool) {
    metrics::histogram!(ENGINE_DURATION_SECONDS, "operation" => operation)
        .record(start.elapsed().as_secs_f64());
    if !ok {
        metrics::counter!(ENGINE_FAILURES_TOTAL, "operation" => operation).increment(1);
    }
}
