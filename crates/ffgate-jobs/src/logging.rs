//! Structured job logging.

use tracing::{error, info, warn, Span};

use ffgate_models::{JobId, JobKind};

/// Job logger for structured logging with consistent formatting.
///
/// Every line carries the job id, the pipeline id and the strategy kind.
#[derive(Debug, Clone)]
pub struct JobLogger {
    job_id: String,
    pipeline: String,
    kind: &'static str,
}

impl JobLogger {
    pub fn new(job_id: &JobId, pipeline: &str, kind: JobKind) -> Self {
        Self {
            job_id: job_id.to_string(),
            pipeline: pipeline.to_string(),
            kind: kind.as_str(),
        }
    }

    pub fn log_start(&self, message: &str) {
        info!(
            job_id = %self.job_id,
            pipeline = %self.pipeline,
            kind = self.kind,
            "Job started: {}", message
        );
    }

    pub fn log_progress(&self, message: &str) {
        info!(
            job_id = %self.job_id,
            pipeline = %self.pipeline,
            kind = self.kind,
            "Job progress: {}", message
        );
    }

    pub fn log_warning(&self, message: &str) {
        warn!(
            job_id = %self.job_id,
            pipeline = %self.pipeline,
            kind = self.kind,
            "Job warning: {}", message
        );
    }

    pub fn log_error(&self, message: &str) {
        error!(
            job_id = %self.job_id,
            pipeline = %self.pipeline,
            kind = self.kind,
            "Job error: {}", message
        );
    }

    pub fn log_completion(&self, message: &str) {
        info!(
            job_id = %self.job_id,
            pipeline = %self.pipeline,
            kind = self.kind,
            "Job completed: {}", message
        );
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    pub fn pipeline(&self) -> &str {
        &self.pipeline
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// Span to instrument the job's future with.
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "job",
            job_id = %self.job_id,
            pipeline = %self.pipeline,
            kind = self.kind
        )
    }
}
