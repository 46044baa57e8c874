//! Job lifecycle: arity validation, strategy dispatch, single resolution and cleanup.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use metrics::{counter, histogram};
use tracing::{debug, warn, Instrument};

use ffgate_media::MediaEngine;
use ffgate_models::{InputFile, JobId, JobState, PipelineDescriptor};

use crate::config::CoordinatorConfig;
use crate::error::{JobError, JobResult};
use crate::janitor::{Artifact, Janitor};
use crate::logging::JobLogger;
use crate::registry::PipelineRegistry;
use crate::strategies::{self, StrategyContext, StrategyOutput};
use crate::timestamps::TimestampReport;

/// Counter of successful jobs, labelled by kind.
pub const JOBS_COMPLETED_TOTAL: &str = "ffgate_jobs_completed_total";
/// Counter of failed jobs, labelled by kind and error code.
pub const JOBS_FAILED_TOTAL: &str = "ffgate_jobs_failed_total";
/// Histogram of job wall time, labelled by kind.
pub const JOB_DURATION_SECONDS: &str = "ffgate_job_duration_seconds";

/// One job: a descriptor, its ordered inputs and the files it owns.
///
/// Dropping a job releases everything its janitor still owns.
#[derive(Debug)]
pub struct Job {
    id: JobId,
    descriptor: PipelineDescriptor,
    inputs: Vec<InputFile>,
    janitor: Janitor,
    state: JobState,
}

impl Job {
    pub fn new(descriptor: PipelineDescriptor, work_dir: impl Into<PathBuf>) -> Self {
        Self {
            id: JobId::new(),
            descriptor,
            inputs: Vec::new(),
            janitor: Janitor::new(work_dir),
            state: JobState::Collecting,
        }
    }

    pub fn id(&self) -> &JobId {
        &self.id
    }

    pub fn descriptor(&self) -> &PipelineDescriptor {
        &self.descriptor
    }

    pub fn inputs(&self) -> &[InputFile] {
        &self.inputs
    }

    pub fn janitor(&self) -> &Janitor {
        &self.janitor
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    /// Reserve a janitor-owned path for an incoming input.
    pub fn allocate_input_path(&self, extension: &str) -> PathBuf {
        self.janitor.allocate(extension)
    }

    /// Append an input. Its local path becomes owned by the job.
    pub fn add_input(&mut self, input: InputFile) {
        self.janitor.register(input.local_path.clone());
        self.inputs.push(input);
    }

    /// Set the title of the input at `index`, if there is one.
    pub fn set_title(&mut self, index: usize, title: impl Into<String>) -> bool {
        match self.inputs.get_mut(index) {
            Some(input) => {
                input.title = Some(title.into());
                true
            }
            None => false,
        }
    }

    /// Fail a job that never started running and release everything it received.
    pub fn abort(self, err: JobError) -> JobError {
        counter!(JOBS_FAILED_TOTAL, "kind" => self.descriptor.kind.as_str(), "code" => err.code())
            .increment(1);
        self.discard(&err.to_string());
        err
    }

    /// Drop a collecting job whose intake failed outside the job taxonomy.
    pub fn discard(mut self, reason: &str) {
        if let Err(e) = self.state.transition(JobState::Failed) {
            debug!(job_id = %self.id, error = %e, "Discarding a job that already left collecting");
        }
        let released = self.janitor.release_all();
        warn!(
            job_id = %self.id,
            pipeline = %self.descriptor.id,
            released = released,
            reason = %reason,
            "Job aborted while collecting inputs"
        );
    }

    fn resolve(&mut self, outcome: &JobResult<StrategyOutput>) -> JobResult<()> {
        let terminal = match outcome {
            Ok(_) => JobState::Succeeded,
            Err(_) => JobState::Failed,
        };
        self.state.transition(terminal)?;
        Ok(())
    }
}

/// Successful job result handed to delivery.
#[derive(Debug)]
pub enum JobOutcome {
    /// File to stream; removed once delivery completes
    Artifact(Artifact),
    Timestamps(TimestampReport),
    Duration(String),
}

/// Runs jobs against a media engine.
pub struct Coordinator {
    engine: Arc<dyn MediaEngine>,
    registry: PipelineRegistry,
    config: CoordinatorConfig,
}

impl Coordinator {
    pub fn new(engine: Arc<dyn MediaEngine>, registry: PipelineRegistry, config: CoordinatorConfig) -> Self {
        Self {
            engine,
            registry,
            config,
        }
    }

    pub fn registry(&self) -> &PipelineRegistry {
        &self.registry
    }

    /// Open a collecting job for the pipeline `id`, creating the work directory if needed.
    pub async fn create_job(&self, id: &str) -> JobResult<Option<Job>> {
        let Some(descriptor) = self.registry.get(id) else {
            return Ok(None);
        };
        tokio::fs::create_dir_all(&self.config.work_dir).await?;
        Ok(Some(Job::new(descriptor.clone(), &self.config.work_dir)))
    }

    /// Run `job` to completion. The job resolves exactly once.
    ///
    /// On failure every path the job owns has been released before this
    /// returns. On success only the detached artifact survives, and it is
    /// released when delivery completes or the [`Artifact`] is dropped.
    pub async fn run(&self, mut job: Job) -> JobResult<JobOutcome> {
        let logger = JobLogger::new(&job.id, &job.descriptor.id, job.descriptor.kind);
        let span = logger.create_span();
        self.execute(&mut job, &logger).instrument(span).await
    }

    async fn execute(&self, job: &mut Job, logger: &JobLogger) -> JobResult<JobOutcome> {
        let start = Instant::now();
        let kind = job.descriptor.kind.as_str();

        job.state.transition(JobState::Running)?;
        logger.log_start(&format!("{} input(s)", job.inputs.len()));

        let result = self.dispatch(job, logger).await;
        job.resolve(&result)?;

        histogram!(JOB_DURATION_SECONDS, "kind" => kind).record(start.elapsed().as_secs_f64());

        match result {
            Ok(output) => {
                let outcome = match output {
                    StrategyOutput::Artifact(path) => JobOutcome::Artifact(job.janitor.detach(&path)),
                    StrategyOutput::Timestamps(report) => JobOutcome::Timestamps(report),
                    StrategyOutput::Duration(duration) => JobOutcome::Duration(duration),
                };
                let released = job.janitor.release_all();
                counter!(JOBS_COMPLETED_TOTAL, "kind" => kind).increment(1);
                logger.log_completion(&format!(
                    "{:.2}s, released {} transient file(s)",
                    start.elapsed().as_secs_f64(),
                    released
                ));
                Ok(outcome)
            }
            Err(err) => {
                let released = job.janitor.release_all();
                counter!(JOBS_FAILED_TOTAL, "kind" => kind, "code" => err.code()).increment(1);
                logger.log_error(&format!("{} (released {} transient file(s))", err, released));
                if let Some(stderr) = err.engine_stderr() {
                    logger.log_warning(&format!("engine stderr: {}", stderr));
                }
                Err(err)
            }
        }
    }

    async fn dispatch(&self, job: &Job, logger: &JobLogger) -> JobResult<StrategyOutput> {
        let arity = &job.descriptor.arity;
        if !arity.accepts(job.inputs.len()) {
            return Err(JobError::InputCount {
                expected: arity.to_string(),
                received: job.inputs.len(),
            });
        }

        let ctx = StrategyContext {
            descriptor: &job.descriptor,
            inputs: &job.inputs,
            engine: self.engine.as_ref(),
            janitor: &job.janitor,
            config: &self.config,
            logger,
        };
        strategies::run(&ctx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ffgate_models::{Arity, JobKind};

    #[test]
    fn test_abort_releases_received_inputs() {
        let dir = tempfile::tempdir().unwrap();
        let descriptor = PipelineDescriptor::new("mp3", "mp3", JobKind::Transcode, Arity::ExactlyOne);
        let mut job = Job::new(descriptor, dir.path());

        let path = job.allocate_input_path("wav");
        std::fs::write(&path, b"partial").unwrap();
        job.add_input(InputFile::new("file", "a.wav", &path, "audio/wav"));

        let err = job.abort(JobError::upload_limit("a.wav exceeds 10 bytes"));
        assert_eq!(err.code(), "upload_limit_exceeded");
        assert!(!path.exists());
    }

    #[test]
    fn test_set_title_by_position() {
        let dir = tempfile::tempdir().unwrap();
        let descriptor = PipelineDescriptor::new("timestamps", "json", JobKind::Timestamps, Arity::Unbounded);
        let mut job = Job::new(descriptor, dir.path());
        job.add_input(InputFile::new("file", "a.mp4", dir.path().join("a.mp4"), "video/mp4"));

        assert!(job.set_title(0, "Intro"));
        assert!(!job.set_title(1, "Missing"));
        assert_eq!(job.inputs()[0].title.as_deref(), Some("Intro"));
    }
}
