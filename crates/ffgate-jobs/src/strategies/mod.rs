//! One strategy per job kind.
//!
//! Every strategy allocates its transient paths through the job's
//! [`Janitor`], so whatever it leaves behind on an error path is released
//! by the coordinator in one place.

mod compilation;
mod compose;
mod probe;
mod timestamps;
mod transcode;

use std::path::PathBuf;

use ffgate_media::MediaEngine;
use ffgate_models::{InputFile, JobKind, PipelineDescriptor};

use crate::config::CoordinatorConfig;
use crate::error::{JobError, JobResult};
use crate::janitor::Janitor;
use crate::logging::JobLogger;
use crate::timestamps::TimestampReport;

pub use compilation::CompilationStyle;

/// Everything a strategy may touch while it runs.
pub struct StrategyContext<'a> {
    pub descriptor: &'a PipelineDescriptor,
    pub inputs: &'a [InputFile],
    pub engine: &'a dyn MediaEngine,
    pub janitor: &'a Janitor,
    pub config: &'a CoordinatorConfig,
    pub logger: &'a JobLogger,
}

impl<'a> StrategyContext<'a> {
    /// Input at `index`, or an input-count error if the job is short.
    pub fn input(&self, index: usize) -> JobResult<&'a InputFile> {
        self.inputs.get(index).ok_or_else(|| JobError::InputCount {
            expected: self.descriptor.arity.to_string(),
            received: self.inputs.len(),
        })
    }
}

/// What a strategy produced.
#[derive(Debug)]
pub enum StrategyOutput {
    /// Path of the finalized artifact, still owned by the janitor
    Artifact(PathBuf),
    Timestamps(TimestampReport),
    /// Raw duration as plain text
    Duration(String),
}

/// Run the strategy matching the descriptor's kind.
pub async fn run(ctx: &StrategyContext<'_>) -> JobResult<StrategyOutput> {
    match ctx.descriptor.kind {
        JobKind::Transcode => transcode::run(ctx).await,
        JobKind::Compose => compose::run(ctx).await,
        JobKind::SimpleCompilation => compilation::run(ctx, CompilationStyle::Letterbox).await,
        JobKind::BlurCompilation => compilation::run(ctx, CompilationStyle::BlurPad).await,
        JobKind::Timestamps => timestamps::run(ctx).await,
        JobKind::Probe => probe::run(ctx).await,
    }
}
