use ffgate_media::FfmpegCommand;

use super::{StrategyContext, StrategyOutput};
use crate::error::{JobError, JobResult};

/// One input, one engine call with the descriptor's options.
pub(super) async fn run(ctx: &StrategyContext<'_>) -> JobResult<StrategyOutput> {
    let input = ctx.input(0)?;
    let output = ctx.janitor.allocate(&ctx.descriptor.output_extension);

    let cmd = FfmpegCommand::single(&input.local_path, &output).options(&ctx.descriptor.engine_options);
    ctx.engine.transcode(&cmd).await.map_err(JobError::EngineFailure)?;

    ctx.janitor.release(&input.local_path);
    ctx.logger.log_progress(&format!("transcoded {}", input.original_name));

    Ok(StrategyOutput::Artifact(output))
}
