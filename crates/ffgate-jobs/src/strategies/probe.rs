use super::{StrategyContext, StrategyOutput};
use crate::error::{JobError, JobResult};

pub(super) async fn run(ctx: &StrategyContext<'_>) -> JobResult<StrategyOutput> {
    let input = ctx.input(0)?;
    let info = ctx
        .engine
        .probe(&input.local_path)
        .await
        .map_err(JobError::ProbeFailure)?;

    Ok(StrategyOutput::Duration(info.duration.to_string()))
}
