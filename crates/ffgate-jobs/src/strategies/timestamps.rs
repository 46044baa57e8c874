use super::{StrategyContext, StrategyOutput};
use crate::error::{JobError, JobResult};
use crate::fanout::join_indexed;
use crate::timestamps::build_report;

/// Probe every input concurrently; fail only once all probes are in.
pub(super) async fn run(ctx: &StrategyContext<'_>) -> JobResult<StrategyOutput> {
    let inputs = ctx.inputs;

    let fanout = join_indexed(inputs.len(), |index| async move {
        let path = &inputs[index].local_path;
        ctx.engine.probe(path).await.map_err(JobError::ProbeFailure)
    })
    .await;

    if let Some(index) = fanout.failed_index() {
        ctx.logger
            .log_warning(&format!("probe of input {} failed after all probes finished", index));
    }
    let infos = fanout.into_ordered()?;

    let items: Vec<(String, f64)> = inputs
        .iter()
        .zip(&infos)
        .enumerate()
        .map(|(index, (input, info))| {
            let title = input
                .title
                .clone()
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| format!("Video {}", index + 1));
            (title, info.adjusted_duration())
        })
        .collect();

    Ok(StrategyOutput::Timestamps(build_report(
        &items,
        ctx.config.timestamp_precision,
    )))
}
