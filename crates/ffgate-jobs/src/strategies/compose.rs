//! Role-based two-input jobs.

use ffgate_media::filters::MIX_OUTPUT_LABEL;
use ffgate_media::FfmpegCommand;
use ffgate_models::{InputFile, MediaRole};

use super::{StrategyContext, StrategyOutput};
use crate::classify::resolve_roles;
use crate::error::{JobError, JobResult};
use crate::schedule::FadeSchedule;

pub(super) async fn run(ctx: &StrategyContext<'_>) -> JobResult<StrategyOutput> {
    let required = ctx.descriptor.arity.required_roles();
    let roles = resolve_roles(ctx.inputs, required)?;

    let pick = |role: MediaRole| roles.index_of(role).and_then(|i| ctx.inputs.get(i));

    if let (Some(audio), Some(image)) = (pick(MediaRole::Audio), pick(MediaRole::Image)) {
        return audio_image(ctx, audio, image).await;
    }
    if let (Some(background), Some(vocals)) = (pick(MediaRole::Background), pick(MediaRole::Vocals)) {
        return vocals_mix(ctx, background, vocals).await;
    }

    let wanted: Vec<&str> = required.iter().map(MediaRole::as_str).collect();
    Err(JobError::role_resolution(
        format!("No compose pipeline for roles [{}]", wanted.join(", ")),
        Vec::new(),
    ))
}

/// Loop the still image as video under the audio, stopping with the shorter stream.
async fn audio_image(
    ctx: &StrategyContext<'_>,
    audio: &InputFile,
    image: &InputFile,
) -> JobResult<StrategyOutput> {
    let output = ctx.janitor.allocate(&ctx.descriptor.output_extension);

    let mut cmd = FfmpegCommand::new(&output)
        .input_with_args(&image.local_path, ["-loop", "1"])
        .input(&audio.local_path)
        .options(&ctx.descriptor.engine_options);
    if !ctx.descriptor.engine_options.iter().any(|o| o.trim() == "-shortest") {
        cmd = cmd.output_arg("-shortest");
    }

    ctx.engine.transcode(&cmd).await.map_err(JobError::EngineFailure)?;
    ctx.logger.log_progress(&format!(
        "composed {} over {}",
        audio.original_name, image.original_name
    ));

    Ok(StrategyOutput::Artifact(output))
}

/// Background bed with delayed vocals and a fade schedule derived from the vocals' length.
async fn vocals_mix(
    ctx: &StrategyContext<'_>,
    background: &InputFile,
    vocals: &InputFile,
) -> JobResult<StrategyOutput> {
    let info = ctx
        .engine
        .probe(&vocals.local_path)
        .await
        .map_err(JobError::ProbeFailure)?;

    let schedule = FadeSchedule::for_vocals(info.duration);
    ctx.logger.log_progress(&format!(
        "vocals {:.3}s, fade out at {:.3}s, total {:.3}s",
        info.duration, schedule.fade_out_start, schedule.total_duration
    ));

    let output = ctx.janitor.allocate(&ctx.descriptor.output_extension);
    let cmd = FfmpegCommand::new(&output)
        .input(&background.local_path)
        .input(&vocals.local_path)
        .filter_complex(schedule.mix_graph())
        .map(MIX_OUTPUT_LABEL)
        .options(&ctx.descriptor.engine_options)
        .duration(schedule.total_duration);

    ctx.engine.transcode(&cmd).await.map_err(JobError::EngineFailure)?;

    Ok(StrategyOutput::Artifact(output))
}
