//! Normalize-then-concatenate compilations.
//!
//! Every clip is normalized concurrently into its own intermediate. The
//! coordinator waits for all of them; a latched failure discards the batch
//! and the concat call is never issued. On success the concat list follows
//! input order, not completion order.

use std::path::PathBuf;

use ffgate_media::filters::{
    blur_pad_graph, concat_list, letterbox_filter, AUDIO_RESET_FILTER, BLUR_FRAME_RATE,
    BLUR_GOP_SIZE, BLUR_OUTPUT_LABEL,
};
use ffgate_media::{FfmpegCommand, MediaError};

use super::{StrategyContext, StrategyOutput};
use crate::error::{JobError, JobResult};
use crate::fanout::join_indexed;

const INTERMEDIATE_EXTENSION: &str = "mp4";
const INTERMEDIATE_CRF: u8 = 23;
const INTERMEDIATE_PRESET: &str = "veryfast";

/// How each clip is fitted to the common canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompilationStyle {
    /// Scale and pad to the first clip's dimensions and frame rate
    Letterbox,
    /// Fixed 1920x1080 canvas over a blurred fill of the clip itself
    BlurPad,
}

#[derive(Debug, Clone, Copy)]
struct Target {
    width: u32,
    height: u32,
    fps: f64,
}

pub(super) async fn run(ctx: &StrategyContext<'_>, style: CompilationStyle) -> JobResult<StrategyOutput> {
    let target = match style {
        CompilationStyle::Letterbox => Some(probe_target(ctx).await?),
        CompilationStyle::BlurPad => None,
    };

    let fanout = join_indexed(ctx.inputs.len(), |index| normalize(ctx, style, target, index)).await;
    if let Some(index) = fanout.failed_index() {
        ctx.logger.log_error(&format!(
            "normalize of clip {} failed; discarding {} finished clip(s)",
            index,
            fanout.completed()
        ));
    }
    let clips = fanout.into_ordered()?;

    let list_path = ctx.janitor.allocate("txt");
    tokio::fs::write(&list_path, concat_list(&clips)).await?;

    let output = ctx.janitor.allocate(&ctx.descriptor.output_extension);
    let cmd = FfmpegCommand::new(&output)
        .input_with_args(&list_path, ["-f", "concat", "-safe", "0"])
        .options(&ctx.descriptor.engine_options);
    ctx.engine.transcode(&cmd).await.map_err(JobError::EngineFailure)?;

    for clip in &clips {
        ctx.janitor.release(clip);
    }
    ctx.janitor.release(&list_path);
    ctx.logger.log_progress(&format!("concatenated {} clips", clips.len()));

    Ok(StrategyOutput::Artifact(output))
}

/// Dimensions and frame rate of the first clip's video stream.
async fn probe_target(ctx: &StrategyContext<'_>) -> JobResult<Target> {
    let first = ctx.input(0)?;
    let info = ctx
        .engine
        .probe(&first.local_path)
        .await
        .map_err(JobError::ProbeFailure)?;

    let stream = info.video_stream().ok_or_else(|| {
        JobError::ProbeFailure(MediaError::ffprobe_failed(
            format!("No video stream in {}", first.original_name),
            None,
        ))
    })?;

    match (stream.width, stream.height) {
        (Some(width), Some(height)) if width > 0 && height > 0 => Ok(Target {
            width,
            height,
            fps: stream.fps(),
        }),
        _ => Err(JobError::ProbeFailure(MediaError::ffprobe_failed(
            format!("No frame size reported for {}", first.original_name),
            None,
        ))),
    }
}

async fn normalize(
    ctx: &StrategyContext<'_>,
    style: CompilationStyle,
    target: Option<Target>,
    index: usize,
) -> JobResult<PathBuf> {
    let input = ctx.input(index)?;
    let output = ctx.janitor.allocate(INTERMEDIATE_EXTENSION);

    let base = FfmpegCommand::single(&input.local_path, &output);
    let cmd = match (style, target) {
        (CompilationStyle::Letterbox, Some(t)) => base
            .video_filter(letterbox_filter(t.width, t.height, t.fps))
            .audio_filter(AUDIO_RESET_FILTER)
            .video_codec("libx264")
            .preset(INTERMEDIATE_PRESET)
            .crf(INTERMEDIATE_CRF)
            .output_args(["-pix_fmt", "yuv420p"])
            .audio_codec("aac"),
        _ => base
            .filter_complex(blur_pad_graph())
            .map(BLUR_OUTPUT_LABEL)
            .map("0:a?")
            .video_codec("libx264")
            .preset(INTERMEDIATE_PRESET)
            .crf(INTERMEDIATE_CRF)
            .frame_rate(BLUR_FRAME_RATE)
            .gop(BLUR_GOP_SIZE)
            .audio_codec("copy"),
    };

    ctx.engine.transcode(&cmd).await.map_err(JobError::EngineFailure)?;
    ctx.logger.log_progress(&format!("normalized clip {}", index));

    Ok(output)
}
