//! FFmpeg filter-graph builders.

use std::path::Path;

/// Canvas of the blur-padded compilation.
pub const BLUR_CANVAS_WIDTH: u32 = 1920;
pub const BLUR_CANVAS_HEIGHT: u32 = 1080;
pub const BLUR_FRAME_RATE: u32 = 30;
pub const BLUR_GOP_SIZE: u32 = 60;

/// Attenuation applied to the background bed of a vocals mix.
pub const BACKGROUND_VOLUME: f64 = 0.3;

/// Label of the video pad produced by [`blur_pad_graph`].
pub const BLUR_OUTPUT_LABEL: &str = "[v]";

/// Label of the audio pad produced by [`vocals_mix_graph`].
pub const MIX_OUTPUT_LABEL: &str = "[out]";

/// Letterbox a clip into `width`x`height`, resample to `fps`, re-base timestamps.
pub fn letterbox_filter(width: u32, height: u32, fps: f64) -> String {
    format!(
        "scale={w}:{h}:force_original_aspect_ratio=decrease,\
         pad={w}:{h}:(ow-iw)/2:(oh-ih)/2,\
         setsar=1,fps={fps},setpts=PTS-STARTPTS",
        w = width,
        h = height,
        fps = fps
    )
}

/// Re-base audio timestamps to zero.
pub const AUDIO_RESET_FILTER: &str = "asetpts=PTS-STARTPTS";

/// Composite a clip onto the fixed canvas over a blurred, cropped-to-fill copy of itself.
pub fn blur_pad_graph() -> String {
    format!(
        "[0:v]split=2[bgsrc][fgsrc];\
         [bgsrc]scale={w}:{h}:force_original_aspect_ratio=increase,crop={w}:{h},boxblur=20:5[bg];\
         [fgsrc]scale={w}:{h}:force_original_aspect_ratio=decrease[fg];\
         [bg][fg]overlay=(W-w)/2:(H-h)/2,setsar=1,fps={fps},setpts=PTS-STARTPTS{out}",
        w = BLUR_CANVAS_WIDTH,
        h = BLUR_CANVAS_HEIGHT,
        fps = BLUR_FRAME_RATE,
        out = BLUR_OUTPUT_LABEL
    )
}

/// Mix a background bed (input 0) with delayed vocals (input 1).
///
/// The background is padded, attenuated and faded in from t=0; vocals are
/// delayed by `delay_secs`. Both are mixed with the `longest` policy, then
/// faded out from `fade_out_start` and trimmed to `total_secs`.
pub fn vocals_mix_graph(
    delay_secs: f64,
    fade_in_secs: f64,
    fade_out_start: f64,
    fade_out_secs: f64,
    total_secs: f64,
) -> String {
    let delay_ms = (delay_secs * 1000.0).round() as u64;
    format!(
        "[0:a]apad,volume={vol},afade=t=in:st=0:d={fade_in}[bg];\
         [1:a]adelay={delay_ms}:all=1[vox];\
         [bg][vox]amix=inputs=2:duration=longest:dropout_transition=0[mix];\
         [mix]afade=t=out:st={fade_out_start}:d={fade_out},atrim=0:{total}{out}",
        vol = BACKGROUND_VOLUME,
        fade_in = fade_in_secs,
        delay_ms = delay_ms,
        fade_out_start = fade_out_start,
        fade_out = fade_out_secs,
        total = total_secs,
        out = MIX_OUTPUT_LABEL
    )
}

/// Render a concat-demuxer list, one `file '<path>'` line per clip.
pub fn concat_list<P: AsRef<Path>>(paths: &[P]) -> String {
    let mut list = String::new();
    for path in paths {
        let escaped = path.as_ref().to_string_lossy().replace('\'', "'\\''");
        list.push_str("file '");
        list.push_str(&escaped);
        list.push_str("'\n");
    }
    list
}
