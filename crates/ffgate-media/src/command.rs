//! FFmpeg command builder and runner.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tracing::{debug, trace, warn};

use crate::error::{MediaError, MediaResult};
use crate::progress::FfmpegProgress;

/// Lines of non-progress stderr kept for error reports.
const STDERR_TAIL_LINES: usize = 20;

/// Split a descriptor option such as `"-codec:v libx264"` into its tokens.
///
/// Only the first space separates flag from value, so values keep any
/// further spaces intact.
pub fn split_option(option: &str) -> Vec<String> {
    let option = option.trim();
    match option.split_once(' ') {
        Some((flag, value)) => vec![flag.to_string(), value.trim().to_string()],
        None if option.is_empty() => Vec::new(),
        None => vec![option.to_string()],
    }
}

#[derive(Debug, Clone)]
struct CommandInput {
    path: PathBuf,
    /// Arguments placed before this input's `-i`
    args: Vec<String>,
}

/// Builder for FFmpeg commands.
#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    inputs: Vec<CommandInput>,
    output: PathBuf,
    /// Output arguments (after the last -i)
    output_args: Vec<String>,
    overwrite: bool,
    log_level: String,
}

impl FfmpegCommand {
    /// Create a command writing to `output`; inputs are added with [`input`](Self::input).
    pub fn new(output: impl AsRef<Path>) -> Self {
        Self {
            inputs: Vec::new(),
            output: output.as_ref().to_path_buf(),
            output_args: Vec::new(),
            overwrite: true,
            log_level: "error".to_string(),
        }
    }

    /// Shorthand for a one-input command.
    pub fn single(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Self {
        Self::new(output).input(input)
    }

    /// Append an input.
    pub fn input(self, path: impl AsRef<Path>) -> Self {
        self.input_with_args(path, Vec::<String>::new())
    }

    /// Append an input preceded by its own arguments (e.g. `-loop 1`).
    pub fn input_with_args<I, S>(mut self, path: impl AsRef<Path>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inputs.push(CommandInput {
            path: path.as_ref().to_path_buf(),
            args: args.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Add an output argument.
    pub fn output_arg(mut self, arg: impl Into<String>) -> Self {
        self.output_args.push(arg.into());
        self
    }

    /// Add multiple output arguments.
    pub fn output_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.output_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Add descriptor-style options (`"-flag value"` strings).
    pub fn options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for option in options {
            self.output_args.extend(split_option(option.as_ref()));
        }
        self
    }

    /// Set video filter.
    pub fn video_filter(self, filter: impl Into<String>) -> Self {
        self.output_arg("-vf").output_arg(filter)
    }

    /// Set audio filter.
    pub fn audio_filter(self, filter: impl Into<String>) -> Self {
        self.output_arg("-af").output_arg(filter)
    }

    /// Set filter complex.
    pub fn filter_complex(self, filter: impl Into<String>) -> Self {
        self.output_arg("-filter_complex").output_arg(filter)
    }

    /// Map a stream or filter-graph label into the output.
    pub fn map(self, spec: impl Into<String>) -> Self {
        self.output_arg("-map").output_arg(spec)
    }

    /// Set video codec.
    pub fn video_codec(self, codec: impl Into<String>) -> Self {
        self.output_arg("-c:v").output_arg(codec)
    }

    /// Set audio codec.
    pub fn audio_codec(self, codec: impl Into<String>) -> Self {
        self.output_arg("-c:a").output_arg(codec)
    }

    /// Set CRF (quality).
    pub fn crf(self, crf: u8) -> Self {
        self.output_arg("-crf").output_arg(crf.to_string())
    }

    /// Set preset.
    pub fn preset(self, preset: impl Into<String>) -> Self {
        self.output_arg("-preset").output_arg(preset)
    }

    /// Set output frame rate.
    pub fn frame_rate(self, fps: u32) -> Self {
        self.output_arg("-r").output_arg(fps.to_string())
    }

    /// Set GOP size.
    pub fn gop(self, frames: u32) -> Self {
        self.output_arg("-g").output_arg(frames.to_string())
    }

    /// Limit output duration.
    pub fn duration(self, seconds: f64) -> Self {
        self.output_arg("-t").output_arg(format!("{:.3}", seconds))
    }

    /// Input paths in command order.
    pub fn inputs(&self) -> impl Iterator<Item = &Path> {
        self.inputs.iter().map(|i| i.path.as_path())
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Build the command arguments.
    pub fn build_args(&self) -> Vec<String> {
        let mut args = Vec::new();

        if self.overwrite {
            args.push("-y".to_string());
        }

        args.push("-v".to_string());
        args.push(self.log_level.clone());

        // Progress output to stderr
        args.push("-progress".to_string());
        args.push("pipe:2".to_string());

        for input in &self.inputs {
            args.extend(input.args.iter().cloned());
            args.push("-i".to_string());
            args.push(input.path.to_string_lossy().to_string());
        }

        args.extend(self.output_args.iter().cloned());
        args.push(self.output.to_string_lossy().to_string());

        args
    }
}

/// Runner for FFmpeg commands with progress tracking.
#[derive(Debug, Clone, Default)]
pub struct FfmpegRunner {
    /// Timeout in seconds; `None` waits indefinitely
    timeout_secs: Option<u64>,
    /// Niceness applied through `nice -n` when available
    niceness: Option<i32>,
}

impl FfmpegRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Lower the scheduling priority of spawned processes.
    pub fn with_niceness(mut self, niceness: i32) -> Self {
        self.niceness = Some(niceness);
        self
    }

    /// Run an FFmpeg command.
    pub async fn run(&self, cmd: &FfmpegCommand) -> MediaResult<()> {
        self.run_with_progress(cmd, |progress| {
            trace!(
                frame = progress.frame,
                out_time_ms = progress.out_time_ms,
                speed = progress.speed,
                "FFmpeg progress"
            );
        })
        .await
    }

    /// Run an FFmpeg command with progress callback.
    pub async fn run_with_progress<F>(&self, cmd: &FfmpegCommand, progress_callback: F) -> MediaResult<()>
    where
        F: Fn(FfmpegProgress) + Send + 'static,
    {
        check_ffmpeg()?;

        let args = cmd.build_args();
        debug!("Running FFmpeg: ffmpeg {}", args.join(" "));

        let mut command = match self.niceness {
            Some(n) if which::which("nice").is_ok() => {
                let mut c = Command::new("nice");
                c.arg("-n").arg(n.to_string()).arg("ffmpeg");
                c
            }
            _ => Command::new("ffmpeg"),
        };

        let mut child = command
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| MediaError::ffmpeg_failed("stderr not captured", None, None))?;
        let mut reader = BufReader::new(stderr).lines();

        // Progress lines feed the callback; anything else is kept for error reports
        let progress_handle = tokio::spawn(async move {
            let mut current = FfmpegProgress::default();
            let mut tail = VecDeque::with_capacity(STDERR_TAIL_LINES);

            while let Ok(Some(line)) = reader.next_line().await {
                if FfmpegProgress::is_progress_line(&line) {
                    if let Some(snapshot) = current.update(&line) {
                        progress_callback(snapshot);
                    }
                } else if !line.trim().is_empty() {
                    if tail.len() == STDERR_TAIL_LINES {
                        tail.pop_front();
                    }
                    tail.push_back(line);
                }
            }

            Vec::from(tail).join("\n")
        });

        let result = self.wait_for_completion(&mut child).await;
        let stderr_tail = progress_handle.await.unwrap_or_default();

        result.map_err(|e| match e {
            MediaError::FfmpegFailed { message, exit_code, .. } => MediaError::FfmpegFailed {
                message,
                stderr: (!stderr_tail.is_empty()).then_some(stderr_tail),
                exit_code,
            },
            other => other,
        })
    }

    /// Wait for child process with optional timeout.
    async fn wait_for_completion(&self, child: &mut Child) -> MediaResult<()> {
        let status = match self.timeout_secs {
            Some(timeout_secs) => {
                match tokio::time::timeout(std::time::Duration::from_secs(timeout_secs), child.wait()).await {
                    Ok(result) => result?,
                    Err(_) => {
                        warn!("FFmpeg timed out after {} seconds, killing process", timeout_secs);
                        let _ = child.kill().await;
                        return Err(MediaError::Timeout(timeout_secs));
                    }
                }
            }
            None => child.wait().await?,
        };

        if status.success() {
            Ok(())
        } else {
            Err(MediaError::ffmpeg_failed(
                "FFmpeg exited with non-zero status",
                None,
                status.code(),
            ))
        }
    }
}

/// Check if FFmpeg is available.
pub fn check_ffmpeg() -> MediaResult<PathBuf> {
    which::which("ffmpeg").map_err(|_| MediaError::FfmpegNotFound)
}

/// Check if FFprobe is available.
pub fn check_ffprobe() -> MediaResult<PathBuf> {
    which::which("ffprobe").map_err(|_| MediaError::FfprobeNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_option() {
        assert_eq!(split_option("-codec:v libx264"), vec!["-codec:v", "libx264"]);
        assert_eq!(split_option("-shortest"), vec!["-shortest"]);
        assert_eq!(split_option("-vf scale=-2:640"), vec!["-vf", "scale=-2:640"]);
        assert!(split_option("  ").is_empty());
    }

    #[test]
    fn test_command_builder_multi_input() {
        let cmd = FfmpegCommand::new("out.mp4")
            .input_with_args("cover.png", ["-loop", "1"])
            .input("track.mp3")
            .options(["-codec:v libx264", "-shortest"]);

        let args = cmd.build_args();
        let joined = args.join(" ");
        assert!(joined.starts_with("-y -v error -progress pipe:2"));
        assert!(joined.contains("-loop 1 -i cover.png -i track.mp3"));
        assert!(joined.ends_with("-codec:v libx264 -shortest out.mp4"));

        let inputs: Vec<&Path> = cmd.inputs().collect();
        assert_eq!(inputs, vec![Path::new("cover.png"), Path::new("track.mp3")]);
    }

    #[test]
    fn test_command_builder_helpers() {
        let cmd = FfmpegCommand::single("input.mp4", "output.mp4")
            .video_codec("libx264")
            .crf(23)
            .frame_rate(30)
            .gop(60)
            .duration(37.5);

        let args = cmd.build_args();
        assert!(args.contains(&"-g".to_string()));
        assert!(args.contains(&"60".to_string()));
        assert!(args.contains(&"37.500".to_string()));
        assert_eq!(cmd.output(), Path::new("output.mp4"));
    }
}
