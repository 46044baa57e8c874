//! FFprobe media information.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

use crate::command::check_ffprobe;
use crate::error::{MediaError, MediaResult};

/// Frame rate used when a stream reports none (or `0/0`).
pub const DEFAULT_FRAME_RATE: f64 = 30.0;

/// Container and stream facts the orchestrator needs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProbeInfo {
    /// Container duration in seconds
    pub duration: f64,
    /// Initial timestamp of the container, seconds
    pub start_time: f64,
    pub streams: Vec<StreamInfo>,
}

/// One elementary stream.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StreamInfo {
    /// `video`, `audio`, `subtitle`, ...
    pub codec_type: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// Rational frame rate as reported, e.g. `30000/1001`
    pub frame_rate_expr: Option<String>,
}

impl ProbeInfo {
    /// First video stream, if any.
    pub fn video_stream(&self) -> Option<&StreamInfo> {
        self.streams.iter().find(|s| s.codec_type == "video")
    }

    /// Duration corrected for containers whose first timestamp is not zero.
    pub fn adjusted_duration(&self) -> f64 {
        self.duration - self.start_time.abs()
    }
}

impl StreamInfo {
    /// Evaluated frame rate, falling back to [`DEFAULT_FRAME_RATE`] when missing or zero.
    pub fn fps(&self) -> f64 {
        self.frame_rate_expr
            .as_deref()
            .and_then(parse_frame_rate)
            .filter(|fps| *fps > 0.0)
            .unwrap_or(DEFAULT_FRAME_RATE)
    }
}

/// FFprobe JSON output format.
#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: FfprobeFormat,
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
    start_time: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
    avg_frame_rate: Option<String>,
}

/// Probe a media file.
pub async fn probe_media(path: impl AsRef<Path>) -> MediaResult<ProbeInfo> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(MediaError::FileNotFound(path.to_path_buf()));
    }

    check_ffprobe()?;

    let output = Command::new("ffprobe")
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output()
        .await?;

    if !output.status.success() {
        return Err(MediaError::ffprobe_failed(
            "FFprobe failed",
            Some(String::from_utf8_lossy(&output.stderr).to_string()),
        ));
    }

    parse_probe_output(&output.stdout)
}

/// Turn raw `ffprobe -print_format json` bytes into [`ProbeInfo`].
pub(crate) fn parse_probe_output(bytes: &[u8]) -> MediaResult<ProbeInfo> {
    let probe: FfprobeOutput = serde_json::from_slice(bytes)?;

    let duration = probe
        .format
        .duration
        .as_deref()
        .and_then(|d| d.parse::<f64>().ok())
        .ok_or_else(|| MediaError::ffprobe_failed("No duration reported", None))?;

    let start_time = probe
        .format
        .start_time
        .as_deref()
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(0.0);

    let streams = probe
        .streams
        .into_iter()
        .map(|s| StreamInfo {
            codec_type: s.codec_type.unwrap_or_default(),
            width: s.width,
            height: s.height,
            frame_rate_expr: s
                .r_frame_rate
                .filter(|r| r != "0/0")
                .or(s.avg_frame_rate),
        })
        .collect();

    Ok(ProbeInfo {
        duration,
        start_time,
        streams,
    })
}

/// Parse frame rate string (e.g., "30/1" or "29.97").
pub fn parse_frame_rate(s: &str) -> Option<f64> {
    if let Some((num, den)) = s.split_once('/') {
        let num: f64 = num.trim().parse().ok()?;
        let den: f64 = den.trim().parse().ok()?;
        if den > 0.0 {
            return Some(num / den);
        }
        return None;
    }
    s.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_frame_rate() {
        assert!((parse_frame_rate("30/1").unwrap() - 30.0).abs() < 0.01);
        assert!((parse_frame_rate("30000/1001").unwrap() - 29.97).abs() < 0.01);
        assert!((parse_frame_rate("29.97").unwrap() - 29.97).abs() < 0.01);
        assert!(parse_frame_rate("0/0").is_none());
    }

    #[test]
    fn test_stream_fps_defaults() {
        let missing = StreamInfo::default();
        assert_eq!(missing.fps(), DEFAULT_FRAME_RATE);

        let zero = StreamInfo {
            frame_rate_expr: Some("0/1".to_string()),
            ..Default::default()
        };
        assert_eq!(zero.fps(), DEFAULT_FRAME_RATE);
    }

    #[test]
    fn test_parse_probe_output() {
        let json = br#"{
            "format": {"duration": "12.500000", "start_time": "-1.400000"},
            "streams": [
                {"codec_type": "audio"},
                {"codec_type": "video", "width": 1280, "height": 720,
                 "r_frame_rate": "30000/1001", "avg_frame_rate": "0/0"}
            ]
        }"#;

        let info = parse_probe_output(json).unwrap();
        assert!((info.adjusted_duration() - 11.1).abs() < 1e-9);
        assert_eq!(info.streams[0].codec_type, "audio");

        let video = info.video_stream().unwrap();
        assert_eq!(video.width, Some(1280));
        assert!((video.fps() - 29.97).abs() < 0.01);
    }

    #[test]
    fn test_parse_probe_output_without_duration() {
        let json = br#"{"format": {}, "streams": []}"#;
        assert!(matches!(
            parse_probe_output(json),
            Err(MediaError::FfprobeFailed { .. })
        ));
    }
}
