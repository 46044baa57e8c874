//! FFmpeg progress parsing.

use serde::{Deserialize, Serialize};

/// Progress information from FFmpeg.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FfmpegProgress {
    /// Current frame number
    pub frame: u64,
    /// Output time in milliseconds
    pub out_time_ms: i64,
    /// Encoding speed (e.g., 1.5 = 1.5x realtime)
    pub speed: f64,
    /// Whether encoding is complete
    pub is_complete: bool,
}

impl FfmpegProgress {
    /// Feed one `key=value` line from `-progress` output.
    ///
    /// Returns a snapshot at each `progress=` boundary, `None` otherwise.
    pub fn update(&mut self, line: &str) -> Option<FfmpegProgress> {
        let (key, value) = line.trim().split_once('=')?;
        match key {
            "out_time_us" => {
                if let Ok(us) = value.parse::<i64>() {
                    self.out_time_ms = us / 1000;
                }
            }
            // Despite the name, FFmpeg reports microseconds here too
            "out_time_ms" => {
                if let Ok(us) = value.parse::<i64>() {
                    self.out_time_ms = us / 1000;
                }
            }
            "frame" => {
                if let Ok(frame) = value.parse() {
                    self.frame = frame;
                }
            }
            "speed" => {
                if let Some(speed) = value.strip_suffix('x').and_then(|s| s.trim().parse().ok()) {
                    self.speed = speed;
                }
            }
            "progress" => {
                self.is_complete = value == "end";
                return Some(self.clone());
            }
            _ => {}
        }
        None
    }

    /// Whether a stderr line belongs to the `-progress` key/value stream.
    pub fn is_progress_line(line: &str) -> bool {
        match line.split_once('=') {
            Some((key, _)) => !key.is_empty() && !key.contains(char::is_whitespace),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_parsing() {
        let mut progress = FfmpegProgress::default();

        assert!(progress.update("out_time_us=5000000").is_none());
        assert_eq!(progress.out_time_ms, 5000);

        progress.update("speed=1.5x");
        assert!((progress.speed - 1.5).abs() < 0.01);

        progress.update("speed=N/A");
        assert!((progress.speed - 1.5).abs() < 0.01);

        let snapshot = progress.update("progress=end").unwrap();
        assert!(snapshot.is_complete);
    }

    #[test]
    fn test_progress_line_detection() {
        assert!(FfmpegProgress::is_progress_line("frame=120"));
        assert!(!FfmpegProgress::is_progress_line("Error opening input file a.mp4"));
        assert!(!FfmpegProgress::is_progress_line("[aac @ 0x1] Too many bits = 12"));
    }
}
