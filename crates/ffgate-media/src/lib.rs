//! FFmpeg CLI wrapper used as the gateway's media engine.
//!
//! This crate provides:
//! - Type-safe multi-input FFmpeg command building
//! - Progress parsing from `-progress pipe:2`
//! - FFprobe format/stream probing
//! - Filter-graph builders for letterboxing, blur-padding and vocal mixing
//! - Bounded-time URL downloads
//! - The [`MediaEngine`] seam the orchestrator drives

pub mod command;
pub mod download;
pub mod engine;
pub mod error;
pub mod filters;
pub mod probe;
pub mod progress;

pub use command::{check_ffmpeg, check_ffprobe, split_option, FfmpegCommand, FfmpegRunner};
pub use download::{download_to_file, DownloadedFile};
pub use engine::{EngineConfig, FfmpegEngine, MediaEngine};
pub use error::{MediaError, MediaResult};
pub use probe::{parse_frame_rate, probe_media, ProbeInfo, StreamInfo, DEFAULT_FRAME_RATE};
pub use progress::FfmpegProgress;
