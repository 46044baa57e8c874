//! Scripted media engine and job fixtures shared by the integration suites.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use ffgate_jobs::{Coordinator, CoordinatorConfig, Job, PipelineRegistry};
use ffgate_media::{FfmpegCommand, MediaEngine, MediaError, MediaResult, ProbeInfo, StreamInfo};
use ffgate_models::InputFile;

/// A recorded engine call.
#[derive(Debug, Clone)]
pub enum Call {
    Transcode {
        /// File name of each input
        inputs: Vec<String>,
        output: PathBuf,
        args: Vec<String>,
        /// Contents of a concat list input, read when the call was issued
        concat_list: Option<String>,
    },
    Probe(String),
}

/// Engine whose behaviour is keyed by the file name of the (first) input.
#[derive(Default)]
pub struct FakeEngine {
    delays: HashMap<String, Duration>,
    failures: HashSet<String>,
    probes: HashMap<String, ProbeInfo>,
    calls: Mutex<Vec<Call>>,
    finished: Mutex<Vec<String>>,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(mut self, name: &str, millis: u64) -> Self {
        self.delays.insert(name.to_string(), Duration::from_millis(millis));
        self
    }

    pub fn failing(mut self, name: &str) -> Self {
        self.failures.insert(name.to_string());
        self
    }

    pub fn with_probe(mut self, name: &str, info: ProbeInfo) -> Self {
        self.probes.insert(name.to_string(), info);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Input names in the order their engine calls finished.
    pub fn finished(&self) -> Vec<String> {
        self.finished.lock().unwrap().clone()
    }

    pub fn transcodes(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Transcode { .. }))
            .collect()
    }

    /// Contents of every concat list the engine was asked to join.
    pub fn concat_lists(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Transcode { concat_list, .. } => concat_list,
                Call::Probe(_) => None,
            })
            .collect()
    }

    async fn settle(&self, name: &str) -> bool {
        if let Some(delay) = self.delays.get(name) {
            tokio::time::sleep(*delay).await;
        }
        self.finished.lock().unwrap().push(name.to_string());
        self.failures.contains(name)
    }
}

pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

#[async_trait]
impl MediaEngine for FakeEngine {
    async fn transcode(&self, command: &FfmpegCommand) -> MediaResult<()> {
        let inputs: Vec<String> = command.inputs().map(file_name).collect();
        let concat_list = command
            .inputs()
            .find(|p| p.extension().is_some_and(|e| e == "txt"))
            .and_then(|p| std::fs::read_to_string(p).ok());

        self.calls.lock().unwrap().push(Call::Transcode {
            inputs: inputs.clone(),
            output: command.output().to_path_buf(),
            args: command.build_args(),
            concat_list,
        });

        let key = inputs.first().cloned().unwrap_or_default();
        if self.settle(&key).await {
            // Leave a partial output behind, as a crashed encoder would
            std::fs::write(command.output(), b"partial")?;
            return Err(MediaError::ffmpeg_failed(
                format!("scripted failure for {}", key),
                Some("Invalid data found when processing input".to_string()),
                Some(1),
            ));
        }

        std::fs::write(command.output(), b"encoded")?;
        Ok(())
    }

    async fn probe(&self, path: &Path) -> MediaResult<ProbeInfo> {
        let key = file_name(path);
        self.calls.lock().unwrap().push(Call::Probe(key.clone()));

        if self.settle(&key).await {
            return Err(MediaError::ffprobe_failed(
                format!("scripted probe failure for {}", key),
                None,
            ));
        }
        Ok(self.probes.get(&key).cloned().unwrap_or_else(|| video_info(1280, 720, 10.0)))
    }
}

pub fn video_info(width: u32, height: u32, duration: f64) -> ProbeInfo {
    ProbeInfo {
        duration,
        start_time: 0.0,
        streams: vec![
            StreamInfo {
                codec_type: "video".to_string(),
                width: Some(width),
                height: Some(height),
                frame_rate_expr: Some("30000/1001".to_string()),
            },
            StreamInfo {
                codec_type: "audio".to_string(),
                ..Default::default()
            },
        ],
    }
}

pub fn duration_info(duration: f64, start_time: f64) -> ProbeInfo {
    ProbeInfo {
        duration,
        start_time,
        streams: Vec::new(),
    }
}

pub struct Harness {
    pub dir: tempfile::TempDir,
    pub engine: Arc<FakeEngine>,
    pub coordinator: Coordinator,
}

impl Harness {
    pub fn new(engine: FakeEngine) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let engine = Arc::new(engine);
        let coordinator = Coordinator::new(
            engine.clone(),
            PipelineRegistry::builtin(),
            CoordinatorConfig::default().with_work_dir(dir.path()),
        );
        Self {
            dir,
            engine,
            coordinator,
        }
    }

    /// Collecting job for `pipeline` whose inputs are freshly written files.
    pub async fn job(&self, pipeline: &str, files: &[(&str, &str)]) -> Job {
        let mut job = self.coordinator.create_job(pipeline).await.unwrap().unwrap();
        for (name, mime) in files {
            let path = self.dir.path().join(name);
            std::fs::write(&path, b"source").unwrap();
            job.add_input(InputFile::new("file", *name, path, *mime));
        }
        job
    }

    /// File names currently in the work directory, sorted.
    pub fn remaining(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }
}

/// Paths listed in a concat-demuxer list, in order.
pub fn listed_paths(list: &str) -> Vec<PathBuf> {
    list.lines()
        .filter_map(|line| line.strip_prefix("file '"))
        .filter_map(|rest| rest.strip_suffix('\''))
        .map(|p| PathBuf::from(p.replace("'\\''", "'")))
        .collect()
}
