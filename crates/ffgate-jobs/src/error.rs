//! Job error taxonomy.

use serde::Serialize;
use thiserror::Error;

use ffgate_media::MediaError;
use ffgate_models::TransitionError;

pub type JobResult<T> = Result<T, JobError>;

/// A received input as reported back in role-resolution errors.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ReceivedFile {
    pub name: String,
    #[serde(rename = "type")]
    pub mime_type: String,
    pub detected_role: String,
}

/// Terminal job failures. None are retried.
#[derive(Debug, Error)]
pub enum JobError {
    #[error("Expected {expected} input file(s), received {received}")]
    InputCount { expected: String, received: usize },

    #[error("{message}")]
    RoleResolution {
        message: String,
        received: Vec<ReceivedFile>,
    },

    #[error("Engine failure: {0}")]
    EngineFailure(#[source] MediaError),

    #[error("Probe failure: {0}")]
    ProbeFailure(#[source] MediaError),

    #[error("Download failure: {0}")]
    DownloadFailure(String),

    #[error("Upload limit exceeded: {0}")]
    UploadLimitExceeded(String),

    #[error("Delivery failure: {0}")]
    DeliveryFailure(String),

    #[error("Job state error: {0}")]
    InvalidState(#[from] TransitionError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl JobError {
    pub fn role_resolution(message: impl Into<String>, received: Vec<ReceivedFile>) -> Self {
        Self::RoleResolution {
            message: message.into(),
            received,
        }
    }

    pub fn download_failure(message: impl Into<String>) -> Self {
        Self::DownloadFailure(message.into())
    }

    pub fn upload_limit(message: impl Into<String>) -> Self {
        Self::UploadLimitExceeded(message.into())
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            JobError::InputCount { .. } => "input_count",
            JobError::RoleResolution { .. } => "role_resolution",
            JobError::EngineFailure(_) => "engine_failure",
            JobError::ProbeFailure(_) => "probe_failure",
            JobError::DownloadFailure(_) => "download_failure",
            JobError::UploadLimitExceeded(_) => "upload_limit_exceeded",
            JobError::DeliveryFailure(_) => "delivery_failure",
            JobError::InvalidState(_) => "invalid_state",
            JobError::Io(_) => "io",
        }
    }

    /// Input and role problems are the caller's fault; everything else is ours.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            JobError::InputCount { .. } | JobError::RoleResolution { .. } | JobError::UploadLimitExceeded(_)
        )
    }

    /// Tail of the engine's stderr, for engine and probe failures that captured one.
    pub fn engine_stderr(&self) -> Option<&str> {
        match self {
            JobError::EngineFailure(e) | JobError::ProbeFailure(e) => e.stderr(),
            _ => None,
        }
    }

    /// Files listed in a role-resolution failure.
    pub fn received(&self) -> Option<&[ReceivedFile]> {
        match self {
            JobError::RoleResolution { received, .. } => Some(received),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        let count = JobError::InputCount {
            expected: "at least 2".to_string(),
            received: 1,
        };
        assert!(count.is_client_error());
        assert_eq!(count.code(), "input_count");
        assert_eq!(count.to_string(), "Expected at least 2 input file(s), received 1");

        let engine = JobError::EngineFailure(MediaError::ffmpeg_failed("boom", None, Some(1)));
        assert!(!engine.is_client_error());
        assert!(!JobError::DeliveryFailure("reset".into()).is_client_error());
        assert!(!JobError::ProbeFailure(MediaError::FfprobeNotFound).is_client_error());
    }

    #[test]
    fn test_engine_stderr() {
        let engine = JobError::EngineFailure(MediaError::ffmpeg_failed(
            "boom",
            Some("Unknown encoder 'libfoo'".to_string()),
            Some(1),
        ));
        assert_eq!(engine.engine_stderr(), Some("Unknown encoder 'libfoo'"));

        let probe = JobError::ProbeFailure(MediaError::ffprobe_failed("bad", None));
        assert_eq!(probe.engine_stderr(), None);
        assert_eq!(JobError::upload_limit("too big").engine_stderr(), None);
    }
}
