//! Orchestrator configuration.

use std::path::PathBuf;
use std::time::Duration;

use crate::timestamps::TimestampPrecision;

/// Default per-file size cap (500 MiB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 500 * 1024 * 1024;
/// Default URL fetch timeout.
pub const DEFAULT_DOWNLOAD_TIMEOUT_SECS: u64 = 30;

fn default_work_dir() -> PathBuf {
    std::env::temp_dir().join("ffgate")
}

/// Coordinator configuration.
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Directory for uploads, intermediates and artifacts
    pub work_dir: PathBuf,
    /// Timestamp aggregation mode
    pub timestamp_precision: TimestampPrecision,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            work_dir: default_work_dir(),
            timestamp_precision: TimestampPrecision::RoundedSecondPass,
        }
    }
}

impl CoordinatorConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let precise = std::env::var("TIMESTAMPS_PRECISE")
            .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Self {
            work_dir: std::env::var("WORK_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| default_work_dir()),
            timestamp_precision: if precise {
                TimestampPrecision::Precise
            } else {
                TimestampPrecision::RoundedSecondPass
            },
        }
    }

    pub fn with_work_dir(mut self, work_dir: impl Into<PathBuf>) -> Self {
        self.work_dir = work_dir.into();
        self
    }

    pub fn with_timestamp_precision(mut self, precision: TimestampPrecision) -> Self {
        self.timestamp_precision = precision;
        self
    }
}

/// URL intake configuration.
#[derive(Debug, Clone)]
pub struct IntakeConfig {
    /// Ceiling for one URL fetch
    pub download_timeout: Duration,
    /// Per-file size cap
    pub max_file_size: u64,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            download_timeout: Duration::from_secs(DEFAULT_DOWNLOAD_TIMEOUT_SECS),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

impl IntakeConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            download_timeout: Duration::from_secs(
                std::env::var("DOWNLOAD_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_DOWNLOAD_TIMEOUT_SECS),
            ),
            max_file_size: std::env::var("MAX_FILE_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_MAX_FILE_SIZE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CoordinatorConfig::default();
        assert_eq!(config.timestamp_precision, TimestampPrecision::RoundedSecondPass);
        assert!(config.work_dir.ends_with("ffgate"));

        let intake = IntakeConfig::default();
        assert_eq!(intake.download_timeout, Duration::from_secs(30));
        assert_eq!(intake.max_file_size, 500 * 1024 * 1024);
    }
}
