//! Gateway configuration.

use ffgate_jobs::config::DEFAULT_MAX_FILE_SIZE;

/// Slack on top of the summed file caps for multipart framing and text fields.
const FORM_OVERHEAD_BYTES: u64 = 1024 * 1024;

/// HTTP gateway configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// CORS origins
    pub cors_origins: Vec<String>,
    /// Per-file upload cap in bytes
    pub max_file_size: u64,
    /// File cap for jobs whose arity has no fixed count
    pub max_files_per_job: usize,
    /// Environment (development/production)
    pub environment: String,
    /// Serve Prometheus metrics at `/metrics`
    pub metrics_enabled: bool,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            cors_origins: vec!["*".to_string()],
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            max_files_per_job: 32,
            environment: "development".to_string(),
            metrics_enabled: true,
        }
    }
}

impl GatewayConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("API_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(8080),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|s| s.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or_else(|_| vec!["*".to_string()]),
            max_file_size: std::env::var("MAX_FILE_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_MAX_FILE_SIZE),
            max_files_per_job: std::env::var("MAX_FILES_PER_JOB")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|n: &usize| *n > 0)
                .unwrap_or(32),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            metrics_enabled: std::env::var("METRICS_ENABLED")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(true),
        }
    }

    /// Check if running in production mode.
    pub fn is_production(&self) -> bool {
        self.environment.to_lowercase() == "production"
    }

    /// Whole-request cap: every file at its limit plus form overhead.
    pub fn max_body_size(&self) -> usize {
        let total = self
            .max_file_size
            .saturating_mul(self.max_files_per_job as u64)
            .saturating_add(FORM_OVERHEAD_BYTES);
        usize::try_from(total).unwrap_or(usize::MAX)
    }
}
