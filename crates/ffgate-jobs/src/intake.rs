//! Concurrent URL fetching into a collecting job.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::info;
use url::Url;

use ffgate_media::{download_to_file, DownloadedFile, MediaError};
use ffgate_models::{InputFile, MediaRole};

use crate::config::IntakeConfig;
use crate::coordinator::Job;
use crate::error::{JobError, JobResult};
use crate::fanout::join_indexed;

/// Field name recorded on inputs fetched by URL.
pub const URL_FIELD_NAME: &str = "url";

/// One remote input.
#[derive(Debug, Clone, Deserialize)]
pub struct UrlInput {
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub role: Option<MediaRole>,
}

/// Downloads remote inputs with a fixed timeout and a per-file size cap.
#[derive(Debug, Clone)]
pub struct UrlIntake {
    client: reqwest::Client,
    config: IntakeConfig,
}

impl UrlIntake {
    pub fn new(config: IntakeConfig) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(concat!("ffgate/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_default();
        Self::with_client(client, config)
    }

    pub fn with_client(client: reqwest::Client, config: IntakeConfig) -> Self {
        Self { client, config }
    }

    /// Fetch every input concurrently and append them to `job` in request order.
    ///
    /// All downloads run to completion before the outcome is checked. On
    /// error nothing is appended; the partially written files stay owned by
    /// the job and go away with it.
    pub async fn fetch_all(&self, job: &mut Job, inputs: &[UrlInput]) -> JobResult<()> {
        let urls = inputs
            .iter()
            .map(|input| parse_url(&input.url))
            .collect::<JobResult<Vec<Url>>>()?;

        let paths: Vec<PathBuf> = urls
            .iter()
            .map(|url| job.allocate_input_path(extension_of(url)))
            .collect();

        let fanout = join_indexed(urls.len(), |index| {
            let url = urls[index].as_str();
            let dest = paths[index].as_path();
            self.fetch_one(url, dest)
        })
        .await;
        let downloads = fanout.into_ordered()?;

        for (((input, url), path), download) in inputs.iter().zip(&urls).zip(paths).zip(downloads) {
            let name = file_name_of(url);
            let mime = download
                .content_type
                .filter(|ct| ct != "application/octet-stream")
                .unwrap_or_else(|| {
                    mime_guess::from_path(&name)
                        .first_or_octet_stream()
                        .essence_str()
                        .to_string()
                });

            let mut file = InputFile::new(URL_FIELD_NAME, name, path, mime);
            file.title = input.title.clone();
            file.role = input.role;
            job.add_input(file);
        }

        info!(job_id = %job.id(), count = inputs.len(), "Fetched URL inputs");
        Ok(())
    }

    async fn fetch_one(&self, url: &str, dest: &Path) -> JobResult<DownloadedFile> {
        download_to_file(
            &self.client,
            url,
            dest,
            self.config.download_timeout,
            self.config.max_file_size,
        )
        .await
        .map_err(|e| match e {
            MediaError::ResourceLimit(message) => JobError::upload_limit(message),
            MediaError::Timeout(_) => JobError::download_failure(format!(
                "{} timed out after {:?}",
                url, self.config.download_timeout
            )),
            other => JobError::download_failure(other.to_string()),
        })
    }
}

fn parse_url(raw: &str) -> JobResult<Url> {
    let url = Url::parse(raw.trim())
        .map_err(|e| JobError::download_failure(format!("Invalid URL {:?}: {}", raw, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(JobError::download_failure(format!(
            "Unsupported URL scheme {:?} in {}",
            scheme, raw
        ))),
    }
}

/// Last non-empty path segment, or the host when the path is bare.
fn file_name_of(url: &Url) -> String {
    url.path_segments()
        .and_then(|mut segments| segments.next_back().map(str::to_string))
        .filter(|segment| !segment.is_empty())
        .or_else(|| url.host_str().map(str::to_string))
        .unwrap_or_else(|| "download".to_string())
}

fn extension_of(url: &Url) -> &str {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .and_then(|segment| Path::new(segment).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| ext.len() <= 8 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or("")
}
