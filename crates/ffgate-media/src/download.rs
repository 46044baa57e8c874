//! Fetching remote inputs over HTTP.

use futures_util::StreamExt;
use std::path::Path;
use std::time::Duration;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::error::{MediaError, MediaResult};

/// Result of a completed download.
#[derive(Debug, Clone)]
pub struct DownloadedFile {
    /// `Content-Type` reported by the server, without parameters
    pub content_type: Option<String>,
    pub bytes: u64,
}

/// Stream `url` into `dest`, giving up after `timeout` or once `max_bytes` is exceeded.
///
/// A partially written `dest` is left in place for the caller to release.
pub async fn download_to_file(
    client: &reqwest::Client,
    url: &str,
    dest: impl AsRef<Path>,
    timeout: Duration,
    max_bytes: u64,
) -> MediaResult<DownloadedFile> {
    let dest = dest.as_ref();
    info!("Downloading {} to {}", url, dest.display());

    match tokio::time::timeout(timeout, fetch(client, url, dest, max_bytes)).await {
        Ok(result) => result,
        Err(_) => Err(MediaError::Timeout(timeout.as_secs())),
    }
}

async fn fetch(
    client: &reqwest::Client,
    url: &str,
    dest: &Path,
    max_bytes: u64,
) -> MediaResult<DownloadedFile> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| MediaError::download_failed(format!("{}: {}", url, e)))?;

    let status = response.status();
    if !status.is_success() {
        return Err(MediaError::download_failed(format!("{} returned {}", url, status)));
    }

    if let Some(len) = response.content_length() {
        if len > max_bytes {
            return Err(MediaError::ResourceLimit(format!(
                "{} is {} bytes, limit is {}",
                url, len, max_bytes
            )));
        }
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    let mut file = File::create(dest).await?;
    let mut stream = response.bytes_stream();
    let mut bytes: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| MediaError::download_failed(format!("{}: {}", url, e)))?;
        bytes += chunk.len() as u64;
        if bytes > max_bytes {
            return Err(MediaError::ResourceLimit(format!(
                "{} exceeds {} bytes",
                url, max_bytes
            )));
        }
        file.write_all(&chunk).await?;
    }
    file.flush().await?;

    debug!(url = %url, bytes = bytes, "Download complete");

    Ok(DownloadedFile { content_type, bytes })
}
