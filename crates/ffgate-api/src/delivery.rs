//! Artifact delivery.
//!
//! The artifact is streamed from disk and handed back to the janitor when
//! the body ends: on EOF as delivered, on a read error or an early drop
//! (client went away) as failed. Either way the file is removed once.

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use axum::body::{Body, Bytes};
use axum::http::{header, Response, StatusCode};
use futures_util::Stream;
use tokio::io::AsyncRead;
use tokio_util::io::ReaderStream;
use tracing::warn;

use ffgate_jobs::{Artifact, DeliveryOutcome, JobError};

use crate::error::{ApiError, ApiResult};
use crate::metrics;

/// Body stream that reports delivery completion to its [`Artifact`].
pub struct ArtifactStream<R> {
    inner: ReaderStream<R>,
    artifact: Option<Artifact>,
    sent: u64,
}

impl<R: AsyncRead + Unpin> ArtifactStream<R> {
    pub fn new(reader: R, artifact: Artifact) -> Self {
        Self {
            inner: ReaderStream::new(reader),
            artifact: Some(artifact),
            sent: 0,
        }
    }

    fn finish(&mut self, outcome: DeliveryOutcome) {
        if let Some(artifact) = self.artifact.take() {
            match &outcome {
                DeliveryOutcome::Delivered => metrics::record_artifact_delivered(self.sent),
                DeliveryOutcome::Failed(_) => metrics::record_delivery_failure(),
            }
            artifact.complete(outcome);
        }
    }
}

impl<R: AsyncRead + Unpin> Stream for ArtifactStream<R> {
    type Item = io::Result<Bytes>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        match Pin::new(&mut this.inner).poll_next(cx) {
            Poll::Ready(Some(Ok(chunk))) => {
                this.sent += chunk.len() as u64;
                Poll::Ready(Some(Ok(chunk)))
            }
            Poll::Ready(Some(Err(e))) => {
                this.finish(DeliveryOutcome::Failed(e.to_string()));
                Poll::Ready(Some(Err(e)))
            }
            Poll::Ready(None) => {
                this.finish(DeliveryOutcome::Delivered);
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl<R> Drop for ArtifactStream<R> {
    fn drop(&mut self) {
        if let Some(artifact) = self.artifact.take() {
            warn!(file = %artifact.path().display(), sent = self.sent, "Delivery interrupted");
            metrics::record_delivery_failure();
            artifact.complete(DeliveryOutcome::Failed("body dropped before completion".to_string()));
        }
    }
}

/// Stream `artifact` as an attachment.
pub async fn stream_artifact(artifact: Artifact) -> ApiResult<Response<Body>> {
    let file = match tokio::fs::File::open(artifact.path()).await {
        Ok(file) => file,
        Err(e) => {
            let reason = format!("cannot open artifact: {}", e);
            metrics::record_delivery_failure();
            artifact.complete(DeliveryOutcome::Failed(reason.clone()));
            return Err(JobError::DeliveryFailure(reason).into());
        }
    };
    let length = file.metadata().await.ok().map(|m| m.len());

    let file_name = artifact
        .path()
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "output".to_string());
    let content_type = mime_guess::from_path(artifact.path()).first_or_octet_stream();

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type.essence_str())
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", file_name),
        );
    if let Some(length) = length {
        builder = builder.header(header::CONTENT_LENGTH, length);
    }

    builder
        .body(Body::from_stream(ArtifactStream::new(file, artifact)))
        .map_err(|e| ApiError::internal(format!("Failed to build response: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;

    fn artifact_in(dir: &std::path::Path) -> (Artifact, std::path::PathBuf) {
        let path = dir.join("out.mp3");
        std::fs::write(&path, b"encoded").unwrap();
        (Artifact::new(path.clone()), path)
    }

    #[tokio::test]
    async fn test_eof_releases_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let (artifact, path) = artifact_in(dir.path());

        let reader = tokio_test::io::Builder::new().read(b"enc").read(b"oded").build();
        let mut stream = ArtifactStream::new(reader, artifact);

        let mut body = Vec::new();
        while let Some(chunk) = stream.next().await {
            body.extend_from_slice(&chunk.unwrap());
        }
        assert_eq!(body, b"encoded");
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_read_error_releases_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let (artifact, path) = artifact_in(dir.path());

        let reader = tokio_test::io::Builder::new()
            .read(b"enc")
            .read_error(io::Error::new(io::ErrorKind::BrokenPipe, "disk went away"))
            .build();
        let mut stream = ArtifactStream::new(reader, artifact);

        assert!(stream.next().await.unwrap().is_ok());
        assert!(stream.next().await.unwrap().is_err());
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_dropped_body_releases_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let (artifact, path) = artifact_in(dir.path());

        let file = tokio::fs::File::open(&path).await.unwrap();
        let stream = ArtifactStream::new(file, artifact);
        drop(stream);

        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_missing_artifact_is_delivery_failure() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = Artifact::new(dir.path().join("gone.mp4"));

        let err = stream_artifact(artifact).await.unwrap_err();
        assert!(matches!(err, ApiError::Job(JobError::DeliveryFailure(_))));
    }
}
