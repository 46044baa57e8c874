//! Job submission: multipart or URL intake, run, deliver.

use std::path::Path as FsPath;

use axum::extract::multipart::{Field, MultipartError};
use axum::extract::{Multipart, Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use ffgate_jobs::{Job, JobError, JobOutcome, UrlInput};
use ffgate_models::{InputFile, MediaRole};

use crate::delivery::stream_artifact;
use crate::error::{ApiError, ApiResult};
use crate::metrics;
use crate::state::AppState;

/// Text field whose values are zipped onto the uploaded files by position.
const TITLE_FIELD: &str = "title";

/// Body of `POST /{id}/url`.
#[derive(Debug, Deserialize)]
pub struct UrlJobRequest {
    pub inputs: Vec<UrlInput>,
}

/// `POST /{id}`: multipart upload.
pub async fn submit_upload(
    State(state): State<AppState>,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> ApiResult<Response> {
    let mut job = open_job(&state, &id).await?;

    if let Err(err) = ingest_multipart(&state, &mut job, &mut multipart).await {
        return Err(match err {
            ApiError::Job(e) => ApiError::Job(job.abort(e)),
            other => {
                job.discard(&other.to_string());
                other
            }
        });
    }

    execute(&state, job).await
}

/// `POST /{id}/url`: fetch inputs by URL.
pub async fn submit_urls(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UrlJobRequest>,
) -> ApiResult<Response> {
    let mut job = open_job(&state, &id).await?;
    if !job.descriptor().url_input_allowed {
        job.discard("url input not allowed");
        return Err(ApiError::RouteNotAvailable);
    }

    let cap = job.descriptor().arity.max_files(state.config.max_files_per_job);
    if request.inputs.len() > cap {
        let err = JobError::upload_limit(format!(
            "{} accepts at most {} file(s), received {}",
            id,
            cap,
            request.inputs.len()
        ));
        return Err(job.abort(err).into());
    }

    if let Err(err) = state.intake.fetch_all(&mut job, &request.inputs).await {
        return Err(job.abort(err).into());
    }

    execute(&state, job).await
}

/// Fallback for unknown routes.
pub async fn route_not_available() -> ApiError {
    ApiError::RouteNotAvailable
}

async fn open_job(state: &AppState, id: &str) -> ApiResult<Job> {
    state
        .coordinator
        .create_job(id)
        .await?
        .ok_or(ApiError::RouteNotAvailable)
}

async fn execute(state: &AppState, job: Job) -> ApiResult<Response> {
    let outcome = state.coordinator.run(job).await?;

    match outcome {
        JobOutcome::Artifact(artifact) => stream_artifact(artifact).await,
        JobOutcome::Timestamps(report) => Ok(Json(report).into_response()),
        JobOutcome::Duration(duration) => Ok((
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            duration,
        )
            .into_response()),
    }
}

/// Read every multipart field into the collecting job, enforcing both caps.
async fn ingest_multipart(state: &AppState, job: &mut Job, multipart: &mut Multipart) -> ApiResult<()> {
    let cap = job.descriptor().arity.max_files(state.config.max_files_per_job);
    let mut titles = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or("file").to_string();

        let Some(file_name) = field.file_name().map(str::to_string) else {
            let value = field.text().await.map_err(multipart_error)?;
            if name == TITLE_FIELD {
                titles.push(value);
            } else {
                debug!(field = %name, "Ignoring text field");
            }
            continue;
        };

        if job.inputs().len() >= cap {
            return Err(JobError::upload_limit(format!(
                "{} accepts at most {} file(s)",
                job.descriptor().id,
                cap
            ))
            .into());
        }

        let mime = field
            .content_type()
            .map(str::to_string)
            .unwrap_or_else(|| {
                mime_guess::from_path(&file_name)
                    .first_or_octet_stream()
                    .essence_str()
                    .to_string()
            });
        let path = job.allocate_input_path(upload_extension(&file_name));
        let bytes = write_field(field, &path, &file_name, state.config.max_file_size).await?;
        metrics::record_upload(&job.descriptor().id, bytes);

        let mut input = InputFile::new(name.clone(), file_name, path, mime);
        if let Ok(role) = name.parse::<MediaRole>() {
            input = input.with_role(role);
        }
        job.add_input(input);
    }

    for (index, title) in titles.into_iter().enumerate() {
        job.set_title(index, title);
    }

    info!(
        job_id = %job.id(),
        pipeline = %job.descriptor().id,
        files = job.inputs().len(),
        "Upload received"
    );
    Ok(())
}

/// Stream one file field to `path`, failing as soon as it passes `max_bytes`.
async fn write_field(mut field: Field<'_>, path: &FsPath, file_name: &str, max_bytes: u64) -> ApiResult<u64> {
    let mut file = tokio::fs::File::create(path).await.map_err(JobError::from)?;
    let mut written: u64 = 0;

    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        written += chunk.len() as u64;
        if written > max_bytes {
            return Err(JobError::upload_limit(format!(
                "{} exceeds the {} byte file limit",
                file_name, max_bytes
            ))
            .into());
        }
        file.write_all(&chunk).await.map_err(JobError::from)?;
    }
    file.flush().await.map_err(JobError::from)?;

    Ok(written)
}

fn multipart_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        JobError::upload_limit(err.body_text()).into()
    } else {
        ApiError::bad_request(err.body_text())
    }
}

/// Extension kept on the stored upload so the engine can sniff by name.
fn upload_extension(file_name: &str) -> &str {
    FsPath::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| ext.len() <= 8 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or("")
}
