//! API error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use ffgate_jobs::{JobError, ReceivedFile};

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("route not available")]
    RouteNotAvailable,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Job(#[from] JobError),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::RouteNotAvailable => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Job(err) => match err {
                JobError::InputCount { .. } | JobError::RoleResolution { .. } => StatusCode::BAD_REQUEST,
                JobError::UploadLimitExceeded(_) => StatusCode::PAYLOAD_TOO_LARGE,
                JobError::DownloadFailure(_) => StatusCode::BAD_GATEWAY,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::RouteNotAvailable => "route_not_available",
            ApiError::BadRequest(_) => "bad_request",
            ApiError::Internal(_) => "internal",
            ApiError::Job(err) => err.code(),
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    detail: String,
    code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    received: Option<Vec<ReceivedFile>>,
}

#[derive(Serialize)]
struct RouteNotAvailable {
    error: &'static str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if let ApiError::RouteNotAvailable = self {
            return (status, Json(RouteNotAvailable { error: "route not available" })).into_response();
        }

        // Don't expose internal error details in production
        let detail = if status.is_server_error()
            && std::env::var("ENVIRONMENT").unwrap_or_default() == "production"
        {
            "An internal error occurred".to_string()
        } else {
            self.to_string()
        };

        let received = match &self {
            ApiError::Job(err) => err.received().map(<[ReceivedFile]>::to_vec),
            _ => None,
        };

        let body = ErrorResponse {
            detail,
            code: self.code(),
            received,
        };

        (status, Json(body)).into_response()
    }
}
