use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use cep_core::PipelineError;
use serde::Serialize;

/// Failure returned by either service, rendered as `{"message": "..."}`.
#[derive(Debug)]
pub enum ApiError {
    /// Body is not valid JSON or lacks a `cep` string.
    InvalidInput,
    Pipeline(PipelineError),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    message: &'static str,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput => StatusCode::BAD_REQUEST,
            ApiError::Pipeline(e) => e.status_code(),
        }
    }

    fn message(&self) -> &'static str {
        match self {
            ApiError::InvalidInput => "invalid request body",
            ApiError::Pipeline(e) => e.client_message(),
        }
    }
}

impl From<PipelineError> for ApiError {
    fn from(e: PipelineError) -> Self {
        ApiError::Pipeline(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(reason = %rejection.body_text(), "Rejected request body");
        ApiError::InvalidInput
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(ErrorBody { message: self.message() })).into_response()
    }
}

/// Operator-facing log line for a failed request; details stay server-side.
pub(crate) fn log_failure(span: &tracing::Span, err: &PipelineError) {
    match err {
        PipelineError::UpstreamTransport(detail) => {
            tracing::error!(parent: span, %detail, "Upstream transport failure");
        }
        other => {
            tracing::info!(
                parent: span,
                reason = %other,
                status = other.status_code().as_u16(),
                "Request rejected"
            );
        }
    }
}
