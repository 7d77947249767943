//! API error types and HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use serde_json::json;

use perflab_core::report::html_escape;
use perflab_core::RunError;

use crate::routes::ResponseFormat;

/// API result type.
pub type ApiResult<T> = Result<T, ApiError>;

/// HTTP API error with a stable machine-readable code.
///
/// The body follows the format the client asked for: browser clients get
/// the classic `<pre>` fragment, API clients get JSON. Captured pipeline
/// stderr is carried verbatim, never summarised away.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
    stderr: Option<String>,
    format: ResponseFormat,
}

impl ApiError {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            stderr: None,
            format: ResponseFormat::default(),
        }
    }

    /// Error response for invalid request shape or parameters.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", message)
    }

    /// Internal error response.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL", message)
    }

    /// Attach the response format the client asked for.
    pub fn with_format(mut self, format: ResponseFormat) -> Self {
        self.format = format;
        self
    }

    /// Map a run flow error onto a status and stable code.
    ///
    /// Validation problems are the client's fault (400); pipeline
    /// execution and artifact problems are upstream failures (502).
    pub fn from_run_error(err: RunError, format: ResponseFormat) -> Self {
        let (status, code) = match &err {
            RunError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "INVALID_INPUT"),
            RunError::Spawn { .. } => (StatusCode::BAD_GATEWAY, "PIPELINE_SPAWN_FAILED"),
            RunError::PipelineFailed { .. } => (StatusCode::BAD_GATEWAY, "PIPELINE_FAILED"),
            RunError::Timeout { .. } => (StatusCode::BAD_GATEWAY, "PIPELINE_TIMEOUT"),
            RunError::MissingArtifact { .. } => (StatusCode::BAD_GATEWAY, "ARTIFACT_MISSING"),
            RunError::MalformedArtifact { .. } => (StatusCode::BAD_GATEWAY, "ARTIFACT_MALFORMED"),
            RunError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL"),
        };
        let stderr = err.stderr().map(str::to_string);
        Self {
            status,
            code,
            message: err.to_string(),
            stderr,
            format,
        }
    }

    /// Status this error maps to.
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::warn!(code = self.code, status = %self.status, "request failed");
        match self.format {
            ResponseFormat::Json => {
                let body = json!({
                    "code": self.code,
                    "message": self.message,
                    "stderr": self.stderr,
                });
                (self.status, Json(body)).into_response()
            }
            ResponseFormat::Html => {
                let detail = match &self.stderr {
                    Some(stderr) => format!("Error running script:\n{stderr}"),
                    None => self.message.clone(),
                };
                let body = format!("<pre>{}</pre>", html_escape(&detail));
                (self.status, Html(body)).into_response()
            }
        }
    }
}
