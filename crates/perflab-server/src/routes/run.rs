//! Run endpoint: multipart upload in, rendered report out.

use std::sync::Arc;

use axum::extract::{Multipart, Query, State};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use perflab_core::{store_upload, RunRequest};

use crate::error::{ApiError, ApiResult};
use crate::routes::ResponseFormat;
use crate::server::AppState;

/// Query parameters for `POST /run`.
#[derive(Debug, Default, Deserialize)]
pub struct RunQuery {
    /// Body format; HTML unless `format=json` is given.
    #[serde(default)]
    pub format: ResponseFormat,
}

/// Collected multipart fields.
#[derive(Debug, Default)]
struct RunForm {
    file_name: Option<String>,
    file_bytes: Option<Vec<u8>>,
    events: Option<String>,
    output: Option<String>,
}

/// `POST /run`: accept `testfile` (file part), `events` (comma-separated
/// string) and optional `output`, run the pipeline, render the report.
///
/// The client file name of the `testfile` part names the corpus source
/// file; the uploaded bytes themselves are spooled for audit and never
/// handed to the pipeline.
pub async fn run(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RunQuery>,
    multipart: Multipart,
) -> ApiResult<Response> {
    let format = query.format;
    let form = read_form(multipart, format).await?;

    let file_name = form.file_name.filter(|name| !name.is_empty()).ok_or_else(|| {
        ApiError::bad_request("multipart field 'testfile' with a file name is required")
            .with_format(format)
    })?;
    let events_raw = form.events.ok_or_else(|| {
        ApiError::bad_request("multipart field 'events' is required").with_format(format)
    })?;

    let stored = store_upload(
        &state.service.config().upload_dir,
        &file_name,
        form.file_bytes.as_deref().unwrap_or_default(),
    )
    .map_err(|err| ApiError::from_run_error(err, format))?;
    tracing::debug!(spooled = %stored.path.display(), "upload stored");

    let request = RunRequest {
        source_file: file_name,
        events: RunRequest::parse_events(&events_raw),
        output_file: form.output,
    };

    let report = state
        .service
        .run(&request)
        .await
        .map_err(|err| ApiError::from_run_error(err, format))?;

    Ok(match format {
        ResponseFormat::Html => Html(report.to_html()).into_response(),
        ResponseFormat::Json => Json(report.to_json()).into_response(),
    })
}

/// Drain the multipart stream into a [`RunForm`]. Unknown fields are
/// ignored, matching the permissive form handling of typical upload
/// middleware.
async fn read_form(mut multipart: Multipart, format: ResponseFormat) -> ApiResult<RunForm> {
    let mut form = RunForm::default();

    while let Some(field) = multipart.next_field().await.map_err(|err| {
        ApiError::bad_request(format!("malformed multipart body: {err}")).with_format(format)
    })? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("testfile") => {
                let file_name = field.file_name().map(str::to_string);
                let bytes = field.bytes().await.map_err(|err| {
                    ApiError::bad_request(format!("failed to read upload: {err}"))
                        .with_format(format)
                })?;
                form.file_name = file_name;
                form.file_bytes = Some(bytes.to_vec());
            }
            Some("events") => {
                form.events = Some(field_text(field, format).await?);
            }
            Some("output") => {
                let value = field_text(field, format).await?;
                if !value.trim().is_empty() {
                    form.output = Some(value);
                }
            }
            _ => {}
        }
    }

    Ok(form)
}

async fn field_text(
    field: axum::extract::multipart::Field<'_>,
    format: ResponseFormat,
) -> ApiResult<String> {
    field.text().await.map_err(|err| {
        ApiError::bad_request(format!("failed to read form field: {err}")).with_format(format)
    })
}
