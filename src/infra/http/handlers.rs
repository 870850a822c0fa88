use std::path::Path;

use axum::{
    Json,
    extract::{Multipart, State, rejection::JsonRejection},
    http::{
        StatusCode,
        header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    },
    response::{IntoResponse, Response},
};
use tracing::warn;

use crate::{
    application::{error::ConversionError, pipeline::ConversionRequest},
    domain::types::OutputFormat,
    infra::files::is_markdown,
    presentation::views::{IndexTemplate, render_template_response},
};

use super::{
    ConvertPayload, ConvertResponse, HttpState, PDF_PLACEHOLDER, UploadResponse, error::ApiError,
};

pub(super) async fn index(State(state): State<HttpState>) -> Response {
    let template = IndexTemplate::new(state.default_theme, state.max_upload_bytes);
    render_template_response(template, StatusCode::OK)
}

pub(super) async fn health() -> StatusCode {
    StatusCode::NO_CONTENT
}

pub(super) async fn convert(
    State(state): State<HttpState>,
    payload: Result<Json<ConvertPayload>, JsonRejection>,
) -> Result<Json<ConvertResponse>, ApiError> {
    let Json(payload) = payload?;
    let request = match build_request(&state, payload) {
        Ok(request) => request,
        Err(err) => {
            warn!(
                target = "infra::http::convert",
                category = err.category(),
                error = %err,
                "Rejected conversion request"
            );
            return Ok(Json(ConvertResponse::failed(&err)));
        }
    };

    if request.format() == OutputFormat::Pdf {
        return Ok(Json(ConvertResponse::rendered(PDF_PLACEHOLDER)));
    }

    let response = match state
        .pipeline
        .render_html(request.markup(), request.theme().as_str())
    {
        Ok(document) => ConvertResponse::rendered(document.into_string()),
        Err(err) => {
            warn!(
                target = "infra::http::convert",
                category = err.category(),
                error = %err,
                "Conversion failed"
            );
            ConvertResponse::failed(&err)
        }
    };

    Ok(Json(response))
}

pub(super) async fn download(
    State(state): State<HttpState>,
    payload: Result<Json<ConvertPayload>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(payload) = payload?;
    let request = build_request(&state, payload)?;
    if request.format() != OutputFormat::Pdf {
        return Err(ApiError::bad_request(
            "only the pdf format can be downloaded",
            Some(format!("requested format: {}", request.format())),
        ));
    }

    let pipeline = state.pipeline.clone();
    let task = tokio::task::spawn_blocking(move || {
        pipeline.render_pdf(request.markup(), request.theme().as_str())
    });

    // A timed-out export keeps running on the blocking pool until wkhtmltopdf exits.
    let pdf = match tokio::time::timeout(state.pdf_timeout, task).await {
        Err(_) => {
            return Err(ApiError::timeout(format!(
                "PDF export exceeded {} seconds",
                state.pdf_timeout.as_secs()
            )));
        }
        Ok(Err(join_err)) => {
            return Err(ApiError::internal(format!(
                "PDF export task failed: {join_err}"
            )));
        }
        Ok(Ok(result)) => result?,
    };

    Ok((
        [
            (CONTENT_TYPE, "application/pdf"),
            (CONTENT_DISPOSITION, "attachment; filename=converted.pdf"),
        ],
        pdf,
    )
        .into_response())
}

pub(super) async fn upload(mut multipart: Multipart) -> Result<Json<UploadResponse>, ApiError> {
    let mut filename = None;
    let mut data: Option<bytes::Bytes> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(ApiError::from_multipart)?
    {
        if field.name() == Some("file") {
            filename = field.file_name().map(|s| s.to_string());
            data = Some(field.bytes().await.map_err(ApiError::from_multipart)?);
            break;
        }
    }

    let filename = filename.ok_or_else(|| ApiError::bad_request("missing file", None))?;
    let data = data.ok_or_else(|| ApiError::bad_request("missing file", None))?;

    if !is_markdown(Path::new(&filename)) {
        return Err(ApiError::bad_request(
            "only .md files are accepted",
            Some(format!("received `{filename}`")),
        ));
    }

    let content = String::from_utf8(data.to_vec())
        .map_err(|err| ApiError::bad_request("file is not valid UTF-8", Some(err.to_string())))?;

    Ok(Json(UploadResponse {
        success: true,
        content,
        filename,
    }))
}

fn build_request(
    state: &HttpState,
    payload: ConvertPayload,
) -> Result<ConversionRequest, ConversionError> {
    let theme = payload
        .theme
        .as_deref()
        .filter(|theme| !theme.trim().is_empty())
        .unwrap_or(state.default_theme.as_str());
    let format = payload
        .format
        .as_deref()
        .filter(|format| !format.trim().is_empty())
        .unwrap_or(OutputFormat::Html.as_str());
    ConversionRequest::new(payload.markdown, theme, format)
}
