use axum::{
    Json,
    extract::{multipart::MultipartError, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::application::{
    error::{ConversionError, ErrorReport},
    render::RenderError,
};

#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    pub error: ApiErrorMessage,
}

pub mod codes {
    pub const BAD_REQUEST: &str = "bad_request";
    pub const PAYLOAD_TOO_LARGE: &str = "payload_too_large";
    pub const TIMEOUT: &str = "timeout";
    pub const INTERNAL: &str = "internal_error";
}

#[derive(Debug, Serialize)]
pub struct ApiErrorMessage {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
    hint: Option<String>,
}

impl ApiError {
    pub fn new(
        status: StatusCode,
        code: &'static str,
        message: impl Into<String>,
        hint: Option<String>,
    ) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            hint,
        }
    }

    pub fn bad_request(message: impl Into<String>, hint: Option<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, codes::BAD_REQUEST, message, hint)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(StatusCode::GATEWAY_TIMEOUT, codes::TIMEOUT, message, None)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            codes::INTERNAL,
            message,
            None,
        )
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn from_multipart(err: MultipartError) -> Self {
        let status = err.status();
        let code = if status == StatusCode::PAYLOAD_TOO_LARGE {
            codes::PAYLOAD_TOO_LARGE
        } else {
            codes::BAD_REQUEST
        };
        Self::new(status, code, err.body_text(), None)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request("invalid JSON payload", Some(rejection.body_text()))
    }
}

impl From<ConversionError> for ApiError {
    fn from(err: ConversionError) -> Self {
        let status = match &err {
            ConversionError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ConversionError::Render(RenderError::Markdown { .. }) => StatusCode::BAD_REQUEST,
            ConversionError::Render(RenderError::Document { .. }) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ConversionError::ToolUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ConversionError::ToolFailure(_) => StatusCode::BAD_GATEWAY,
            ConversionError::Io { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(
            status,
            err.category(),
            err.to_string(),
            err.hint().map(str::to_string),
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let detail = format!("{}: {}", self.code, self.message);
        let body = ApiErrorBody {
            error: ApiErrorMessage {
                code: self.code.to_string(),
                message: self.message,
                hint: self.hint,
            },
        };
        let mut response = (self.status, Json(body)).into_response();
        ErrorReport::from_message("infra::http", self.status, detail).attach(&mut response);
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{domain::error::DomainError, infra::pdf::PdfExportError};

    #[test]
    fn conversion_failures_map_to_statuses() {
        let cases: Vec<(ConversionError, StatusCode)> = vec![
            (DomainError::EmptyMarkup.into(), StatusCode::BAD_REQUEST),
            (
                PdfExportError::Unavailable.into(),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                PdfExportError::EmptyOutput.into(),
                StatusCode::BAD_GATEWAY,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[test]
    fn missing_tool_keeps_install_hint() {
        let api: ApiError = ConversionError::from(PdfExportError::Unavailable).into();
        assert!(
            api.hint
                .as_deref()
                .is_some_and(|hint| hint.contains("wkhtmltopdf.org"))
        );
    }
}
