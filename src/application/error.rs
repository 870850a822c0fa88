use std::{error::Error as StdError, io, path::PathBuf};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::{
    application::render::RenderError,
    domain::error::DomainError,
    infra::{
        error::InfraError,
        pdf::{INSTALL_INSTRUCTIONS, PdfExportError},
    },
};

/// Failure of a single conversion. Every variant maps to a stable category.
#[derive(Debug, Error)]
pub enum ConversionError {
    #[error(transparent)]
    InvalidInput(#[from] DomainError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("wkhtmltopdf is not installed")]
    ToolUnavailable,
    #[error("PDF rendering failed: {0}")]
    ToolFailure(#[source] PdfExportError),
    #[error("i/o failure at `{}`: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ConversionError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Stable, machine-readable category.
    pub fn category(&self) -> &'static str {
        match self {
            ConversionError::InvalidInput(_) => "invalid_input",
            ConversionError::Render(RenderError::Markdown { .. }) => "parse_failure",
            ConversionError::Render(RenderError::Document { .. }) => "document_failure",
            ConversionError::ToolUnavailable => "tool_unavailable",
            ConversionError::ToolFailure(_) => "tool_failure",
            ConversionError::Io { .. } => "io_failure",
        }
    }

    /// Remediation text for failures the user can fix themselves.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            ConversionError::ToolUnavailable => Some(INSTALL_INSTRUCTIONS),
            _ => None,
        }
    }
}

impl From<PdfExportError> for ConversionError {
    fn from(error: PdfExportError) -> Self {
        match error {
            PdfExportError::Unavailable => ConversionError::ToolUnavailable,
            other => ConversionError::ToolFailure(other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub source: &'static str,
    pub status: StatusCode,
    pub messages: Vec<String>,
}

impl ErrorReport {
    pub fn from_error(source: &'static str, status: StatusCode, error: &dyn StdError) -> Self {
        let mut messages = Vec::new();
        messages.push(error.to_string());
        let mut current = error.source();
        while let Some(inner) = current {
            messages.push(inner.to_string());
            current = inner.source();
        }
        Self {
            source,
            status,
            messages,
        }
    }

    pub fn from_message(
        source: &'static str,
        status: StatusCode,
        message: impl Into<String>,
    ) -> Self {
        Self {
            source,
            status,
            messages: vec![message.into()],
        }
    }

    pub fn attach(self, response: &mut Response) {
        response.extensions_mut().insert(self);
    }
}

#[derive(Debug)]
pub struct HttpError {
    status: StatusCode,
    public_message: &'static str,
    report: ErrorReport,
}

impl HttpError {
    pub fn from_error(
        source: &'static str,
        status: StatusCode,
        public_message: &'static str,
        error: &dyn StdError,
    ) -> Self {
        let report = ErrorReport::from_error(source, status, error);
        Self {
            status,
            public_message,
            report,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let mut response = (self.status, self.public_message).into_response();
        self.report.attach(&mut response);
        response
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Conversion(#[from] ConversionError),
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error("{failed} of {total} files failed to convert")]
    BatchIncomplete { failed: usize, total: usize },
    #[error("validation failed: {0}")]
    Validation(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn hint(&self) -> Option<&'static str> {
        match self {
            AppError::Conversion(err) => err.hint(),
            _ => None,
        }
    }
}
