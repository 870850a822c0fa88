//! Web front end: a form page plus JSON/multipart routes over the pipeline.

mod error;
mod handlers;
mod middleware;
mod models;

use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post},
};

use crate::{application::pipeline::ConversionPipeline, config::Settings, domain::types::Theme};

pub use error::{ApiError, ApiErrorBody, ApiErrorMessage, codes};
pub use models::{ConvertPayload, ConvertResponse, UploadResponse};

/// Text returned by `/convert` for PDF requests; the file itself comes from `/download`.
pub const PDF_PLACEHOLDER: &str = "PDF is being prepared...";

#[derive(Clone)]
pub struct HttpState {
    pub pipeline: Arc<ConversionPipeline>,
    pub default_theme: Theme,
    pub pdf_timeout: Duration,
    pub max_upload_bytes: usize,
}

impl HttpState {
    pub fn new(pipeline: Arc<ConversionPipeline>, settings: &Settings) -> Self {
        Self {
            pipeline,
            default_theme: settings.render.default_theme,
            pdf_timeout: settings.pdf.timeout,
            max_upload_bytes: settings.server.max_upload_bytes.get(),
        }
    }
}

pub fn build_router(state: HttpState) -> Router {
    let body_limit = state.max_upload_bytes;

    Router::new()
        .route("/", get(handlers::index))
        .route("/convert", post(handlers::convert))
        .route("/upload", post(handlers::upload))
        .route("/download", post(handlers::download))
        .route("/_health", get(handlers::health))
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(axum_middleware::from_fn(middleware::log_responses))
        .layer(axum_middleware::from_fn(middleware::set_request_context))
}
