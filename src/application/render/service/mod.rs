mod config;

use std::sync::Arc;

use comrak::{Arena, format_html, nodes::AstNode, parse_document};
use once_cell::sync::Lazy;

use crate::application::render::types::{RenderError, RenderService, RenderedFragment};

use config::default_options;
pub use config::FragmentSanitizer;

/// Comrak-backed GitHub-flavored markdown parser.
pub struct ComrakRenderService {
    options: comrak::Options<'static>,
}

impl ComrakRenderService {
    /// Construct a renderer with the GFM extension set, automatic heading
    /// identifiers, hard line breaks and raw HTML pass-through enabled.
    fn new() -> Self {
        Self {
            options: default_options(),
        }
    }
}

static RENDER_SERVICE: Lazy<Arc<ComrakRenderService>> =
    Lazy::new(|| Arc::new(ComrakRenderService::new()));

/// Access the shared render service instance, initialised on first use.
pub fn render_service() -> Arc<ComrakRenderService> {
    Arc::clone(&RENDER_SERVICE)
}

impl Default for ComrakRenderService {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderService for ComrakRenderService {
    fn render(&self, markup: &[u8]) -> Result<RenderedFragment, RenderError> {
        let markdown = decode_stage(markup)?;

        let arena = Arena::new();
        let root = parse_document(&arena, markdown, &self.options);

        render_html_stage(root, &self.options).map(RenderedFragment::new)
    }
}

fn decode_stage(markup: &[u8]) -> Result<&str, RenderError> {
    std::str::from_utf8(markup).map_err(|err| RenderError::Markdown {
        message: format!("input is not valid UTF-8: {err}"),
    })
}

fn render_html_stage<'a>(
    root: &'a AstNode<'a>,
    options: &comrak::Options<'static>,
) -> Result<String, RenderError> {
    let mut html = String::new();
    format_html(root, options, &mut html).map_err(|err| RenderError::Markdown {
        message: err.to_string(),
    })?;
    Ok(html)
}
