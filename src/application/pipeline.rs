//! Conversion orchestration shared by the CLI and HTTP front ends.
//!
//! Parser → theme resolver → assembler, optionally followed by the PDF
//! exporter. The pipeline holds only immutable collaborators, so one instance
//! can serve concurrent requests without synchronisation.

use std::{sync::Arc, time::Instant};

use metrics::{counter, histogram};
use tracing::{debug, info};

use crate::{
    application::{
        error::ConversionError,
        render::{FragmentSanitizer, RenderService, RenderedDocument, assemble, resolve_theme},
    },
    domain::{
        error::DomainError,
        types::{OutputFormat, Theme},
    },
    infra::pdf::PdfExporter,
};

/// A validated conversion request. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionRequest {
    markup: Vec<u8>,
    theme: Theme,
    format: OutputFormat,
}

impl ConversionRequest {
    /// Validate raw inputs as received from a front end. Blank markup and
    /// unrecognised formats are rejected; unrecognised themes fall back to light.
    pub fn new(
        markup: impl Into<Vec<u8>>,
        theme_id: &str,
        format: &str,
    ) -> Result<Self, ConversionError> {
        let markup = markup.into();
        ensure_not_blank(&markup)?;
        let format = format.parse::<OutputFormat>()?;
        Ok(Self {
            markup,
            theme: Theme::from_id(theme_id),
            format,
        })
    }

    pub fn with_format(
        markup: impl Into<Vec<u8>>,
        theme: Theme,
        format: OutputFormat,
    ) -> Result<Self, ConversionError> {
        let markup = markup.into();
        ensure_not_blank(&markup)?;
        Ok(Self {
            markup,
            theme,
            format,
        })
    }

    pub fn markup(&self) -> &[u8] {
        &self.markup
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }
}

// Invalid UTF-8 is not blank; the parser reports it.
fn ensure_not_blank(markup: &[u8]) -> Result<(), DomainError> {
    match std::str::from_utf8(markup) {
        Ok(text) if text.trim().is_empty() => Err(DomainError::EmptyMarkup),
        _ => Ok(()),
    }
}

/// Terminal artifact of a conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionOutput {
    Html(RenderedDocument),
    Pdf(Vec<u8>),
}

impl ConversionOutput {
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            ConversionOutput::Html(document) => document.into_string().into_bytes(),
            ConversionOutput::Pdf(bytes) => bytes,
        }
    }
}

/// Per-item result of [`ConversionPipeline::render_many`].
#[derive(Debug)]
pub struct BatchOutcome<K> {
    pub identifier: K,
    pub result: Result<RenderedDocument, ConversionError>,
}

pub struct ConversionPipeline {
    renderer: Arc<dyn RenderService>,
    sanitizer: Option<FragmentSanitizer>,
    exporter: PdfExporter,
}

impl ConversionPipeline {
    pub fn new(renderer: Arc<dyn RenderService>, exporter: PdfExporter) -> Self {
        Self {
            renderer,
            sanitizer: None,
            exporter,
        }
    }

    /// Clean every parsed fragment before assembly. Meant for front ends that
    /// accept markdown from untrusted authors.
    pub fn with_sanitizer(mut self, sanitizer: FragmentSanitizer) -> Self {
        self.sanitizer = Some(sanitizer);
        self
    }

    pub fn exporter(&self) -> &PdfExporter {
        &self.exporter
    }

    /// Parse, theme and assemble one document. Blank markup is rejected with
    /// `invalid_input` before the parser runs, as with [`ConversionRequest`].
    pub fn render_html(
        &self,
        markup: &[u8],
        theme_id: &str,
    ) -> Result<RenderedDocument, ConversionError> {
        let result = self.build_document(markup, theme_id);
        observe(OutputFormat::Html, &result);
        result
    }

    pub fn render_pdf(&self, markup: &[u8], theme_id: &str) -> Result<Vec<u8>, ConversionError> {
        let result = self.build_document(markup, theme_id).and_then(|document| {
            let started_at = Instant::now();
            let bytes = self.exporter.export(document.as_str())?;
            histogram!("mdpress_pdf_render_ms").record(started_at.elapsed().as_millis() as f64);
            Ok(bytes)
        });
        observe(OutputFormat::Pdf, &result);
        result
    }

    /// Convert every item independently. A failing item never aborts the
    /// others; outcomes are returned in input order.
    pub fn render_many<K>(
        &self,
        items: impl IntoIterator<Item = (K, Vec<u8>)>,
        theme_id: &str,
    ) -> Vec<BatchOutcome<K>> {
        let theme = Theme::from_id(theme_id);
        let outcomes: Vec<BatchOutcome<K>> = items
            .into_iter()
            .map(|(identifier, markup)| {
                let result = self.render_html(&markup, theme.as_str());
                BatchOutcome { identifier, result }
            })
            .collect();

        let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
        info!(
            target = "application::pipeline",
            op = "pipeline::render_many",
            total = outcomes.len(),
            failed,
            theme = theme.as_str(),
            "Batch conversion finished"
        );

        outcomes
    }

    pub fn convert(&self, request: &ConversionRequest) -> Result<ConversionOutput, ConversionError> {
        let theme_id = request.theme().as_str();
        match request.format() {
            OutputFormat::Html => self
                .render_html(request.markup(), theme_id)
                .map(ConversionOutput::Html),
            OutputFormat::Pdf => self
                .render_pdf(request.markup(), theme_id)
                .map(ConversionOutput::Pdf),
        }
    }

    fn build_document(
        &self,
        markup: &[u8],
        theme_id: &str,
    ) -> Result<RenderedDocument, ConversionError> {
        let started_at = Instant::now();

        ensure_not_blank(markup)?;
        let fragment = self.renderer.render(markup)?;
        let fragment = match &self.sanitizer {
            Some(sanitizer) => sanitizer.clean(fragment),
            None => fragment,
        };
        let assets = resolve_theme(theme_id);
        let document = assemble(&fragment, &assets)?;

        debug!(
            target = "application::pipeline",
            op = "pipeline::build_document",
            markup_bytes = markup.len(),
            document_bytes = document.as_str().len(),
            sanitized = self.sanitizer.is_some(),
            elapsed_ms = started_at.elapsed().as_millis() as u64,
            "Document assembled"
        );

        Ok(document)
    }
}

fn observe<T>(format: OutputFormat, result: &Result<T, ConversionError>) {
    counter!("mdpress_conversions_total", "format" => format.as_str()).increment(1);
    if let Err(err) = result {
        counter!(
            "mdpress_conversion_failures_total",
            "format" => format.as_str(),
            "category" => err.category()
        )
        .increment(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_markup_is_rejected() {
        for markup in ["", "   ", "\n\t \r\n"] {
            let err = ConversionRequest::new(markup, "light", "html").expect_err("blank markup");
            assert_eq!(err.category(), "invalid_input");
        }
    }

    #[test]
    fn unknown_format_is_rejected_with_its_name() {
        let err = ConversionRequest::new("# Title", "light", "epub").expect_err("bad format");
        assert_eq!(err.category(), "invalid_input");
        assert!(err.to_string().contains("epub"));
    }

    #[test]
    fn unknown_theme_is_accepted_as_light() {
        let request = ConversionRequest::new("# Title", "neon", "pdf").expect("valid request");
        assert_eq!(request.theme(), Theme::Light);
        assert_eq!(request.format(), OutputFormat::Pdf);
    }

    #[test]
    fn invalid_utf8_is_left_for_the_parser() {
        let request = ConversionRequest::new(vec![0xff, 0xfe], "light", "html");
        assert!(request.is_ok());
    }
}
