use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use mdpress::{
    application::{
        pipeline::{ConversionOutput, ConversionPipeline, ConversionRequest},
        render::{
            FragmentSanitizer, RenderError, RenderService, RenderedFragment, render_service,
            resolve_theme,
        },
    },
    infra::pdf::{PdfExporter, ToolLocator},
};

fn exporter_without_tool() -> PdfExporter {
    PdfExporter::new(ToolLocator::new(Vec::new()).search_env_path(false))
}

fn pipeline() -> ConversionPipeline {
    ConversionPipeline::new(render_service(), exporter_without_tool())
}

#[derive(Default)]
struct CountingRenderer {
    calls: AtomicUsize,
}

impl RenderService for CountingRenderer {
    fn render(&self, markup: &[u8]) -> Result<RenderedFragment, RenderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        render_service().render(markup)
    }
}

fn content_of(document: &str) -> &str {
    let start = document
        .find(r#"<div class="markdown-content">"#)
        .expect("content container");
    &document[start..]
}

#[test]
fn non_dark_themes_resolve_to_empty_assets() {
    for id in ["", "light", "Dark", "DARK", "solarized", " dark", "dark "] {
        let assets = resolve_theme(id);
        assert!(assets.css_overrides.is_empty(), "{id:?}");
        assert!(assets.body_class.is_empty(), "{id:?}");
    }

    let first = resolve_theme("dark");
    let second = resolve_theme("dark");
    assert_eq!(first, second);
    assert!(!first.css_overrides.is_empty());
    assert_eq!(first.body_class, "bg-dark text-light");
}

#[test]
fn hello_world_renders_into_light_document() {
    let document = pipeline()
        .render_html(b"# Hello\n\nWorld", "light")
        .expect("rendered");
    let html = document.as_str();

    assert_eq!(html.matches("<h1").count(), 1);
    assert_eq!(html.matches("</h1>").count(), 1);
    assert!(content_of(html).contains("Hello</h1>"));
    assert!(content_of(html).contains("<p>World</p>"));
    assert!(html.contains(r#"<body class="">"#));
    assert!(!html.contains("bg-dark text-light"));
}

#[test]
fn dark_theme_styles_the_document() {
    let document = pipeline()
        .render_html(b"# Hello", "dark")
        .expect("rendered");
    let assets = resolve_theme("dark");

    assert!(document.as_str().contains(assets.css_overrides));
    assert!(document.as_str().contains(r#"<body class="bg-dark text-light">"#));
}

#[test]
fn block_elements_keep_source_order() {
    let markup = "# Title\n\n```rust\nfn main() {}\n```\n\n| a | b |\n|---|---|\n| 1 | 2 |\n\n- [x] done\n- [ ] todo\n";
    let document = pipeline()
        .render_html(markup.as_bytes(), "light")
        .expect("rendered");
    let content = content_of(document.as_str());

    let heading = content.find("<h1").expect("heading");
    let code = content
        .find(r#"<code class="language-rust">"#)
        .expect("code block");
    let table = content.find("<table>").expect("table");
    let task = content.find(r#"type="checkbox""#).expect("task item");

    assert!(heading < code, "{content}");
    assert!(code < table, "{content}");
    assert!(table < task, "{content}");
}

#[test]
fn rendering_is_deterministic() {
    let pipeline = pipeline();
    let markup = b"# Same\n\n* one\n* two\n\n~~gone~~ https://example.com";
    let first = pipeline.render_html(markup, "dark").expect("first");
    let second = pipeline.render_html(markup, "dark").expect("second");
    assert_eq!(first.as_bytes(), second.as_bytes());
}

#[test]
fn empty_markup_fails_before_parsing() {
    let renderer = Arc::new(CountingRenderer::default());
    let pipeline = ConversionPipeline::new(renderer.clone(), exporter_without_tool());

    let err = ConversionRequest::new("  \n", "light", "html").expect_err("empty markup");
    assert_eq!(err.category(), "invalid_input");

    let outcomes = pipeline.render_many([("blank", b"\n\n".to_vec())], "light");
    let err = outcomes[0].result.as_ref().expect_err("blank item fails");
    assert_eq!(err.category(), "invalid_input");

    let err = pipeline
        .render_html(b" \t\n", "dark")
        .expect_err("blank document");
    assert_eq!(err.category(), "invalid_input");
    let err = pipeline.render_pdf(b"\n", "light").expect_err("blank pdf");
    assert_eq!(err.category(), "invalid_input");

    assert_eq!(renderer.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn pdf_without_tool_reports_install_hint() {
    let pipeline = pipeline();

    let err = pipeline
        .render_pdf(b"# Printable", "light")
        .expect_err("tool unavailable");
    assert_eq!(err.category(), "tool_unavailable");
    let hint = err.hint().expect("hint");
    assert!(hint.starts_with("wkhtmltopdf is required for PDF generation."));

    let request = ConversionRequest::new("# Printable", "dark", "pdf").expect("request");
    let err = pipeline.convert(&request).expect_err("tool unavailable");
    assert_eq!(err.category(), "tool_unavailable");
}

#[test]
fn convert_dispatches_html_requests() {
    let request = ConversionRequest::new("# Title", "light", "html").expect("request");
    match pipeline().convert(&request).expect("converted") {
        ConversionOutput::Html(document) => assert!(document.as_str().contains("Title</h1>")),
        ConversionOutput::Pdf(_) => panic!("html request produced a pdf"),
    }
}

#[test]
fn batch_failure_does_not_abort_siblings() {
    let items = vec![
        ("first", b"# First".to_vec()),
        ("second", vec![0x23, 0x20, 0xff, 0xfe]),
        ("third", b"# Third".to_vec()),
    ];

    let outcomes = pipeline().render_many(items, "light");

    let identifiers: Vec<_> = outcomes.iter().map(|o| o.identifier).collect();
    assert_eq!(identifiers, vec!["first", "second", "third"]);
    assert!(outcomes[0].result.is_ok());
    assert!(outcomes[2].result.is_ok());
    let err = outcomes[1].result.as_ref().expect_err("invalid utf-8");
    assert_eq!(err.category(), "parse_failure");
}

#[test]
fn raw_html_passes_through_unless_sanitized() {
    let markup = b"Hi <span onclick=\"steal()\">there</span>\n\n<script>alert(1)</script>\n";

    let verbatim = pipeline().render_html(markup, "light").expect("rendered");
    assert!(verbatim.as_str().contains("alert(1)"));
    assert!(verbatim.as_str().contains("onclick"));

    let sanitized = pipeline()
        .with_sanitizer(FragmentSanitizer::new())
        .render_html(markup, "light")
        .expect("rendered");
    assert!(!sanitized.as_str().contains("alert(1)"));
    assert!(!sanitized.as_str().contains("onclick"));
    assert!(sanitized.as_str().contains("there"));
}
