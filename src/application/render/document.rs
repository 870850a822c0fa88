//! Document assembly: embeds a parsed fragment and theme assets into the fixed
//! page skeleton.

use askama::Template;

use super::{
    theme::ThemeAssets,
    types::{RenderError, RenderedDocument, RenderedFragment},
};

#[derive(Template)]
#[template(path = "document.html")]
struct DocumentTemplate<'a> {
    css_overrides: &'a str,
    body_class: &'a str,
    content: &'a str,
}

/// Build the complete HTML document. All three slots are injected verbatim;
/// nothing else in the skeleton varies with the input.
pub fn assemble(
    fragment: &RenderedFragment,
    assets: &ThemeAssets,
) -> Result<RenderedDocument, RenderError> {
    let template = DocumentTemplate {
        css_overrides: assets.css_overrides,
        body_class: assets.body_class,
        content: fragment.as_str(),
    };

    template
        .render()
        .map(RenderedDocument::new)
        .map_err(|err| RenderError::Document {
            message: err.to_string(),
        })
}
