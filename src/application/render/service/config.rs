use std::collections::HashSet;

use ammonia::Builder as AmmoniaBuilder;
use comrak::options::Options;

use crate::application::render::types::RenderedFragment;

pub(crate) fn default_options() -> Options<'static> {
    let mut options = Options::default();
    configure_extensions(&mut options);
    options
}

fn configure_extensions(options: &mut Options<'static>) {
    let ext = &mut options.extension;
    ext.strikethrough = true;
    ext.tagfilter = false;
    ext.table = true;
    ext.autolink = true;
    ext.tasklist = true;
    ext.header_id_prefix = Some(String::new());

    let render = &mut options.render;
    render.hardbreaks = true;
    render.github_pre_lang = false;
    render.tasklist_classes = true;
    render.r#unsafe = true;
    render.sourcepos = false;
}

/// Allow-list cleaner for parsed fragments coming from untrusted authors.
///
/// The assembler embeds fragments verbatim; callers that accept markdown from
/// outside parties run this between parsing and assembly.
pub struct FragmentSanitizer {
    builder: AmmoniaBuilder<'static>,
}

impl FragmentSanitizer {
    pub fn new() -> Self {
        Self {
            builder: base_builder(),
        }
    }

    pub fn clean(&self, fragment: RenderedFragment) -> RenderedFragment {
        RenderedFragment::new(self.builder.clean(fragment.as_str()).to_string())
    }
}

impl Default for FragmentSanitizer {
    fn default() -> Self {
        Self::new()
    }
}

fn base_builder() -> AmmoniaBuilder<'static> {
    let mut builder = AmmoniaBuilder::default();

    let tags: HashSet<&'static str> = HashSet::from([
        "a",
        "abbr",
        "blockquote",
        "br",
        "code",
        "dd",
        "del",
        "div",
        "dl",
        "dt",
        "em",
        "h1",
        "h2",
        "h3",
        "h4",
        "h5",
        "h6",
        "hr",
        "i",
        "img",
        "input",
        "kbd",
        "li",
        "ol",
        "p",
        "pre",
        "s",
        "section",
        "span",
        "strong",
        "sub",
        "sup",
        "table",
        "tbody",
        "td",
        "th",
        "thead",
        "tr",
        "u",
        "ul",
    ]);
    builder.tags(tags);

    let generic: HashSet<&'static str> =
        HashSet::from(["class", "id", "title", "lang", "dir", "aria-hidden"]);
    builder.generic_attributes(generic);

    builder.add_tag_attributes("img", &["title", "width", "height", "alt"]);
    builder.add_tag_attributes("code", &["class"]);
    builder.add_tag_attributes("pre", &["class"]);
    builder.add_tag_attributes("th", &["align"]);
    builder.add_tag_attributes("td", &["align"]);
    builder.add_tag_attributes("input", &["type", "checked", "disabled", "class"]);

    builder.add_url_schemes(["http", "https", "mailto", "tel"].iter().copied());

    builder
}
