//! Theme resolution: maps a theme identifier to the CSS overrides and body
//! class injected into the document skeleton.

use crate::domain::types::Theme;

/// Visual overrides contributed by a theme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ThemeAssets {
    /// CSS emitted ahead of the base stylesheet inside the `<style>` element.
    pub css_overrides: &'static str,
    /// Value of the `<body>` element's `class` attribute.
    pub body_class: &'static str,
}

const DARK_BODY_CLASS: &str = "bg-dark text-light";

/// Resolve a theme identifier. Never fails: unknown identifiers, including the
/// empty string, resolve to the light theme's empty assets.
pub fn resolve_theme(theme_id: &str) -> ThemeAssets {
    Theme::from_id(theme_id).assets()
}

impl Theme {
    pub fn assets(self) -> ThemeAssets {
        match self {
            Theme::Dark => ThemeAssets {
                css_overrides: DARK_THEME_CSS,
                body_class: DARK_BODY_CLASS,
            },
            Theme::Light => ThemeAssets::default(),
        }
    }
}

// Covers every surface the base stylesheet and Prism's light theme paint.
const DARK_THEME_CSS: &str = r#"
        body {
            background-color: #212529;
            color: #ffffff;
        }
        .card {
            background-color: #343a40;
            border-color: #495057;
        }
        .navbar {
            background-color: #343a40 !important;
        }
        .navbar-brand,
        .nav-link,
        .nav-link:hover,
        .navbar-text {
            color: #ffffff !important;
        }
        .markdown-content {
            color: #ffffff;
        }
        .markdown-content h1,
        .markdown-content h2,
        .markdown-content h3,
        .markdown-content h4,
        .markdown-content h5,
        .markdown-content h6 {
            color: #ffffff;
            border-color: #495057;
        }
        .markdown-content p,
        .markdown-content li {
            color: #ffffff;
        }
        .markdown-content blockquote {
            color: #e9ecef;
        }
        .markdown-content hr {
            border-top-color: #495057;
        }
        .markdown-content code,
        .markdown-content pre {
            background-color: #2d3748 !important;
            color: #e2e8f0 !important;
        }
        .markdown-content pre code {
            background-color: transparent !important;
            color: #e2e8f0 !important;
        }
        pre[class*="language-"] {
            background-color: #2d3748 !important;
            color: #e2e8f0 !important;
        }
        code[class*="language-"] {
            background-color: transparent !important;
            color: #e2e8f0 !important;
            text-shadow: none !important;
        }
        .token.comment,
        .token.prolog,
        .token.doctype,
        .token.cdata {
            color: #718096 !important;
        }
        .token.punctuation {
            color: #e2e8f0 !important;
        }
        .token.property,
        .token.tag,
        .token.boolean,
        .token.number,
        .token.constant,
        .token.symbol,
        .token.deleted {
            color: #f687b3 !important;
        }
        .token.selector,
        .token.attr-name,
        .token.string,
        .token.char,
        .token.builtin,
        .token.inserted {
            color: #68d391 !important;
        }
        .token.operator,
        .token.entity,
        .token.url,
        .language-css .token.string,
        .style .token.string {
            color: #f6ad55 !important;
            background: none !important;
        }
        .token.atrule,
        .token.attr-value,
        .token.keyword {
            color: #63b3ed !important;
        }
        .token.function,
        .token.class-name {
            color: #b794f4 !important;
        }
        .token.regex,
        .token.important,
        .token.variable {
            color: #fc8181 !important;
        }
        .markdown-content table th,
        .markdown-content table td {
            color: #ffffff;
            border-color: #495057;
        }
        .markdown-content a {
            color: #86b7fe;
        }
        .markdown-content a:hover {
            color: #b6d4fe;
        }"#;
