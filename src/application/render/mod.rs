//! Rendering pipeline building blocks.
//!
//! Each stage is pure: markdown bytes go through the parser, the theme
//! resolver and the assembler, producing deterministic HTML and structured
//! errors. Side effects (files, sockets, external tools) stay with the caller.

mod document;
mod service;
mod theme;
mod types;

pub use document::assemble;
pub use service::{ComrakRenderService, FragmentSanitizer, render_service};
pub use theme::{ThemeAssets, resolve_theme};
pub use types::{RenderError, RenderService, RenderedDocument, RenderedFragment};
