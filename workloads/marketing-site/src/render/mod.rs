//! HTML rendering for locale pages.

mod document;
mod sections;
mod seo;

pub use document::render_document;
pub use sections::render_sections;
pub use seo::SeoMetadata;

pub(crate) fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
