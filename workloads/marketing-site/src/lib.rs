//! Marketing site - personalized, localized CMS pages at the edge.
//!
//! This workload demonstrates:
//! - Every inbound request runs through the `EdgePipeline`
//! - Locale pages rendered from CMS entries with the visitor's variants
//! - SEO metadata taken from the entry's `seo` group
//! - The `getElementWithRefs` backend route used by client-side content fetches
//!
//! The pipeline forwards to [`SiteOrigin`], an in-process origin, so the
//! whole request path also runs natively under test.

mod app;
mod origin;
mod render;
mod routes;

#[cfg(target_arch = "wasm32")]
mod component;

pub use app::*;
pub use origin::*;
pub use render::SeoMetadata;
pub use routes::{HOMEPAGE_CONTENT_TYPE, PAGE_CONTENT_TYPE};
