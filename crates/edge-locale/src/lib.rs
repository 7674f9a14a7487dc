//! Locale routing for the edge pipeline.
//!
//! This crate provides:
//! - `AssetMatcher` - Recognizes build artifacts and static files
//! - `LocaleRouter` - Classifies request paths into a `RouteDecision`
//! - `rewrite_with_locale` / `locale_redirect` - Locale prefixing
//! - `validate_locale` - Rendering-side locale check

mod asset;
mod error;
mod rewrite;
mod router;

pub use asset::*;
pub use error::*;
pub use rewrite::*;
pub use router::*;
