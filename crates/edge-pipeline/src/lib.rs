//! Edge request pipeline.
//!
//! Runs once per inbound request before any rendering: classifies the
//! path, resolves the visitor's variants, forwards the request to the
//! origin with the variant and locale attached, then writes session
//! cookies and `cache-control: no-store` onto the response.
//!
//! This crate provides:
//! - `EdgePipeline` - The orchestrator
//! - `PageContext` - Locale and variants as seen by page rendering
//! - `PipelineError` - Failures that reach the caller

mod error;
mod page;
mod pipeline;

pub use error::*;
pub use page::*;
pub use pipeline::*;
