//! Observability infrastructure for the personalized edge site.
//!
//! This crate provides:
//! - `StructuredLogger` - Structured logging with request context
//! - `LogBuilder` - Typed fields on individual entries
//! - `LogSink` - Stderr output, or an in-memory buffer for tests

mod logging;

pub use logging::*;

// Re-export RequestId and TimingContext from edge-core for convenience
pub use edge_core::{RequestId, TimingContext};
