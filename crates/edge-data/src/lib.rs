//! Data access layer with dependency tagging.
//!
//! This crate provides:
//! - `HttpTransport` - The outbound HTTP seam
//! - `FetchClient` - Fetch with per-dependency retries and redirect handling
//! - `DependencyTag` - Semantic dependency categories
//! - `RetryPolicy` - Retry strategies
//! - `SpinTransport` - Spin host transport (wasm32 only)
//! - `MockTransport` - Recording transport for tests (`mock` feature)

mod client;
mod dependency;
mod retry;
mod transport;

#[cfg(target_arch = "wasm32")]
mod spin;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use client::*;
pub use dependency::*;
pub use retry::*;
pub use transport::*;

#[cfg(target_arch = "wasm32")]
pub use spin::SpinTransport;
