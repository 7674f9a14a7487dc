//! Core abstractions for the personalized edge site.
//!
//! This crate provides the fundamental types:
//! - `RequestContext` / `ResponseContext` - Per-request values
//! - `Locale` / `LocaleSet` - Supported locales
//! - `SiteConfig` - Environment-driven configuration
//! - `LifecyclePhase` - Request lifecycle tracking

mod config;
mod context;
pub mod headers;
mod lifecycle;
mod locale;

pub use config::*;
pub use context::*;
pub use lifecycle::*;
pub use locale::*;

pub use http;
