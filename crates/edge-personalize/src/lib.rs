//! Audience personalization for the edge pipeline.
//!
//! This crate provides:
//! - `VariantAssignment` - Parsed `exp=var,...` assignments
//! - `to_query_encoding` - The Variant Codec used to scope CMS queries
//! - `DecisionService` / `EdgeApiClient` - Decision-service access
//! - `PersonalizeSession` - Per-request session state written back as cookies
//! - `VariantResolver` - Fail-soft resolution of a request's variants
//! - `SharedClient` - Process-wide, initialize-once decision client

mod assignment;
mod client;
pub mod codec;
mod error;
mod manifest;
mod resolver;
mod session;
mod shared;

pub use assignment::*;
pub use client::*;
pub use codec::to_query_encoding;
pub use error::*;
pub use manifest::*;
pub use resolver::*;
pub use session::*;
pub use shared::*;
