//! Cache headers for the personalized edge site.
//!
//! Every response that went through personalization carries
//! `cache-control: no-store`; nothing downstream may store a variant.
//!
//! # Example
//!
//! ```ignore
//! use edge_cache::{generate_etag, CacheHeadersBuilder};
//!
//! CacheHeadersBuilder::new()
//!     .no_store()
//!     .etag(generate_etag(&body))
//!     .apply_to(&mut response);
//! ```

mod headers;

pub use headers::*;
