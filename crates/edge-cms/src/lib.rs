//! Content fetch layer.
//!
//! This crate provides:
//! - `Entry` - An opaque CMS entry
//! - `EntryQuery` - Builds delivery API requests (locale, variants, references, preview)
//! - `ContentSource` - The query contract shared by all content clients
//! - `DeliveryClient` - Server-side client for the delivery API
//! - `ProxyClient` - Client for the site's `getElementWithRefs` route
//! - `EntryChangeFeed` - Live-preview change notifications

mod delivery;
mod entry;
mod error;
mod feed;
mod preview;
mod proxy;
mod query;
mod source;

pub use delivery::*;
pub use entry::*;
pub use error::*;
pub use feed::*;
pub use preview::*;
pub use proxy::*;
pub use query::*;
pub use source::*;
