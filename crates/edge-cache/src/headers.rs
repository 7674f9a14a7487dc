//! Cache response headers.

use edge_core::ResponseContext;
use http::header::{CACHE_CONTROL, ETAG};

/// Directive for responses whose content depends on the variant assignment.
pub const NO_STORE: &str = "no-store";

/// Builder for cache response headers.
#[derive(Debug, Default)]
pub struct CacheHeadersBuilder {
    cache_control: Option<&'static str>,
    etag: Option<String>,
}

impl CacheHeadersBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Forbid storage by intermediaries and the browser.
    pub fn no_store(mut self) -> Self {
        self.cache_control = Some(NO_STORE);
        self
    }

    /// Set ETag header.
    pub fn etag(mut self, value: impl Into<String>) -> Self {
        self.etag = Some(value.into());
        self
    }

    /// Write the headers onto a response, replacing existing values.
    pub fn apply_to(&self, response: &mut ResponseContext) {
        if let Some(cc) = self.cache_control {
            response.set_header(CACHE_CONTROL, cc);
        }
        if let Some(etag) = &self.etag {
            response.set_header(ETAG, &format!("\"{}\"", etag));
        }
    }
}

/// Force `cache-control: no-store`, replacing whatever the origin sent.
pub fn enforce_no_store(response: &mut ResponseContext) {
    CacheHeadersBuilder::new().no_store().apply_to(response);
}

/// Generate a simple ETag from content.
pub fn generate_etag(content: &[u8]) -> String {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    format!("{:x}", hasher.finish())
}
