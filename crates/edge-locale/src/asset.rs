//! Asset path detection.

use serde::{Deserialize, Serialize};

/// Framework-internal path segments served as build artifacts.
pub const DEFAULT_INTERNAL_SEGMENTS: [&str; 2] = ["_next", "_vercel"];

/// Decides which paths bypass personalization and locale handling.
///
/// A path is an asset when any segment is an internal segment, or when the
/// last segment looks like a file name (contains a `.`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetMatcher {
    internal_segments: Vec<String>,
}

impl AssetMatcher {
    /// Create a matcher with custom internal segments.
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            internal_segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_asset(&self, path: &str) -> bool {
        let mut segments = path.split('/').filter(|s| !s.is_empty()).peekable();
        while let Some(segment) = segments.next() {
            if self.internal_segments.iter().any(|s| s == segment) {
                return true;
            }
            if segments.peek().is_none() && segment.contains('.') {
                return true;
            }
        }
        false
    }
}

impl Default for AssetMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_INTERNAL_SEGMENTS)
    }
}
