//! Live preview parameters.

use serde::{Deserialize, Serialize};

/// Live-preview parameters for a single query.
///
/// Preview is opt-in per call: an empty value targets published content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LivePreviewQuery {
    /// Preview session hash issued by the CMS editor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub live_preview: Option<String>,
    #[serde(default, alias = "contentTypeUid", skip_serializing_if = "Option::is_none")]
    pub content_type_uid: Option<String>,
    #[serde(default, alias = "entryUid", skip_serializing_if = "Option::is_none")]
    pub entry_uid: Option<String>,
}

impl LivePreviewQuery {
    /// Published content.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_hash(hash: impl Into<String>) -> Self {
        Self {
            live_preview: Some(hash.into()),
            ..Self::default()
        }
    }

    /// Read preview parameters from a page URL's query string.
    pub fn from_query(query: &str) -> Self {
        let mut preview = Self::default();
        for pair in query.split('&') {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            if value.is_empty() {
                continue;
            }
            let value = Some(value.to_string());
            match key {
                "live_preview" => preview.live_preview = value,
                "content_type_uid" => preview.content_type_uid = value,
                "entry_uid" => preview.entry_uid = value,
                _ => {}
            }
        }
        preview
    }

    /// The preview hash, when the query asks for preview content.
    pub fn hash(&self) -> Option<&str> {
        self.live_preview.as_deref().filter(|h| !h.is_empty())
    }

    pub fn is_active(&self) -> bool {
        self.hash().is_some()
    }
}
