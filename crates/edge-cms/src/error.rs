//! Content errors.

use edge_core::ContextError;
use edge_data::FetchError;

/// A content query failed. "No matching entries" is not an error.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("content request failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("invalid content query: {0}")]
    Query(String),

    #[error("could not build content request: {0}")]
    Request(#[from] ContextError),

    #[error("malformed content response: {0}")]
    Malformed(String),
}
