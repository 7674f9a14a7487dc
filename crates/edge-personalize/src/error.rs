//! Personalization error types.

use edge_core::ContextError;
use edge_data::FetchError;

/// Failure while resolving variants. Never fatal to a request.
#[derive(Debug, thiserror::Error)]
pub enum PersonalizeError {
    #[error("decision service unavailable: {0}")]
    Decision(#[from] FetchError),

    #[error("invalid decision service endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("could not build decision request: {0}")]
    Request(#[from] ContextError),
}
