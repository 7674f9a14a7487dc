//! Pipeline errors.

use edge_core::ContextError;
use edge_data::FetchError;
use edge_locale::LocaleError;
use http::StatusCode;

/// A failure the pipeline does not mask.
///
/// Personalization failures never appear here; they degrade to an empty
/// variant.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("origin request failed: {0}")]
    Origin(#[from] FetchError),

    #[error("locale routing failed: {0}")]
    Locale(#[from] LocaleError),

    #[error("could not build forwarded request: {0}")]
    Request(#[from] ContextError),
}

impl PipelineError {
    /// Status to answer the client with.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Origin(_) => StatusCode::BAD_GATEWAY,
            Self::Locale(LocaleError::Unsupported(_)) => StatusCode::NOT_FOUND,
            Self::Locale(_) | Self::Request(_) => StatusCode::BAD_REQUEST,
        }
    }
}
