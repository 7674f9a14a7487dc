//! Locale errors.

use edge_core::{ContextError, Locale, LocaleSet};

/// Locale routing error.
#[derive(Debug, thiserror::Error)]
pub enum LocaleError {
    /// The locale is not configured. Rendering treats this as not found.
    #[error("unsupported locale: {0}")]
    Unsupported(String),

    #[error("cannot rewrite path: {0}")]
    Rewrite(#[from] ContextError),
}

/// Check a locale segment taken from a path.
pub fn validate_locale(segment: &str, locales: &LocaleSet) -> Result<Locale, LocaleError> {
    locales
        .get(segment)
        .ok_or_else(|| LocaleError::Unsupported(segment.to_string()))
}
