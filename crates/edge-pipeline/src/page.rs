//! Per-request page context.

use edge_core::headers::PERSONALIZE_VARIANTS_HEADER;
use edge_core::{Locale, LocaleSet, RequestContext};
use edge_locale::{validate_locale, LocaleError};
use edge_personalize::VariantAssignment;

/// What page rendering needs to know about a forwarded request.
///
/// Built once from the request the pipeline forwarded and passed
/// explicitly to every renderer and content query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageContext {
    pub locale: Locale,
    /// Wire-format variant parameter. Empty header and no header both
    /// become `None`.
    pub variant_param: Option<String>,
    /// Path after the locale segment, always starting with `/` and without
    /// a trailing slash unless it is the root.
    pub page_path: String,
}

impl PageContext {
    /// Read the context from a locale-prefixed page request.
    ///
    /// A missing or unsupported locale segment is `LocaleError::Unsupported`,
    /// which rendering answers with 404.
    pub fn from_request(request: &RequestContext, locales: &LocaleSet) -> Result<Self, LocaleError> {
        let path = request.path().trim_start_matches('/');
        let (segment, rest) = match path.split_once('/') {
            Some((segment, rest)) => (segment, rest),
            None => (path, ""),
        };
        let locale = validate_locale(segment, locales)?;

        let variant_param = request
            .header(PERSONALIZE_VARIANTS_HEADER)
            .filter(|v| !v.is_empty())
            .map(str::to_string);

        Ok(Self {
            locale,
            variant_param,
            page_path: format!("/{}", rest.trim_end_matches('/')),
        })
    }

    pub fn variant_param(&self) -> Option<&str> {
        self.variant_param.as_deref()
    }

    pub fn assignment(&self) -> VariantAssignment {
        self.variant_param
            .as_deref()
            .map(VariantAssignment::parse)
            .unwrap_or_default()
    }
}
