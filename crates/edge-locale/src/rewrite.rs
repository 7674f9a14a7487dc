//! Locale path rewriting.

use edge_core::{Locale, RequestContext, ResponseContext};

use crate::error::LocaleError;

/// Path with the locale prepended: `/about` becomes `/en/about`, `/`
/// becomes `/en`.
pub fn prefixed_path(locale: &Locale, path: &str) -> String {
    match path {
        "" | "/" => format!("/{}", locale),
        _ if path.starts_with('/') => format!("/{}{}", locale, path),
        _ => format!("/{}/{}", locale, path),
    }
}

/// Internally rewrite a request onto its localized path.
///
/// Method, headers, body and the raw query string are carried over
/// unchanged.
pub fn rewrite_with_locale(
    request: RequestContext,
    locale: &Locale,
) -> Result<RequestContext, LocaleError> {
    let path = prefixed_path(locale, request.path());
    Ok(request.with_path(&path)?)
}

/// `307` response pointing the client at the localized URL.
pub fn locale_redirect(
    request: &RequestContext,
    locale: &Locale,
) -> Result<ResponseContext, LocaleError> {
    let target = rewrite_with_locale(request.clone(), locale)?;
    Ok(ResponseContext::redirect(&target.uri))
}
