//! Well-known header names and cookie helpers.

use http::HeaderMap;

/// Header carrying the variant assignment on forwarded requests.
pub const PERSONALIZE_VARIANTS_HEADER: &str = "x-personalize-variants";

/// Header carrying the resolved locale on forwarded page requests.
pub const RESOLVED_LOCALE_HEADER: &str = "x-resolved-locale";

/// Request ID echoed on platform responses.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Iterate over all `name=value` pairs in the request's `Cookie` headers.
pub fn cookies(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .get_all(http::header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|cookie| {
            let (name, value) = cookie.trim().split_once('=')?;
            Some((name.trim().to_string(), value.trim().to_string()))
        })
        .collect()
}

/// Find a single cookie by name.
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    cookies(headers)
        .into_iter()
        .find(|(cookie_name, _)| cookie_name == name)
        .map(|(_, value)| value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    #[test]
    fn test_cookie_value() {
        let mut headers = HeaderMap::new();
        headers.insert(
            http::header::COOKIE,
            HeaderValue::from_static("a=1; cs-personalize-user-uid=u42 ;b=2"),
        );
        assert_eq!(cookie_value(&headers, "cs-personalize-user-uid").as_deref(), Some("u42"));
        assert_eq!(cookie_value(&headers, "b").as_deref(), Some("2"));
        assert_eq!(cookie_value(&headers, "missing"), None);
    }

    #[test]
    fn test_cookies_across_multiple_headers() {
        let mut headers = HeaderMap::new();
        headers.append(http::header::COOKIE, HeaderValue::from_static("a=1"));
        headers.append(http::header::COOKIE, HeaderValue::from_static("b=2"));
        assert_eq!(cookies(&headers).len(), 2);
    }

    #[test]
    fn test_malformed_cookie_skipped() {
        let mut headers = HeaderMap::new();
        headers.insert(http::header::COOKIE, HeaderValue::from_static("novalue; a=1"));
        assert_eq!(cookies(&headers), vec![("a".to_string(), "1".to_string())]);
    }
}
