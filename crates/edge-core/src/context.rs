//! Request and response contexts.
//!
//! A [`RequestContext`] is treated as an immutable value: every stage that
//! needs a different request builds a new context with the `with_*` methods,
//! which carry forward all fields they do not touch.

use std::sync::atomic::{AtomicU64, Ordering};

use http::header::{HeaderName, HeaderValue};
use http::uri::{PathAndQuery, Uri};
use http::{HeaderMap, Method, StatusCode};

use crate::headers::cookie_value;

/// Unique request identifier for tracing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestId(pub String);

static REQUEST_SEQ: AtomicU64 = AtomicU64::new(1);

impl RequestId {
    /// Generate a new request ID.
    pub fn generate() -> Self {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let seq = REQUEST_SEQ.fetch_add(1, Ordering::Relaxed);
        Self(format!("{:x}-{:x}", nanos, seq))
    }

    /// Create from an existing ID string.
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether a forwarded request may follow redirects on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RedirectMode {
    /// Transport follows 3xx responses.
    #[default]
    Follow,
    /// 3xx responses are returned to the caller as-is.
    Manual,
}

/// Error building a derived request.
#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    #[error("invalid uri: {0}")]
    InvalidUri(String),

    #[error("invalid header {name}: {reason}")]
    InvalidHeader { name: String, reason: String },
}

/// Per-request value passed through every pipeline stage.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Unique request identifier.
    pub request_id: RequestId,
    /// HTTP method.
    pub method: Method,
    /// Full request URI (scheme and authority may be absent).
    pub uri: Uri,
    /// Request headers. Names are case-insensitive.
    pub headers: HeaderMap,
    /// Request body. Empty means no body.
    pub body: Vec<u8>,
    /// Redirect handling for outbound forwarding.
    pub redirect: RedirectMode,
}

impl RequestContext {
    /// Create a new request context.
    pub fn new(method: Method, uri: Uri) -> Self {
        Self {
            request_id: RequestId::generate(),
            method,
            uri,
            headers: HeaderMap::new(),
            body: Vec::new(),
            redirect: RedirectMode::Follow,
        }
    }

    /// Parse a URI string and create a context for it.
    pub fn parse(method: Method, uri: &str) -> Result<Self, ContextError> {
        let uri = uri
            .parse::<Uri>()
            .map_err(|e| ContextError::InvalidUri(e.to_string()))?;
        Ok(Self::new(method, uri))
    }

    /// Shorthand for a GET request.
    pub fn get(uri: &str) -> Result<Self, ContextError> {
        Self::parse(Method::GET, uri)
    }

    /// Request path.
    pub fn path(&self) -> &str {
        self.uri.path()
    }

    /// Raw query string, if any.
    pub fn query(&self) -> Option<&str> {
        self.uri.query()
    }

    /// Get a header value by name (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Get a cookie sent with the request.
    pub fn cookie(&self, name: &str) -> Option<String> {
        cookie_value(&self.headers, name)
    }

    /// Return a copy with the header set, replacing any previous values.
    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self, ContextError> {
        let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
            ContextError::InvalidHeader {
                name: name.to_string(),
                reason: e.to_string(),
            }
        })?;
        let header_value =
            HeaderValue::from_str(value).map_err(|e| ContextError::InvalidHeader {
                name: name.to_string(),
                reason: e.to_string(),
            })?;
        self.headers.insert(header_name, header_value);
        Ok(self)
    }

    /// Return a copy with a body attached.
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Return a copy with the given redirect mode.
    pub fn with_redirect(mut self, mode: RedirectMode) -> Self {
        self.redirect = mode;
        self
    }

    /// Return a copy whose path is replaced, keeping scheme, authority and
    /// the raw query string untouched.
    pub fn with_path(mut self, path: &str) -> Result<Self, ContextError> {
        let path_and_query = match self.uri.query() {
            Some(query) => format!("{}?{}", path, query),
            None => path.to_string(),
        };
        self.uri = replace_path_and_query(&self.uri, &path_and_query)?;
        Ok(self)
    }

    /// Return a copy with a query parameter appended (value is
    /// percent-encoded). Existing parameters are preserved as-is.
    pub fn with_query_param(mut self, key: &str, value: &str) -> Result<Self, ContextError> {
        let pair = format!("{}={}", encode_component(key), encode_component(value));
        let path_and_query = match self.uri.query() {
            Some(query) if !query.is_empty() => {
                format!("{}?{}&{}", self.uri.path(), query, pair)
            }
            _ => format!("{}?{}", self.uri.path(), pair),
        };
        self.uri = replace_path_and_query(&self.uri, &path_and_query)?;
        Ok(self)
    }
}

fn replace_path_and_query(uri: &Uri, path_and_query: &str) -> Result<Uri, ContextError> {
    let mut parts = uri.clone().into_parts();
    parts.path_and_query = Some(
        PathAndQuery::try_from(path_and_query)
            .map_err(|e| ContextError::InvalidUri(e.to_string()))?,
    );
    Uri::from_parts(parts).map_err(|e| ContextError::InvalidUri(e.to_string()))
}

/// Percent-encode a query component (RFC 3986 unreserved characters pass).
pub fn encode_component(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

/// Response produced by an origin or by the platform itself.
///
/// The response is an owned value, so headers can be rewritten without
/// consuming the body.
#[derive(Debug, Clone)]
pub struct ResponseContext {
    /// HTTP status.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// Response body.
    pub body: Vec<u8>,
}

impl ResponseContext {
    /// Create a response with a status and body.
    pub fn new(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// Empty 200 response.
    pub fn ok() -> Self {
        Self::new(StatusCode::OK, Vec::new())
    }

    /// JSON response with the given status.
    pub fn json(status: StatusCode, value: &serde_json::Value) -> Self {
        let body = serde_json::to_vec(value).unwrap_or_else(|_| b"{}".to_vec());
        let mut response = Self::new(status, body);
        response.headers.insert(
            http::header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        response
    }

    /// Temporary redirect that preserves the request method.
    pub fn redirect(location: &Uri) -> Self {
        let mut response = Self::new(StatusCode::TEMPORARY_REDIRECT, Vec::new());
        if let Ok(value) = HeaderValue::from_str(&location.to_string()) {
            response.headers.insert(http::header::LOCATION, value);
        }
        response
    }

    /// Get a header value by name (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Set a header, replacing previous values. Invalid values are ignored.
    pub fn set_header(&mut self, name: HeaderName, value: &str) {
        if let Ok(value) = HeaderValue::from_str(value) {
            self.headers.insert(name, value);
        }
    }

    /// Whether the response is a 3xx redirect.
    pub fn is_redirect(&self) -> bool {
        self.status.is_redirection()
    }

    /// Parse the body as JSON.
    pub fn json_body<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_id_unique() {
        let a = RequestId::generate();
        let b = RequestId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn test_header_case_insensitive() {
        let req = RequestContext::get("/about")
            .unwrap()
            .with_header("X-Custom", "1")
            .unwrap();
        assert_eq!(req.header("x-custom"), Some("1"));
        assert_eq!(req.header("X-CUSTOM"), Some("1"));
    }

    #[test]
    fn test_with_header_last_write_wins() {
        let req = RequestContext::get("/")
            .unwrap()
            .with_header("x-a", "first")
            .unwrap()
            .with_header("X-A", "second")
            .unwrap();
        assert_eq!(req.headers.get_all("x-a").iter().count(), 1);
        assert_eq!(req.header("x-a"), Some("second"));
    }

    #[test]
    fn test_with_path_keeps_query_and_authority() {
        let req = RequestContext::get("https://site.example/about?x=1&y=%20z")
            .unwrap()
            .with_path("/en/about")
            .unwrap();
        assert_eq!(req.uri.to_string(), "https://site.example/en/about?x=1&y=%20z");
    }

    #[test]
    fn test_with_path_origin_form() {
        let req = RequestContext::get("/about").unwrap().with_path("/en/about").unwrap();
        assert_eq!(req.uri.to_string(), "/en/about");
    }

    #[test]
    fn test_with_query_param_appends() {
        let req = RequestContext::get("/about?x=1")
            .unwrap()
            .with_query_param("personalize_variants", "a=1,b=2")
            .unwrap();
        assert_eq!(req.query(), Some("x=1&personalize_variants=a%3D1%2Cb%3D2"));
    }

    #[test]
    fn test_derived_context_keeps_fields() {
        let req = RequestContext::parse(Method::POST, "/api/foo")
            .unwrap()
            .with_body(b"payload".to_vec())
            .with_header("x-a", "1")
            .unwrap();
        let id = req.request_id.clone();
        let derived = req.with_redirect(RedirectMode::Manual);
        assert_eq!(derived.method, Method::POST);
        assert_eq!(derived.body, b"payload");
        assert_eq!(derived.request_id, id);
        assert_eq!(derived.redirect, RedirectMode::Manual);
    }

    #[test]
    fn test_encode_component() {
        assert_eq!(encode_component("a-b_c.d~"), "a-b_c.d~");
        assert_eq!(encode_component("{\"url\":\"/\"}"), "%7B%22url%22%3A%22%2F%22%7D");
    }

    #[test]
    fn test_redirect_response() {
        let uri: Uri = "/en/about?x=1".parse().unwrap();
        let resp = ResponseContext::redirect(&uri);
        assert!(resp.is_redirect());
        assert_eq!(resp.header("location"), Some("/en/about?x=1"));
    }

    #[test]
    fn test_json_response() {
        let resp = ResponseContext::json(StatusCode::INTERNAL_SERVER_ERROR, &serde_json::json!({"error": "x"}));
        assert_eq!(resp.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(resp.header("content-type"), Some("application/json"));
        let value: serde_json::Value = resp.json_body().unwrap();
        assert_eq!(value["error"], "x");
    }
}
