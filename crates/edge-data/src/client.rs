//! Platform fetch client with dependency tagging.

use std::sync::Arc;

use edge_core::{RedirectMode, RequestContext, ResponseContext};
use http::Method;
use serde::de::DeserializeOwned;

use crate::dependency::DependencyTag;
use crate::retry::RetryPolicy;
use crate::transport::HttpTransport;

/// Maximum number of redirects followed for `RedirectMode::Follow`.
const MAX_REDIRECTS: usize = 5;

/// Error type for fetch operations.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP error: {status} for {url}")]
    Http { status: u16, url: String },

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Request error: {0}")]
    Request(String),

    #[error("Too many redirects for {0}")]
    TooManyRedirects(String),
}

impl FetchError {
    /// HTTP status if the error came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Platform-controlled fetch client.
///
/// Applies the retry policy of each request's dependency tag and follows
/// redirects when the request allows it.
#[derive(Clone)]
pub struct FetchClient {
    transport: Arc<dyn HttpTransport>,
    policy_override: Option<RetryPolicy>,
}

impl FetchClient {
    /// Create a new fetch client over a transport.
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            transport,
            policy_override: None,
        }
    }

    /// Use one retry policy for every dependency tag.
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy_override = Some(policy);
        self
    }

    /// The underlying transport.
    pub fn transport(&self) -> Arc<dyn HttpTransport> {
        self.transport.clone()
    }

    fn policy_for(&self, tag: DependencyTag) -> RetryPolicy {
        self.policy_override
            .clone()
            .unwrap_or_else(|| RetryPolicy::new(tag.default_max_retries()))
    }

    /// Send a request, returning any response status to the caller.
    ///
    /// Connection errors and retryable statuses are retried according to
    /// the dependency's policy.
    pub async fn send(
        &self,
        request: RequestContext,
        tag: DependencyTag,
    ) -> Result<ResponseContext, FetchError> {
        let policy = self.policy_for(tag);
        let mut attempt = 0;

        loop {
            match self.send_following(request.clone()).await {
                Ok(response) => {
                    if policy.should_retry_status(response.status.as_u16(), attempt) {
                        attempt += 1;
                        continue;
                    }
                    return Ok(response);
                }
                Err(FetchError::Connection(reason)) => {
                    if policy.should_retry_connection(attempt) {
                        attempt += 1;
                        continue;
                    }
                    return Err(FetchError::Connection(reason));
                }
                Err(other) => return Err(other),
            }
        }
    }

    async fn send_following(&self, request: RequestContext) -> Result<ResponseContext, FetchError> {
        let follow = request.redirect == RedirectMode::Follow;
        let mut current = request;

        for _ in 0..=MAX_REDIRECTS {
            let response = self.transport.send(current.clone()).await?;
            if !(follow && response.is_redirect()) {
                return Ok(response);
            }
            let Some(location) = response.header("location") else {
                return Ok(response);
            };
            current = redirect_target(&current, location)?;
        }

        Err(FetchError::TooManyRedirects(current.uri.to_string()))
    }

    /// Send a request and decode a 2xx JSON body.
    pub async fn fetch_json<T: DeserializeOwned>(
        &self,
        request: RequestContext,
        tag: DependencyTag,
    ) -> Result<T, FetchError> {
        let url = request.uri.to_string();
        let response = self.send(request, tag).await?;

        if !response.status.is_success() {
            return Err(FetchError::Http {
                status: response.status.as_u16(),
                url,
            });
        }

        serde_json::from_slice(&response.body)
            .map_err(|e| FetchError::Deserialization(e.to_string()))
    }
}

/// Build the follow-up request for a redirect. POST is downgraded to GET.
fn redirect_target(previous: &RequestContext, location: &str) -> Result<RequestContext, FetchError> {
    let target = if location.starts_with('/') {
        match (previous.uri.scheme_str(), previous.uri.authority()) {
            (Some(scheme), Some(authority)) => format!("{}://{}{}", scheme, authority, location),
            _ => location.to_string(),
        }
    } else {
        location.to_string()
    };

    let uri = target
        .parse()
        .map_err(|e: http::uri::InvalidUri| FetchError::Request(e.to_string()))?;

    let mut next = previous.clone();
    next.uri = uri;
    if previous.method == Method::POST {
        next.method = Method::GET;
        next.body = Vec::new();
    }
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockTransport;
    use http::StatusCode;

    fn get(uri: &str) -> RequestContext {
        RequestContext::get(uri).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_json_success() {
        let transport = MockTransport::json(StatusCode::OK, serde_json::json!({"value": 42}));
        let client = FetchClient::new(transport.clone());
        let value: serde_json::Value = client
            .fetch_json(get("https://api.example/x"), DependencyTag::Cms)
            .await
            .unwrap();
        assert_eq!(value["value"], 42);
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_json_http_error() {
        let transport = MockTransport::status(StatusCode::NOT_FOUND);
        let client = FetchClient::new(transport);
        let err = client
            .fetch_json::<serde_json::Value>(get("https://api.example/x"), DependencyTag::Cms)
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(404));
    }

    #[tokio::test]
    async fn test_fetch_json_bad_body() {
        let transport = MockTransport::new(|_| Ok(ResponseContext::new(StatusCode::OK, b"nope".to_vec())));
        let client = FetchClient::new(transport);
        let err = client
            .fetch_json::<serde_json::Value>(get("https://api.example/x"), DependencyTag::Cms)
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Deserialization(_)));
    }

    #[tokio::test]
    async fn test_server_error_retried_for_cms() {
        let transport = MockTransport::sequence(vec![
            Ok(ResponseContext::new(StatusCode::BAD_GATEWAY, Vec::new())),
            Ok(ResponseContext::new(StatusCode::OK, b"{}".to_vec())),
        ]);
        let client = FetchClient::new(transport.clone());
        let response = client.send(get("https://cdn.example/"), DependencyTag::Cms).await.unwrap();
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(transport.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_personalize_not_retried() {
        let transport = MockTransport::sequence(vec![
            Err(FetchError::Connection("refused".into())),
            Ok(ResponseContext::ok()),
        ]);
        let client = FetchClient::new(transport.clone());
        let err = client
            .send(get("https://edge.example/manifest"), DependencyTag::Personalize)
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Connection(_)));
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_follow_redirect() {
        let transport = MockTransport::new(|req| {
            if req.path() == "/old" {
                let mut resp = ResponseContext::new(StatusCode::MOVED_PERMANENTLY, Vec::new());
                resp.set_header(http::header::LOCATION, "/new");
                Ok(resp)
            } else {
                Ok(ResponseContext::new(StatusCode::OK, b"moved".to_vec()))
            }
        });
        let client = FetchClient::new(transport.clone());
        let response = client.send(get("https://site.example/old"), DependencyTag::Origin).await.unwrap();
        assert_eq!(response.body, b"moved");
        assert_eq!(transport.requests()[1].uri.to_string(), "https://site.example/new");
    }

    #[tokio::test]
    async fn test_manual_redirect_returned() {
        let transport = MockTransport::new(|_| {
            let mut resp = ResponseContext::new(StatusCode::FOUND, Vec::new());
            resp.set_header(http::header::LOCATION, "/elsewhere");
            Ok(resp)
        });
        let client = FetchClient::new(transport.clone());
        let request = get("https://site.example/").with_redirect(RedirectMode::Manual);
        let response = client.send(request, DependencyTag::Origin).await.unwrap();
        assert_eq!(response.status, StatusCode::FOUND);
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_redirect_loop_bounded() {
        let transport = MockTransport::new(|_| {
            let mut resp = ResponseContext::new(StatusCode::FOUND, Vec::new());
            resp.set_header(http::header::LOCATION, "/loop");
            Ok(resp)
        });
        let client = FetchClient::new(transport);
        let err = client.send(get("https://site.example/loop"), DependencyTag::Origin).await.unwrap_err();
        assert!(matches!(err, FetchError::TooManyRedirects(_)));
    }
}
