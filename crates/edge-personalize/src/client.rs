//! Decision-service client.

use async_trait::async_trait;
use edge_core::{RedirectMode, RequestContext};
use edge_data::{DependencyTag, FetchClient};

use crate::error::PersonalizeError;
use crate::manifest::Manifest;
use crate::session::UserUid;

/// Default decision service endpoint.
pub const DEFAULT_EDGE_API_URL: &str = "https://personalize-edge.contentstack.com";

/// Inbound headers forwarded to the decision service for audience matching.
const FORWARDED_HEADERS: [&str; 3] = ["user-agent", "referer", "x-forwarded-for"];

/// What the decision service needs to know about a visitor.
#[derive(Debug, Clone)]
pub struct DecisionRequest {
    pub user_uid: UserUid,
    /// Absolute URL of the page being requested.
    pub page_url: String,
    /// Forwarded inbound headers (name, value).
    pub forwarded: Vec<(&'static str, String)>,
}

impl DecisionRequest {
    /// Collect the decision inputs from an inbound request.
    pub fn from_request(request: &RequestContext, user_uid: UserUid) -> Self {
        let forwarded = FORWARDED_HEADERS
            .iter()
            .filter_map(|name| request.header(name).map(|v| (*name, v.to_string())))
            .collect();
        Self {
            user_uid,
            page_url: page_url(request),
            forwarded,
        }
    }
}

/// Absolute page URL, using the `host` header when the URI is origin-form.
fn page_url(request: &RequestContext) -> String {
    if request.uri.authority().is_some() {
        return request.uri.to_string();
    }
    let path_and_query = request
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    match request.header("host") {
        Some(host) => format!("https://{}{}", host, path_and_query),
        None => path_and_query.to_string(),
    }
}

/// Source of variant decisions.
#[async_trait(?Send)]
pub trait DecisionService: Send + Sync {
    /// Decide the manifest for a visitor in a project.
    async fn decide(
        &self,
        project_uid: &str,
        request: &DecisionRequest,
    ) -> Result<Manifest, PersonalizeError>;
}

/// Decision service reached over the personalization edge API.
#[derive(Clone)]
pub struct EdgeApiClient {
    fetch: FetchClient,
    base_url: String,
}

impl EdgeApiClient {
    /// Create a client. `edge_api_url` overrides [`DEFAULT_EDGE_API_URL`].
    pub fn new(fetch: FetchClient, edge_api_url: Option<&str>) -> Result<Self, PersonalizeError> {
        let base_url = edge_api_url
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .unwrap_or(DEFAULT_EDGE_API_URL);

        if !(base_url.starts_with("https://") || base_url.starts_with("http://")) {
            return Err(PersonalizeError::InvalidEndpoint(base_url.to_string()));
        }

        Ok(Self {
            fetch,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn manifest_request(
        &self,
        project_uid: &str,
        decision: &DecisionRequest,
    ) -> Result<RequestContext, PersonalizeError> {
        let mut request = RequestContext::get(&format!("{}/manifest", self.base_url))?
            .with_redirect(RedirectMode::Follow)
            .with_header("accept", "application/json")?
            .with_header("x-project-uid", project_uid)?
            .with_header("x-cs-personalize-user-uid", decision.user_uid.as_str())?
            .with_header("x-page-url", &decision.page_url)?;

        for (name, value) in &decision.forwarded {
            request = request.with_header(name, value)?;
        }
        Ok(request)
    }
}

#[async_trait(?Send)]
impl DecisionService for EdgeApiClient {
    async fn decide(
        &self,
        project_uid: &str,
        request: &DecisionRequest,
    ) -> Result<Manifest, PersonalizeError> {
        let outbound = self.manifest_request(project_uid, request)?;
        let manifest = self
            .fetch
            .fetch_json(outbound, DependencyTag::Personalize)
            .await?;
        Ok(manifest)
    }
}
