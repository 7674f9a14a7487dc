//! Client for the site's content backend routes.

use async_trait::async_trait;
use edge_core::headers::PERSONALIZE_VARIANTS_HEADER;
use edge_core::RequestContext;
use edge_data::{DependencyTag, FetchClient};
use http::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::entry::Entry;
use crate::error::ContentError;
use crate::preview::LivePreviewQuery;
use crate::source::ContentSource;

/// Path of the backend route serving single entries with references.
pub const ELEMENT_WITH_REFS_PATH: &str = "/api/contentstack/getElementWithRefs";

/// Path of the backend route serving entry lists.
pub const ELEMENTS_PATH: &str = "/api/contentstack/getElements";

/// Body of a `getElementWithRefs` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementRequest {
    pub id: String,
    #[serde(rename = "type")]
    pub content_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(default)]
    pub references: Vec<String>,
    #[serde(default)]
    pub live_preview: LivePreviewQuery,
}

/// How a list request selects entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "by", rename_all = "snake_case")]
pub enum ElementsLookup {
    /// Every entry of the content type.
    Type,
    /// Entries whose `url` field matches.
    Url { url: String },
    /// Entries tagged with a taxonomy term.
    Taxonomy { term: String },
}

/// Body of a `getElements` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementsRequest {
    #[serde(rename = "type")]
    pub content_type: String,
    pub lookup: ElementsLookup,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(default)]
    pub live_preview: LivePreviewQuery,
}

/// Answer of a `getElements` request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ElementsResponse {
    #[serde(default)]
    pub entries: Vec<Entry>,
}

/// Browser-side content client going through the site backend.
///
/// Credentials stay on the server; the variant assignment travels in the
/// variant header.
#[derive(Clone)]
pub struct ProxyClient {
    fetch: FetchClient,
    base_url: String,
}

impl ProxyClient {
    /// `base_url` is the site origin, e.g. `https://www.example.com`.
    pub fn new(fetch: FetchClient, base_url: impl Into<String>) -> Self {
        Self {
            fetch,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Fetch one entry with references. An empty `{}` answer is `None`.
    pub async fn get_element_with_refs(
        &self,
        element: &ElementRequest,
        variant_param: Option<&str>,
    ) -> Result<Option<Entry>, ContentError> {
        let entry: Entry = self.post(ELEMENT_WITH_REFS_PATH, element, variant_param).await?;
        Ok((!entry.is_empty()).then_some(entry))
    }

    /// Fetch a list of entries. No match is an empty list.
    pub async fn get_elements(
        &self,
        elements: &ElementsRequest,
        variant_param: Option<&str>,
    ) -> Result<Vec<Entry>, ContentError> {
        let response: ElementsResponse = self.post(ELEMENTS_PATH, elements, variant_param).await?;
        Ok(response.entries)
    }

    async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        variant_param: Option<&str>,
    ) -> Result<T, ContentError> {
        let body = serde_json::to_vec(body).map_err(|e| ContentError::Query(e.to_string()))?;
        let request = RequestContext::parse(Method::POST, &format!("{}{}", self.base_url, path))?
            .with_header("content-type", "application/json")?
            .with_header(PERSONALIZE_VARIANTS_HEADER, variant_param.unwrap_or_default())?
            .with_body(body);

        Ok(self.fetch.fetch_json(request, DependencyTag::Backend).await?)
    }

    fn list_request(
        content_type: &str,
        lookup: ElementsLookup,
        locale: Option<&str>,
        preview: &LivePreviewQuery,
    ) -> ElementsRequest {
        ElementsRequest {
            content_type: content_type.to_string(),
            lookup,
            locale: locale.map(str::to_string),
            live_preview: preview.clone(),
        }
    }
}

#[async_trait(?Send)]
impl ContentSource for ProxyClient {
    async fn get_by_type(
        &self,
        content_type: &str,
        locale: Option<&str>,
        preview: &LivePreviewQuery,
        variant_param: Option<&str>,
    ) -> Result<Vec<Entry>, ContentError> {
        let request = Self::list_request(content_type, ElementsLookup::Type, locale, preview);
        self.get_elements(&request, variant_param).await
    }

    async fn get_by_id(
        &self,
        id: &str,
        content_type: &str,
        locale: Option<&str>,
        references: &[String],
        preview: &LivePreviewQuery,
        variant_param: Option<&str>,
    ) -> Result<Option<Entry>, ContentError> {
        let element = ElementRequest {
            id: id.to_string(),
            content_type: content_type.to_string(),
            locale: locale.map(str::to_string),
            references: references.to_vec(),
            live_preview: preview.clone(),
        };
        self.get_element_with_refs(&element, variant_param).await
    }

    async fn get_by_url(
        &self,
        content_type: &str,
        url: &str,
        locale: Option<&str>,
        preview: &LivePreviewQuery,
        variant_param: Option<&str>,
    ) -> Result<Vec<Entry>, ContentError> {
        let lookup = ElementsLookup::Url { url: url.to_string() };
        let request = Self::list_request(content_type, lookup, locale, preview);
        self.get_elements(&request, variant_param).await
    }

    async fn get_by_taxonomy(
        &self,
        content_type: &str,
        locale: Option<&str>,
        term: &str,
        preview: &LivePreviewQuery,
        variant_param: Option<&str>,
    ) -> Result<Vec<Entry>, ContentError> {
        let lookup = ElementsLookup::Taxonomy { term: term.to_string() };
        let request = Self::list_request(content_type, lookup, locale, preview);
        self.get_elements(&request, variant_param).await
    }
}
