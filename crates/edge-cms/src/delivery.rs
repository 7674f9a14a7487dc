//! Server-side delivery API client.

use async_trait::async_trait;
use edge_core::{CmsConfig, RequestId};
use edge_data::{DependencyTag, FetchClient, FetchError};
use edge_observability::StructuredLogger;
use http::StatusCode;
use serde::Deserialize;

use crate::entry::Entry;
use crate::error::ContentError;
use crate::preview::LivePreviewQuery;
use crate::query::EntryQuery;
use crate::source::ContentSource;

/// Delivery API error code for a missing entry.
const ENTRY_NOT_FOUND_CODE: i64 = 141;

#[derive(Deserialize)]
struct ListResponse {
    #[serde(default)]
    entries: Vec<Entry>,
}

#[derive(Deserialize)]
struct SingleResponse {
    entry: Option<Entry>,
}

#[derive(Deserialize)]
struct ApiError {
    #[serde(default)]
    error_code: Option<i64>,
}

/// Content client for the CMS delivery API.
#[derive(Clone)]
pub struct DeliveryClient {
    fetch: FetchClient,
    config: CmsConfig,
    logger: StructuredLogger,
}

impl DeliveryClient {
    pub fn new(fetch: FetchClient, config: CmsConfig) -> Self {
        Self {
            fetch,
            config,
            logger: StructuredLogger::new(RequestId::generate()).with_component("cms"),
        }
    }

    /// Use a logger template; each query logs under its own request id.
    pub fn with_logger(mut self, logger: StructuredLogger) -> Self {
        self.logger = logger;
        self
    }

    pub fn config(&self) -> &CmsConfig {
        &self.config
    }

    /// Run a list query. Zero matches is an empty list.
    pub async fn find(&self, query: EntryQuery) -> Result<Vec<Entry>, ContentError> {
        let request = query.build(&self.config)?;
        let logger = self.logger.for_request(request.request_id.clone());

        let result = self
            .fetch
            .fetch_json::<ListResponse>(request, DependencyTag::Cms)
            .await;

        match result {
            Ok(list) => {
                logger
                    .debug_builder("content query")
                    .field("content_type", query.content_type())
                    .field_i64("entries", list.entries.len() as i64)
                    .emit();
                Ok(list.entries)
            }
            Err(err) => {
                log_failure(&logger, &query, &err);
                Err(err.into())
            }
        }
    }

    /// Run a single-entry query. A missing entry is `None`.
    pub async fn fetch_one(&self, query: EntryQuery) -> Result<Option<Entry>, ContentError> {
        let request = query.build(&self.config)?;
        let url = request.uri.to_string();
        let logger = self.logger.for_request(request.request_id.clone());

        let response = match self.fetch.send(request, DependencyTag::Cms).await {
            Ok(response) => response,
            Err(err) => {
                log_failure(&logger, &query, &err);
                return Err(err.into());
            }
        };

        if response.status == StatusCode::NOT_FOUND || is_entry_not_found(&response) {
            return Ok(None);
        }

        if !response.status.is_success() {
            let err = FetchError::Http {
                status: response.status.as_u16(),
                url,
            };
            log_failure(&logger, &query, &err);
            return Err(err.into());
        }

        let single: SingleResponse = response.json_body().map_err(|e| {
            logger
                .error_builder("malformed content response")
                .field("content_type", query.content_type())
                .field("error", e.to_string())
                .emit();
            ContentError::Malformed(e.to_string())
        })?;

        Ok(single.entry.filter(|entry| !entry.is_empty()))
    }

    /// All entries of a type with references expanded.
    pub async fn get_by_type_with_refs(
        &self,
        content_type: &str,
        locale: Option<&str>,
        references: &[String],
        preview: &LivePreviewQuery,
        variant_param: Option<&str>,
    ) -> Result<Vec<Entry>, ContentError> {
        self.find(
            EntryQuery::list(content_type)
                .locale(locale)
                .include_references(references)
                .live_preview(preview)
                .variants(variant_param),
        )
        .await
    }

    /// Entries matching a URL with references expanded.
    pub async fn get_by_url_with_refs(
        &self,
        content_type: &str,
        url: &str,
        locale: Option<&str>,
        references: &[String],
        preview: &LivePreviewQuery,
        variant_param: Option<&str>,
    ) -> Result<Vec<Entry>, ContentError> {
        self.find(
            EntryQuery::list(content_type)
                .locale(locale)
                .where_eq("url", url)
                .include_references(references)
                .live_preview(preview)
                .variants(variant_param),
        )
        .await
    }

    /// Entries tagged with a location taxonomy term, references expanded.
    pub async fn get_by_taxonomy_location(
        &self,
        content_type: &str,
        locale: Option<&str>,
        term: &str,
        references: &[String],
        preview: &LivePreviewQuery,
        variant_param: Option<&str>,
    ) -> Result<Vec<Entry>, ContentError> {
        self.find(
            EntryQuery::list(content_type)
                .locale(locale)
                .where_in("taxonomies.locations", &[term])
                .include_references(references)
                .live_preview(preview)
                .variants(variant_param),
        )
        .await
    }

    /// Product detail entries for a commerce product URL.
    pub async fn get_pdp_by_product(
        &self,
        content_type: &str,
        url: &str,
        locale: Option<&str>,
        preview: &LivePreviewQuery,
        variant_param: Option<&str>,
    ) -> Result<Vec<Entry>, ContentError> {
        self.find(
            EntryQuery::list(content_type)
                .locale(locale)
                .where_eq("product.data.url", url)
                .live_preview(preview)
                .variants(variant_param),
        )
        .await
    }

    /// Product listing entries for a commerce category URL.
    pub async fn get_plp_by_category(
        &self,
        content_type: &str,
        url: &str,
        locale: Option<&str>,
        preview: &LivePreviewQuery,
        variant_param: Option<&str>,
    ) -> Result<Vec<Entry>, ContentError> {
        self.find(
            EntryQuery::list(content_type)
                .locale(locale)
                .where_eq("product_category.data.url", url)
                .live_preview(preview)
                .variants(variant_param),
        )
        .await
    }
}

fn is_entry_not_found(response: &edge_core::ResponseContext) -> bool {
    response.status == StatusCode::UNPROCESSABLE_ENTITY
        && response
            .json_body::<ApiError>()
            .map(|e| e.error_code == Some(ENTRY_NOT_FOUND_CODE))
            .unwrap_or(false)
}

fn log_failure(logger: &StructuredLogger, query: &EntryQuery, err: &FetchError) {
    let mut entry = logger
        .error_builder("content query failed")
        .field("content_type", query.content_type())
        .field("error", err.to_string());
    if let Some(status) = err.status() {
        entry = entry.field_i64("status", i64::from(status));
    }
    entry.emit();
}

#[async_trait(?Send)]
impl ContentSource for DeliveryClient {
    async fn get_by_type(
        &self,
        content_type: &str,
        locale: Option<&str>,
        preview: &LivePreviewQuery,
        variant_param: Option<&str>,
    ) -> Result<Vec<Entry>, ContentError> {
        self.find(
            EntryQuery::list(content_type)
                .locale(locale)
                .live_preview(preview)
                .variants(variant_param),
        )
        .await
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
        self.fetch_one(
            EntryQuery::single(content_type, id)
                .locale(locale)
                .include_references(references)
                .live_preview(preview)
                .variants(variant_param),
        )
        .await
    }

    async fn get_by_url(
        &self,
        content_type: &str,
        url: &str,
        locale: Option<&str>,
        preview: &LivePreviewQuery,
        variant_param: Option<&str>,
    ) -> Result<Vec<Entry>, ContentError> {
        self.find(
            EntryQuery::list(content_type)
                .locale(locale)
                .where_eq("url", url)
                .live_preview(preview)
                .variants(variant_param),
        )
        .await
    }

    async fn get_by_taxonomy(
        &self,
        content_type: &str,
        locale: Option<&str>,
        term: &str,
        preview: &LivePreviewQuery,
        variant_param: Option<&str>,
    ) -> Result<Vec<Entry>, ContentError> {
        self.find(
            EntryQuery::list(content_type)
                .locale(locale)
                .where_in("taxonomies.article", &[term])
                .live_preview(preview)
                .variants(variant_param),
        )
        .await
    }
}
