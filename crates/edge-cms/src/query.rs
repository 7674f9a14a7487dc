//! Delivery API query construction.

use edge_core::{encode_component, CmsConfig, RedirectMode, RequestContext};
use edge_personalize::to_query_encoding;
use serde_json::{json, Value};

use crate::error::ContentError;
use crate::preview::LivePreviewQuery;

/// Locale used when a query does not name one.
pub const FALLBACK_LOCALE: &str = "en";

/// Header scoping a query to personalization variants.
pub const VARIANT_UID_HEADER: &str = "x-cs-variant-uid";

/// A query for one entry or a list of entries of a content type.
#[derive(Debug, Clone)]
pub struct EntryQuery {
    content_type: String,
    entry_uid: Option<String>,
    locale: Option<String>,
    references: Vec<String>,
    filter: Option<Value>,
    variant_param: Option<String>,
    preview: LivePreviewQuery,
}

impl EntryQuery {
    /// Query all entries of a content type.
    pub fn list(content_type: impl Into<String>) -> Self {
        Self {
            content_type: content_type.into(),
            entry_uid: None,
            locale: None,
            references: Vec::new(),
            filter: None,
            variant_param: None,
            preview: LivePreviewQuery::none(),
        }
    }

    /// Query a single entry by uid.
    pub fn single(content_type: impl Into<String>, entry_uid: impl Into<String>) -> Self {
        Self {
            entry_uid: Some(entry_uid.into()),
            ..Self::list(content_type)
        }
    }

    /// Set the locale. `None` or `""` falls back to [`FALLBACK_LOCALE`].
    pub fn locale(mut self, locale: Option<&str>) -> Self {
        self.locale = locale.filter(|l| !l.is_empty()).map(str::to_string);
        self
    }

    /// Expand reference fields inline.
    pub fn include_references<S: AsRef<str>>(mut self, references: &[S]) -> Self {
        self.references
            .extend(references.iter().map(|r| r.as_ref().to_string()));
        self
    }

    /// Match entries whose `field` equals `value`.
    pub fn where_eq(mut self, field: &str, value: &str) -> Self {
        self.filter = Some(json!({ field: { "$eq": value } }));
        self
    }

    /// Match entries whose `field` contains any of `values`.
    pub fn where_in<S: AsRef<str>>(mut self, field: &str, values: &[S]) -> Self {
        let values: Vec<&str> = values.iter().map(AsRef::as_ref).collect();
        self.filter = Some(json!({ field: { "$in": values } }));
        self
    }

    /// Scope to a wire-format variant parameter.
    pub fn variants(mut self, variant_param: Option<&str>) -> Self {
        self.variant_param = variant_param.map(str::to_string);
        self
    }

    pub fn live_preview(mut self, preview: &LivePreviewQuery) -> Self {
        self.preview = preview.clone();
        self
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn is_single(&self) -> bool {
        self.entry_uid.is_some()
    }

    /// Effective locale.
    pub fn effective_locale(&self) -> &str {
        self.locale.as_deref().unwrap_or(FALLBACK_LOCALE)
    }

    /// Whether this query will be served from the preview host.
    pub fn uses_preview(&self, config: &CmsConfig) -> bool {
        self.preview.is_active() && config.preview_token.is_some()
    }

    /// Build the delivery API request.
    pub fn build(&self, config: &CmsConfig) -> Result<RequestContext, ContentError> {
        if self.content_type.is_empty() {
            return Err(ContentError::Query("content type is required".into()));
        }
        if self.entry_uid.as_deref() == Some("") {
            return Err(ContentError::Query("entry uid is empty".into()));
        }

        let preview = self.uses_preview(config);
        let host = if preview {
            &config.preview_host
        } else {
            &config.host
        };

        let mut path = format!(
            "/v3/content_types/{}/entries",
            encode_component(&self.content_type)
        );
        if let Some(uid) = &self.entry_uid {
            path.push('/');
            path.push_str(&encode_component(uid));
        }

        let mut params: Vec<(&str, String)> = vec![
            ("environment", config.environment.clone()),
            ("locale", self.effective_locale().to_string()),
            ("include_applied_variants", "true".to_string()),
        ];
        for reference in &self.references {
            params.push(("include[]", reference.clone()));
        }
        if let Some(filter) = &self.filter {
            params.push(("query", filter.to_string()));
        }

        let query = params
            .iter()
            .map(|(k, v)| format!("{}={}", encode_component(k), encode_component(v)))
            .collect::<Vec<_>>()
            .join("&");

        let mut request = RequestContext::get(&format!("https://{}{}?{}", host, path, query))?
            .with_redirect(RedirectMode::Follow)
            .with_header("accept", "application/json")?
            .with_header("api_key", &config.api_key)?
            .with_header("branch", &config.branch)?;

        request = match (preview, &config.preview_token, self.preview.hash()) {
            (true, Some(token), Some(hash)) => request
                .with_header("preview_token", token)?
                .with_header("live_preview", hash)?,
            _ => request.with_header("access_token", &config.delivery_token)?,
        };

        let variants = to_query_encoding(self.variant_param.as_deref());
        if !variants.is_empty() {
            request = request.with_header(VARIANT_UID_HEADER, &variants)?;
        }

        Ok(request)
    }
}
