//! In-process origin behind the edge pipeline.

use std::sync::Arc;

use async_trait::async_trait;
use edge_sdk::edge_cms::{ContentSource, ELEMENTS_PATH, ELEMENT_WITH_REFS_PATH};
use edge_sdk::edge_core::{LocaleSet, RequestContext, RequestId, ResponseContext};
use edge_sdk::edge_data::{FetchError, HttpTransport};
use edge_sdk::edge_observability::StructuredLogger;
use http::StatusCode;

use crate::routes::{error_response, handle_element, handle_elements, handle_page};

/// The site's render layer, exposed as a transport so the pipeline can
/// forward to it like to any remote origin.
pub struct SiteOrigin {
    content: Arc<dyn ContentSource>,
    locales: LocaleSet,
    live_preview_enabled: bool,
    logger: StructuredLogger,
}

impl SiteOrigin {
    pub fn new(content: Arc<dyn ContentSource>, locales: LocaleSet) -> Self {
        Self {
            content,
            locales,
            live_preview_enabled: false,
            logger: StructuredLogger::new(RequestId::generate()).with_component("origin"),
        }
    }

    /// Honor `live_preview` query parameters on page requests.
    pub fn with_live_preview(mut self, enabled: bool) -> Self {
        self.live_preview_enabled = enabled;
        self
    }

    pub fn with_logger(mut self, logger: StructuredLogger) -> Self {
        self.logger = logger;
        self
    }
}

#[async_trait(?Send)]
impl HttpTransport for SiteOrigin {
    async fn send(&self, request: RequestContext) -> Result<ResponseContext, FetchError> {
        let logger = self
            .logger
            .for_request(request.request_id.clone())
            .with_route(request.path());

        let path = request.path();
        let response = if path == ELEMENT_WITH_REFS_PATH {
            handle_element(self.content.as_ref(), &request, &logger).await
        } else if path == ELEMENTS_PATH {
            handle_elements(self.content.as_ref(), &request, &logger).await
        } else if path == "/api" || path.starts_with("/api/") {
            error_response(StatusCode::NOT_FOUND, "Not found")
        } else {
            handle_page(
                self.content.as_ref(),
                &self.locales,
                self.live_preview_enabled,
                &request,
                &logger,
            )
            .await
        };

        logger
            .debug_builder("origin response")
            .field_i64("status", i64::from(response.status.as_u16()))
            .emit();

        Ok(response)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;

    use edge_sdk::edge_cms::{ContentError, Entry, LivePreviewQuery};
    use http::Method;
    use serde_json::{json, Value};

    /// One recorded content query.
    #[derive(Debug, Clone)]
    pub(crate) struct Call {
        pub content_type: String,
        pub key: Option<String>,
        pub locale: Option<String>,
        pub references: Vec<String>,
        pub preview: LivePreviewQuery,
        pub variant_param: Option<String>,
    }

    /// In-memory content source keyed by type, url and uid.
    #[derive(Default)]
    pub(crate) struct FakeContent {
        by_type: Vec<(String, Entry)>,
        by_url: Vec<(String, String, Entry)>,
        by_id: Vec<(String, Entry)>,
        fail: bool,
        calls: Mutex<Vec<Call>>,
    }

    fn entry(value: Value) -> Entry {
        serde_json::from_value(value).unwrap()
    }

    impl FakeContent {
        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        pub fn with_type(mut self, content_type: &str, value: Value) -> Self {
            self.by_type.push((content_type.into(), entry(value)));
            self
        }

        pub fn with_url(mut self, content_type: &str, url: &str, value: Value) -> Self {
            self.by_url.push((content_type.into(), url.into(), entry(value)));
            self
        }

        pub fn with_entry(mut self, uid: &str, value: Value) -> Self {
            self.by_id.push((uid.into(), entry(value)));
            self
        }

        pub fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn record(
            &self,
            content_type: &str,
            key: Option<&str>,
            locale: Option<&str>,
            references: &[String],
            preview: &LivePreviewQuery,
            variant_param: Option<&str>,
        ) -> Result<(), ContentError> {
            self.calls.lock().unwrap().push(Call {
                content_type: content_type.into(),
                key: key.map(Into::into),
                locale: locale.map(Into::into),
                references: references.to_vec(),
                preview: preview.clone(),
                variant_param: variant_param.map(Into::into),
            });
            if self.fail {
                return Err(ContentError::Query("boom".into()));
            }
            Ok(())
        }
    }

    #[async_trait(?Send)]
    impl ContentSource for FakeContent {
        async fn get_by_type(
            &self,
            content_type: &str,
            locale: Option<&str>,
            preview: &LivePreviewQuery,
            variant_param: Option<&str>,
        ) -> Result<Vec<Entry>, ContentError> {
            self.record(content_type, None, locale, &[], preview, variant_param)?;
            Ok(self
                .by_type
                .iter()
                .filter(|(t, _)| t == content_type)
                .map(|(_, e)| e.clone())
                .collect())
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
            self.record(content_type, Some(id), locale, references, preview, variant_param)?;
            Ok(self.by_id.iter().find(|(uid, _)| uid == id).map(|(_, e)| e.clone()))
        }

        async fn get_by_url(
            &self,
            content_type: &str,
            url: &str,
            locale: Option<&str>,
            preview: &LivePreviewQuery,
            variant_param: Option<&str>,
        ) -> Result<Vec<Entry>, ContentError> {
            self.record(content_type, Some(url), locale, &[], preview, variant_param)?;
            Ok(self
                .by_url
                .iter()
                .filter(|(t, u, _)| t == content_type && u == url)
                .map(|(_, _, e)| e.clone())
                .collect())
        }

        async fn get_by_taxonomy(
            &self,
            content_type: &str,
            locale: Option<&str>,
            term: &str,
            preview: &LivePreviewQuery,
            variant_param: Option<&str>,
        ) -> Result<Vec<Entry>, ContentError> {
            self.record(content_type, Some(term), locale, &[], preview, variant_param)?;
            Ok(Vec::new())
        }
    }

    fn origin(content: FakeContent) -> SiteOrigin {
        SiteOrigin::new(Arc::new(content), LocaleSet::default())
    }

    #[tokio::test]
    async fn test_dispatches_element_route() {
        let content = FakeContent::default().with_entry("blt1", json!({"uid": "blt1"}));
        let request = RequestContext::parse(Method::POST, ELEMENT_WITH_REFS_PATH)
            .unwrap()
            .with_body(br#"{"id":"blt1","type":"hero"}"#.to_vec());

        let response = origin(content).send(request).await.unwrap();
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.json_body::<Value>().unwrap()["uid"], "blt1");
    }

    #[tokio::test]
    async fn test_dispatches_elements_route() {
        let content = FakeContent::default().with_type("homepage", json!({"uid": "home"}));
        let request = RequestContext::parse(Method::POST, ELEMENTS_PATH)
            .unwrap()
            .with_body(br#"{"type":"homepage","lookup":{"by":"type"}}"#.to_vec());

        let response = origin(content).send(request).await.unwrap();
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.json_body::<Value>().unwrap()["entries"][0]["uid"], "home");
    }

    #[tokio::test]
    async fn test_unknown_api_route_is_404() {
        let response = origin(FakeContent::default())
            .send(RequestContext::get("/api/foo").unwrap())
            .await
            .unwrap();
        assert_eq!(response.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_dispatches_pages() {
        let content = FakeContent::default().with_type("homepage", json!({"title": "Home"}));
        let response = origin(content)
            .send(RequestContext::get("/de").unwrap())
            .await
            .unwrap();
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.header("content-language"), Some("de"));
    }
}
