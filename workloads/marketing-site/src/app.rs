//! Application wiring: configuration to a ready pipeline.

use std::sync::Arc;

use edge_sdk::edge_cache::enforce_no_store;
use edge_sdk::edge_cms::ContentSource;
use edge_sdk::edge_core::headers::REQUEST_ID_HEADER;
use edge_sdk::edge_core::{RequestContext, RequestId, ResponseContext, SiteConfig};
use edge_sdk::edge_data::FetchClient;
use edge_sdk::edge_observability::StructuredLogger;
use edge_sdk::edge_personalize::{DecisionService, VariantResolver};
use edge_sdk::edge_pipeline::EdgePipeline;
use http::header::HeaderName;

use crate::origin::SiteOrigin;
use crate::routes::error_response;

/// Everything a request needs, built once per component instance.
pub struct App {
    pipeline: EdgePipeline,
    logger: StructuredLogger,
}

impl App {
    /// Wire the pipeline in front of the in-process origin.
    pub fn new(
        config: &SiteConfig,
        decisions: Arc<dyn DecisionService>,
        content: Arc<dyn ContentSource>,
    ) -> Self {
        let logger = StructuredLogger::new(RequestId::generate()).with_component("marketing-site");

        let origin = SiteOrigin::new(content, config.locale.locales.clone())
            .with_live_preview(config.cms.live_preview_enabled)
            .with_logger(logger.clone().with_component("origin"));
        let resolver = VariantResolver::new(decisions, config.personalize.project_uid.clone());
        let pipeline = EdgePipeline::from_config(config, resolver, FetchClient::new(Arc::new(origin)))
            .with_logger(logger.clone().with_component("pipeline"));

        Self { pipeline, logger }
    }

    /// Use an already-built pipeline.
    pub fn from_pipeline(pipeline: EdgePipeline) -> Self {
        Self {
            pipeline,
            logger: StructuredLogger::new(RequestId::generate()).with_component("marketing-site"),
        }
    }

    pub fn with_logger(mut self, logger: StructuredLogger) -> Self {
        self.logger = logger;
        self
    }

    /// Handle one inbound request. Pipeline failures become generic error
    /// responses; details only go to the log.
    pub async fn handle(&self, request: RequestContext) -> ResponseContext {
        let request_id = request.request_id.clone();

        let mut response = match self.pipeline.handle(request).await {
            Ok(response) => response,
            Err(err) => {
                let status = err.status();
                self.logger
                    .for_request(request_id.clone())
                    .error_builder("request failed")
                    .field("error", err.to_string())
                    .field_i64("status", i64::from(status.as_u16()))
                    .emit();

                let message = status.canonical_reason().unwrap_or("Error");
                let mut response = error_response(status, message);
                enforce_no_store(&mut response);
                response
            }
        };

        response.set_header(HeaderName::from_static(REQUEST_ID_HEADER), &request_id.to_string());
        response
    }
}
