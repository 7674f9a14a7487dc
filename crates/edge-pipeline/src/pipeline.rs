//! The edge request pipeline.

use edge_cache::enforce_no_store;
use edge_core::headers::{PERSONALIZE_VARIANTS_HEADER, RESOLVED_LOCALE_HEADER};
use edge_core::{
    LifecyclePhase, LocaleStrategy, RedirectMode, RequestContext, RequestId,
    ResponseContext, SiteConfig, TimingContext,
};
use edge_data::{DependencyTag, FetchClient};
use edge_locale::{locale_redirect, rewrite_with_locale, LocaleRouter, RouteDecision};
use edge_observability::StructuredLogger;
use edge_personalize::{Resolution, VariantResolver};

use crate::error::PipelineError;

/// Query parameter carrying the variants when query propagation is on.
pub const VARIANT_QUERY_PARAM: &str = "personalize_variants";

/// Where a request goes after locale handling.
enum Localized {
    Forward(RequestContext),
    Redirect(ResponseContext),
}

/// Per-request orchestrator.
///
/// Shared across requests; holds no per-request state.
#[derive(Clone)]
pub struct EdgePipeline {
    router: LocaleRouter,
    resolver: VariantResolver,
    origin: FetchClient,
    personalization: bool,
    propagate_query: bool,
    logger: StructuredLogger,
}

impl EdgePipeline {
    pub fn new(router: LocaleRouter, resolver: VariantResolver, origin: FetchClient) -> Self {
        Self {
            router,
            resolver,
            origin,
            personalization: true,
            propagate_query: false,
            logger: StructuredLogger::new(RequestId::generate()).with_component("pipeline"),
        }
    }

    /// Build from site configuration: locale set and strategy, hosting mode
    /// and query propagation.
    pub fn from_config(config: &SiteConfig, resolver: VariantResolver, origin: FetchClient) -> Self {
        let router = LocaleRouter::new(config.locale.locales.clone())
            .with_strategy(config.locale.strategy);
        Self::new(router, resolver, origin)
            .with_personalization(config.personalization_enabled())
            .with_query_propagation(config.personalize.propagate_query)
    }

    /// Disable to run locale routing only (no variant header, no cache
    /// override).
    pub fn with_personalization(mut self, enabled: bool) -> Self {
        self.personalization = enabled;
        self
    }

    /// Also copy the variant parameter into the forwarded query string.
    pub fn with_query_propagation(mut self, enabled: bool) -> Self {
        self.propagate_query = enabled;
        self
    }

    /// Logger template; every request logs under its own request id.
    pub fn with_logger(mut self, logger: StructuredLogger) -> Self {
        self.logger = logger;
        self
    }

    pub fn router(&self) -> &LocaleRouter {
        &self.router
    }

    /// Handle one inbound request.
    pub async fn handle(&self, request: RequestContext) -> Result<ResponseContext, PipelineError> {
        let mut timing = TimingContext::new();
        let logger = self
            .logger
            .for_request(request.request_id.clone())
            .with_route(request.path());

        let decision = self.router.route(&request);
        timing.mark_phase(&LifecyclePhase::Routed);

        if decision == RouteDecision::AssetBypass {
            return self.forward(request, &logger).await;
        }

        if !self.personalization {
            return self.route_only(request, decision, &logger).await;
        }

        let resolution = self.resolver.resolve(&request).await;
        timing.mark_phase(&LifecyclePhase::VariantResolved);
        if let Some(error) = &resolution.error {
            logger
                .warn_builder("personalization unavailable, serving default content")
                .field("error", error.to_string())
                .emit();
        }

        let mut response = match self.localize(request, &decision)? {
            Localized::Redirect(response) => response,
            Localized::Forward(request) => {
                let forwarded = self.forwarded_request(request, &decision, &resolution)?;
                let response = self.forward(forwarded, &logger).await?;
                timing.mark_phase(&LifecyclePhase::OriginResponded);
                response
            }
        };

        if let Some(session) = &resolution.session {
            session.serialize_onto(&mut response);
        }
        enforce_no_store(&mut response);

        let mut entry = logger
            .info_builder("request complete")
            .field("decision", decision.to_string())
            .field_i64("status", i64::from(response.status.as_u16()))
            .field_bool("personalized", resolution.session.is_some())
            .field_bool("degraded", resolution.is_degraded())
            .duration_ms("elapsed_ms", timing.elapsed());
        if let Some(variant) =
            timing.between_phases(&LifecyclePhase::Routed, &LifecyclePhase::VariantResolved)
        {
            entry = entry.duration_ms("variant_ms", variant);
        }
        if let Some(origin) = timing
            .between_phases(&LifecyclePhase::VariantResolved, &LifecyclePhase::OriginResponded)
        {
            entry = entry.duration_ms("origin_ms", origin);
        }
        entry.emit();

        Ok(response)
    }

    /// Locale routing without personalization.
    async fn route_only(
        &self,
        request: RequestContext,
        decision: RouteDecision,
        logger: &StructuredLogger,
    ) -> Result<ResponseContext, PipelineError> {
        match self.localize(request, &decision)? {
            Localized::Redirect(response) => Ok(response),
            Localized::Forward(request) => self.forward(request, logger).await,
        }
    }

    /// Apply the locale decision: rewrite, redirect, or leave as is.
    fn localize(
        &self,
        request: RequestContext,
        decision: &RouteDecision,
    ) -> Result<Localized, PipelineError> {
        let RouteDecision::LocaleRewrite(locale) = decision else {
            return Ok(Localized::Forward(request));
        };
        match self.router.strategy() {
            LocaleStrategy::Rewrite => Ok(Localized::Forward(rewrite_with_locale(request, locale)?)),
            LocaleStrategy::Redirect => Ok(Localized::Redirect(locale_redirect(&request, locale)?)),
        }
    }

    /// Attach the variant and locale.
    fn forwarded_request(
        &self,
        request: RequestContext,
        decision: &RouteDecision,
        resolution: &Resolution,
    ) -> Result<RequestContext, PipelineError> {
        let variants = resolution.header_value();
        let mut forwarded = request.with_header(PERSONALIZE_VARIANTS_HEADER, variants)?;

        if let Some(locale) = decision.locale() {
            forwarded = forwarded.with_header(RESOLVED_LOCALE_HEADER, locale.as_str())?;
        }

        if self.propagate_query && !variants.is_empty() {
            forwarded = forwarded.with_query_param(VARIANT_QUERY_PARAM, variants)?;
        }

        Ok(forwarded)
    }

    /// Send to the origin. Redirects are never followed: the client gets
    /// the origin's 3xx as is.
    async fn forward(
        &self,
        request: RequestContext,
        logger: &StructuredLogger,
    ) -> Result<ResponseContext, PipelineError> {
        let request = request.with_redirect(RedirectMode::Manual);
        match self.origin.send(request, DependencyTag::Origin).await {
            Ok(response) => Ok(response),
            Err(error) => {
                logger
                    .error_builder("origin request failed")
                    .field("error", error.to_string())
                    .emit();
                Err(error.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use edge_core::LocaleSet;
    use edge_data::mock::MockTransport;
    use edge_data::FetchError;
    use edge_observability::LogSink;
    use edge_personalize::EdgeApiClient;
    use http::header::{CACHE_CONTROL, SET_COOKIE};
    use http::StatusCode;
    use serde_json::json;

    /// Origin that answers with what it received.
    fn echo_origin() -> Arc<MockTransport> {
        MockTransport::new(|req| {
            let mut response = ResponseContext::new(StatusCode::OK, req.uri.to_string().into_bytes());
            response.set_header(CACHE_CONTROL, "public, max-age=600");
            response.set_header(
                http::header::HeaderName::from_static("x-origin-saw-variants"),
                req.header(PERSONALIZE_VARIANTS_HEADER).unwrap_or("<absent>"),
            );
            Ok(response)
        })
    }

    fn decisions(manifest: serde_json::Value) -> Arc<MockTransport> {
        MockTransport::json(StatusCode::OK, manifest)
    }

    fn two_experiences() -> serde_json::Value {
        json!({"experiences": [
            {"shortUid": "a", "activeVariantShortUid": "1"},
            {"shortUid": "b", "activeVariantShortUid": "2"}
        ]})
    }

    fn pipeline(
        origin: Arc<MockTransport>,
        decisions: Arc<MockTransport>,
        project: Option<&str>,
    ) -> EdgePipeline {
        let client = EdgeApiClient::new(FetchClient::new(decisions), None).unwrap();
        let resolver = VariantResolver::new(Arc::new(client), project.map(str::to_string));
        EdgePipeline::new(LocaleRouter::new(LocaleSet::default()), resolver, FetchClient::new(origin))
    }

    fn set_cookies(response: &ResponseContext) -> Vec<String> {
        response
            .headers
            .get_all(SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect()
    }

    // === Path classes ===

    #[tokio::test]
    async fn test_asset_bypass_is_verbatim() {
        let origin = echo_origin();
        let decisions = decisions(two_experiences());
        let pipeline = pipeline(origin.clone(), decisions.clone(), Some("proj"));

        let response = pipeline
            .handle(RequestContext::get("/_next/static/chunk.js").unwrap())
            .await
            .unwrap();

        assert_eq!(response.body, b"/_next/static/chunk.js");
        assert_eq!(response.header("cache-control"), Some("public, max-age=600"));
        assert!(set_cookies(&response).is_empty());

        let forwarded = origin.last_request().unwrap();
        assert_eq!(forwarded.header(PERSONALIZE_VARIANTS_HEADER), None);
        assert_eq!(forwarded.redirect, RedirectMode::Manual);
        assert!(decisions.requests().is_empty());
    }

    /// Origin that permanently moves `from` and serves everything else.
    fn moving_origin(from: &'static str, to: &'static str) -> Arc<MockTransport> {
        MockTransport::new(move |req| {
            if req.path() == from {
                let mut response = ResponseContext::new(StatusCode::PERMANENT_REDIRECT, Vec::new());
                response.set_header(http::header::LOCATION, to);
                Ok(response)
            } else {
                Ok(ResponseContext::new(StatusCode::OK, b"followed".to_vec()))
            }
        })
    }

    #[tokio::test]
    async fn test_asset_redirect_returned_verbatim() {
        let origin = moving_origin("/_next/static/old.js", "/_next/static/new.js");
        let pipeline = pipeline(origin.clone(), decisions(two_experiences()), Some("proj"));

        let response = pipeline
            .handle(RequestContext::get("/_next/static/old.js").unwrap())
            .await
            .unwrap();

        assert_eq!(response.status, StatusCode::PERMANENT_REDIRECT);
        assert_eq!(response.header("location"), Some("/_next/static/new.js"));
        assert!(response.body.is_empty());
        assert_eq!(origin.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_hosting_mode_does_not_follow_redirects() {
        let origin = moving_origin("/api/old", "/api/new");
        let pipeline = pipeline(origin.clone(), decisions(two_experiences()), Some("proj"))
            .with_personalization(false);

        let request = RequestContext::parse(http::Method::POST, "/api/old")
            .unwrap()
            .with_body(b"payload".to_vec());
        let response = pipeline.handle(request).await.unwrap();

        assert_eq!(response.status, StatusCode::PERMANENT_REDIRECT);
        let forwarded = origin.requests();
        assert_eq!(forwarded.len(), 1);
        assert_eq!(forwarded[0].method, http::Method::POST);
        assert_eq!(forwarded[0].redirect, RedirectMode::Manual);

        let response = pipeline.handle(RequestContext::get("/fr/api/old").unwrap()).await.unwrap();
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(origin.last_request().unwrap().redirect, RedirectMode::Manual);
    }

    #[tokio::test]
    async fn test_page_rewritten_to_default_locale() {
        let origin = echo_origin();
        let pipeline = pipeline(origin.clone(), decisions(two_experiences()), Some("proj"));

        let request = RequestContext::get("/about?x=1")
            .unwrap()
            .with_header("x-custom", "value")
            .unwrap()
            .with_header("accept-language", "fr-FR")
            .unwrap();
        let response = pipeline.handle(request).await.unwrap();

        let forwarded = origin.last_request().unwrap();
        assert_eq!(forwarded.uri.to_string(), "/en/about?x=1");
        assert_eq!(forwarded.header("x-custom"), Some("value"));
        assert_eq!(forwarded.header("accept-language"), Some("fr-FR"));
        assert_eq!(forwarded.header(PERSONALIZE_VARIANTS_HEADER), Some("a=1,b=2"));
        assert_eq!(forwarded.header(RESOLVED_LOCALE_HEADER), Some("en"));
        assert_eq!(forwarded.redirect, RedirectMode::Manual);

        assert_eq!(response.header("cache-control"), Some("no-store"));
        assert_eq!(response.headers.get_all(CACHE_CONTROL).iter().count(), 1);
    }

    #[tokio::test]
    async fn test_locale_prefixed_page_continues() {
        let origin = echo_origin();
        let pipeline = pipeline(origin.clone(), decisions(two_experiences()), Some("proj"));

        let response = pipeline.handle(RequestContext::get("/fr/about").unwrap()).await.unwrap();

        let forwarded = origin.last_request().unwrap();
        assert_eq!(forwarded.path(), "/fr/about");
        assert_eq!(forwarded.header(RESOLVED_LOCALE_HEADER), Some("fr"));
        assert_eq!(response.header("cache-control"), Some("no-store"));
    }

    #[tokio::test]
    async fn test_api_route_gets_variants_and_cookies() {
        let origin = echo_origin();
        let pipeline = pipeline(origin.clone(), decisions(two_experiences()), Some("proj"));

        let response = pipeline
            .handle(RequestContext::get("/api/foo").unwrap())
            .await
            .unwrap();

        let forwarded = origin.last_request().unwrap();
        assert_eq!(forwarded.path(), "/api/foo");
        assert_eq!(forwarded.header(PERSONALIZE_VARIANTS_HEADER), Some("a=1,b=2"));
        assert_eq!(forwarded.header(RESOLVED_LOCALE_HEADER), None);

        let cookies = set_cookies(&response);
        assert!(cookies.iter().any(|c| c.starts_with("cs-personalize-user-uid=")));
        assert!(cookies.iter().any(|c| c.starts_with("cs-personalize-manifest=")));
        assert_eq!(response.header("cache-control"), Some("no-store"));
        assert_eq!(response.header("x-origin-saw-variants"), Some("a=1,b=2"));
    }

    // === Degradation ===

    #[tokio::test]
    async fn test_no_project_means_empty_header_and_no_call() {
        let origin = echo_origin();
        let decisions = decisions(two_experiences());
        let pipeline = pipeline(origin.clone(), decisions.clone(), None);

        let response = pipeline.handle(RequestContext::get("/about").unwrap()).await.unwrap();

        assert!(decisions.requests().is_empty());
        assert_eq!(
            origin.last_request().unwrap().header(PERSONALIZE_VARIANTS_HEADER),
            Some("")
        );
        assert!(set_cookies(&response).is_empty());
        assert_eq!(response.header("cache-control"), Some("no-store"));
    }

    #[tokio::test]
    async fn test_decision_failure_still_serves() {
        let origin = echo_origin();
        let (sink, logs) = LogSink::memory();
        let logger = StructuredLogger::new(RequestId::generate()).with_sink(sink);
        let pipeline = pipeline(origin.clone(), MockTransport::failing("timeout"), Some("proj"))
            .with_logger(logger);

        let response = pipeline.handle(RequestContext::get("/about").unwrap()).await.unwrap();

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.header("x-origin-saw-variants"), Some(""));
        assert_eq!(response.header("cache-control"), Some("no-store"));
        assert!(set_cookies(&response).is_empty());

        let logs = logs.lock().unwrap();
        assert!(logs.iter().any(|e| e.message.starts_with("personalization unavailable")));
    }

    #[tokio::test]
    async fn test_origin_failure_propagates() {
        let pipeline = pipeline(
            MockTransport::failing("origin down"),
            decisions(two_experiences()),
            Some("proj"),
        );
        let err = pipeline.handle(RequestContext::get("/about").unwrap()).await.unwrap_err();
        assert!(matches!(err, PipelineError::Origin(FetchError::Connection(_))));
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
    }

    // === Origin responses ===

    #[tokio::test]
    async fn test_origin_redirect_not_followed() {
        let origin = MockTransport::new(|_| {
            let mut response = ResponseContext::new(StatusCode::FOUND, Vec::new());
            response.set_header(http::header::LOCATION, "/en/login");
            Ok(response)
        });
        let pipeline = pipeline(origin.clone(), decisions(two_experiences()), Some("proj"));

        let response = pipeline.handle(RequestContext::get("/account").unwrap()).await.unwrap();

        assert_eq!(response.status, StatusCode::FOUND);
        assert_eq!(response.header("location"), Some("/en/login"));
        assert_eq!(origin.requests().len(), 1);
        assert_eq!(response.header("cache-control"), Some("no-store"));
    }

    #[tokio::test]
    async fn test_origin_cookies_kept_alongside_session() {
        let origin = MockTransport::new(|_| {
            let mut response = ResponseContext::ok();
            response
                .headers
                .append(SET_COOKIE, "NEXT_LOCALE=en; Path=/".parse().unwrap());
            Ok(response)
        });
        let pipeline = pipeline(origin, decisions(two_experiences()), Some("proj"));

        let response = pipeline.handle(RequestContext::get("/").unwrap()).await.unwrap();
        let cookies = set_cookies(&response);
        assert_eq!(cookies.len(), 3);
        assert_eq!(cookies[0], "NEXT_LOCALE=en; Path=/");
    }

    #[tokio::test]
    async fn test_method_and_body_forwarded() {
        let origin = echo_origin();
        let pipeline = pipeline(origin.clone(), decisions(two_experiences()), Some("proj"));

        let request = RequestContext::parse(http::Method::POST, "/api/contentstack/getElementWithRefs")
            .unwrap()
            .with_body(br#"{"id":"x","type":"page"}"#.to_vec());
        pipeline.handle(request).await.unwrap();

        let forwarded = origin.last_request().unwrap();
        assert_eq!(forwarded.method, http::Method::POST);
        assert_eq!(forwarded.body, br#"{"id":"x","type":"page"}"#);
    }

    // === Options ===

    #[tokio::test]
    async fn test_redirect_strategy() {
        let origin = echo_origin();
        let client = EdgeApiClient::new(FetchClient::new(decisions(two_experiences())), None).unwrap();
        let resolver = VariantResolver::new(Arc::new(client), Some("proj".into()));
        let router = LocaleRouter::new(LocaleSet::default()).with_strategy(LocaleStrategy::Redirect);
        let pipeline = EdgePipeline::new(router, resolver, FetchClient::new(origin.clone()));

        let response = pipeline.handle(RequestContext::get("/about?x=1").unwrap()).await.unwrap();

        assert_eq!(response.status, StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(response.header("location"), Some("/en/about?x=1"));
        assert_eq!(response.header("cache-control"), Some("no-store"));
        assert_eq!(set_cookies(&response).len(), 2);
        assert!(origin.requests().is_empty());
    }

    #[tokio::test]
    async fn test_hosting_mode_routes_only() {
        let origin = echo_origin();
        let decisions = decisions(two_experiences());
        let pipeline =
            pipeline(origin.clone(), decisions.clone(), Some("proj")).with_personalization(false);

        let response = pipeline.handle(RequestContext::get("/about").unwrap()).await.unwrap();
        let forwarded = origin.last_request().unwrap();
        assert_eq!(forwarded.path(), "/en/about");
        assert_eq!(forwarded.header(PERSONALIZE_VARIANTS_HEADER), None);
        assert_eq!(response.header("cache-control"), Some("public, max-age=600"));

        pipeline.handle(RequestContext::get("/api/foo").unwrap()).await.unwrap();
        let forwarded = origin.last_request().unwrap();
        assert_eq!(forwarded.path(), "/api/foo");
        assert_eq!(forwarded.header(PERSONALIZE_VARIANTS_HEADER), None);

        assert!(decisions.requests().is_empty());
    }

    #[tokio::test]
    async fn test_query_propagation() {
        let origin = echo_origin();
        let pipeline = pipeline(origin.clone(), decisions(two_experiences()), Some("proj"))
            .with_query_propagation(true);

        pipeline.handle(RequestContext::get("/about?x=1").unwrap()).await.unwrap();
        assert_eq!(
            origin.last_request().unwrap().uri.to_string(),
            "/en/about?x=1&personalize_variants=a%3D1%2Cb%3D2"
        );
    }

    #[tokio::test]
    async fn test_query_propagation_off_by_default() {
        let origin = echo_origin();
        let pipeline = pipeline(origin.clone(), decisions(two_experiences()), Some("proj"));
        pipeline.handle(RequestContext::get("/about").unwrap()).await.unwrap();
        assert_eq!(origin.last_request().unwrap().query(), None);
    }

    #[tokio::test]
    async fn test_from_config_launch_hosting() {
        let config = SiteConfig::from_lookup(|key| {
            match key {
                "CONTENTSTACK_API_KEY" => Some("k"),
                "CONTENTSTACK_DELIVERY_TOKEN" => Some("t"),
                "CONTENTSTACK_ENVIRONMENT" => Some("prod"),
                "HOSTING" => Some("launch"),
                _ => None,
            }
            .map(str::to_string)
        })
        .unwrap();
        let origin = echo_origin();
        let client = EdgeApiClient::new(FetchClient::new(decisions(two_experiences())), None).unwrap();
        let resolver = VariantResolver::new(Arc::new(client), None);
        let pipeline = EdgePipeline::from_config(&config, resolver, FetchClient::new(origin.clone()));

        let response = pipeline.handle(RequestContext::get("/").unwrap()).await.unwrap();
        assert_eq!(origin.last_request().unwrap().path(), "/en");
        assert_eq!(response.header("cache-control"), Some("public, max-age=600"));
    }

    #[tokio::test]
    async fn test_completion_logged() {
        let (sink, logs) = LogSink::memory();
        let logger = StructuredLogger::new(RequestId::generate()).with_sink(sink);
        let pipeline =
            pipeline(echo_origin(), decisions(two_experiences()), Some("proj")).with_logger(logger);

        let request = RequestContext::get("/about").unwrap();
        let request_id = request.request_id.to_string();
        pipeline.handle(request).await.unwrap();

        let logs = logs.lock().unwrap();
        let entry = logs.iter().find(|e| e.message == "request complete").unwrap();
        assert_eq!(entry.request_id, request_id);
        assert_eq!(entry.route.as_deref(), Some("/about"));
        assert_eq!(entry.fields["decision"], "locale_rewrite(en)");
        assert_eq!(entry.fields["personalized"], true);
        assert!(entry.fields["elapsed_ms"].is_u64());
        assert!(entry.fields["variant_ms"].is_u64());
        assert!(entry.fields["origin_ms"].is_u64());
    }

    #[tokio::test]
    async fn test_redirect_strategy_logs_no_origin_time() {
        let (sink, logs) = LogSink::memory();
        let logger = StructuredLogger::new(RequestId::generate()).with_sink(sink);
        let client = EdgeApiClient::new(FetchClient::new(decisions(two_experiences())), None).unwrap();
        let resolver = VariantResolver::new(Arc::new(client), Some("proj".into()));
        let router = LocaleRouter::new(LocaleSet::default()).with_strategy(LocaleStrategy::Redirect);
        let pipeline = EdgePipeline::new(router, resolver, FetchClient::new(echo_origin()))
            .with_logger(logger);

        pipeline.handle(RequestContext::get("/about").unwrap()).await.unwrap();

        let logs = logs.lock().unwrap();
        let entry = logs.iter().find(|e| e.message == "request complete").unwrap();
        assert!(entry.fields.contains_key("variant_ms"));
        assert!(!entry.fields.contains_key("origin_ms"));
    }
}
