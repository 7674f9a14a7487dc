//! `edge explain`: run one request through the real pipeline offline.
//!
//! The decision service answers with the `--variants` given on the command
//! line and the origin records what it receives, so nothing leaves the
//! machine.

use std::sync::{Arc, Mutex};

use anyhow::{Context as _, Result};
use async_trait::async_trait;
use edge_core::headers::{PERSONALIZE_VARIANTS_HEADER, RESOLVED_LOCALE_HEADER};
use edge_core::{LocaleConfig, PersonalizeConfig, RequestContext, RequestId, ResponseContext, SiteConfig};
use edge_data::{FetchClient, FetchError, HttpTransport};
use edge_locale::LocaleRouter;
use edge_observability::{LogFormat, LogLevel, StructuredLogger};
use edge_personalize::codec::variant_aliases;
use edge_personalize::{
    to_query_encoding, DecisionRequest, DecisionService, Experience, Manifest, PersonalizeError,
    VariantAssignment, VariantResolver,
};
use edge_pipeline::EdgePipeline;
use http::{Method, StatusCode};
use serde::Serialize;

use super::ExplainArgs;
use crate::context::Context;

/// Decision service answering every visitor with the same manifest.
struct FixedDecision(Manifest);

#[async_trait(?Send)]
impl DecisionService for FixedDecision {
    async fn decide(&self, _project_uid: &str, _request: &DecisionRequest) -> Result<Manifest, PersonalizeError> {
        Ok(self.0.clone())
    }
}

/// Origin that records the forwarded request and answers 200.
#[derive(Default)]
struct RecordingOrigin {
    seen: Mutex<Option<RequestContext>>,
}

impl RecordingOrigin {
    fn forwarded(&self) -> Option<RequestContext> {
        self.seen.lock().ok().and_then(|seen| seen.clone())
    }
}

#[async_trait(?Send)]
impl HttpTransport for RecordingOrigin {
    async fn send(&self, request: RequestContext) -> Result<ResponseContext, FetchError> {
        if let Ok(mut seen) = self.seen.lock() {
            *seen = Some(request);
        }
        Ok(ResponseContext::new(StatusCode::OK, Vec::new()))
    }
}

/// The request as the origin would receive it.
#[derive(Debug, Serialize)]
pub struct Forwarded {
    pub method: String,
    pub uri: String,
    pub variants: Option<String>,
    pub resolved_locale: Option<String>,
}

/// Result of running a request through the pipeline.
#[derive(Debug, Serialize)]
pub struct Explanation {
    pub decision: String,
    pub status: u16,
    pub forwarded: Option<Forwarded>,
    pub location: Option<String>,
    pub cache_control: Option<String>,
    pub cookies: Vec<String>,
    pub variant_aliases: Vec<String>,
    pub query_encoding: String,
}

/// Only the routing settings matter offline; CMS credentials are not needed.
#[derive(Debug, Clone, Default)]
pub struct RoutingSettings {
    pub locale: LocaleConfig,
    pub personalize: PersonalizeConfig,
    pub personalization_enabled: bool,
}

impl From<&SiteConfig> for RoutingSettings {
    fn from(site: &SiteConfig) -> Self {
        Self {
            locale: site.locale.clone(),
            personalize: site.personalize.clone(),
            personalization_enabled: site.personalization_enabled(),
        }
    }
}

fn manifest_for(assignment: &VariantAssignment) -> Manifest {
    Manifest {
        experiences: assignment
            .pairs()
            .iter()
            .map(|pair| Experience {
                short_uid: pair.experience.clone(),
                active_variant_short_uid: Some(pair.variant.clone()),
            })
            .collect(),
    }
}

/// Run `request` through a pipeline built from `settings`.
///
/// With `variants` the decision service assigns them; without, no project
/// is configured and the variant stays empty.
pub async fn explain(
    settings: &RoutingSettings,
    request: RequestContext,
    variants: Option<&str>,
    logger: StructuredLogger,
) -> Result<Explanation> {
    let assignment = variants.map(VariantAssignment::parse).unwrap_or_default();
    let project = variants.map(|_| {
        settings
            .personalize
            .project_uid
            .clone()
            .unwrap_or_else(|| "offline".to_string())
    });

    let origin = Arc::new(RecordingOrigin::default());
    let resolver = VariantResolver::new(Arc::new(FixedDecision(manifest_for(&assignment))), project);
    let router = LocaleRouter::new(settings.locale.locales.clone()).with_strategy(settings.locale.strategy);
    let pipeline = EdgePipeline::new(router, resolver, FetchClient::new(origin.clone()))
        .with_personalization(settings.personalization_enabled)
        .with_query_propagation(settings.personalize.propagate_query)
        .with_logger(logger);

    let decision = pipeline.router().route(&request).to_string();
    let response = pipeline.handle(request).await?;

    let forwarded = origin.forwarded().map(|req| Forwarded {
        method: req.method.to_string(),
        uri: req.uri.to_string(),
        variants: req.header(PERSONALIZE_VARIANTS_HEADER).map(str::to_string),
        resolved_locale: req.header(RESOLVED_LOCALE_HEADER).map(str::to_string),
    });
    let variant_param = forwarded.as_ref().and_then(|f| f.variants.clone());

    Ok(Explanation {
        decision,
        status: response.status.as_u16(),
        forwarded,
        location: response.header("location").map(str::to_string),
        cache_control: response.header("cache-control").map(str::to_string),
        cookies: response
            .headers
            .get_all(http::header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .filter_map(|v| v.split('=').next())
            .map(str::to_string)
            .collect(),
        variant_aliases: variant_aliases(variant_param.as_deref()),
        query_encoding: to_query_encoding(variant_param.as_deref()),
    })
}

fn build_request(args: &ExplainArgs) -> Result<RequestContext> {
    let method = Method::from_bytes(args.method.to_uppercase().as_bytes())
        .with_context(|| format!("Invalid method: {}", args.method))?;
    let mut request = RequestContext::parse(method, &args.path)
        .with_context(|| format!("Invalid path: {}", args.path))?;

    for header in &args.headers {
        let (name, value) = header
            .split_once(':')
            .with_context(|| format!("Header must be 'name: value': {}", header))?;
        request = request.with_header(name.trim(), value.trim())?;
    }

    Ok(request)
}

/// Run the explain command.
pub async fn run(args: ExplainArgs, ctx: &Context) -> Result<()> {
    let settings = match ctx.site_config() {
        Ok((site, source)) => {
            ctx.output.debug(&format!("Routing settings from {}", source));
            RoutingSettings::from(&site)
        }
        Err(err) => {
            ctx.output.warn(&format!("{:#}; using default routing settings", err));
            RoutingSettings {
                personalization_enabled: true,
                ..RoutingSettings::default()
            }
        }
    };

    let level = if ctx.output.is_verbose() { LogLevel::Debug } else { LogLevel::Error };
    let logger = StructuredLogger::new(RequestId::generate())
        .with_component("explain")
        .with_min_level(level)
        .with_format(LogFormat::Human);

    let request = build_request(&args)?;
    let explanation = explain(&settings, request, args.variants.as_deref(), logger).await?;

    if ctx.output.is_json() {
        ctx.output.json(&explanation);
        return Ok(());
    }

    ctx.output.header(&format!("{} {}", args.method.to_uppercase(), args.path));
    ctx.output.kv("decision", &explanation.decision);
    ctx.output.kv("status", &explanation.status.to_string());
    if let Some(location) = &explanation.location {
        ctx.output.kv("location", location);
    }
    if let Some(forwarded) = &explanation.forwarded {
        ctx.output.kv("forwarded", &format!("{} {}", forwarded.method, forwarded.uri));
        if let Some(variants) = &forwarded.variants {
            ctx.output.kv(PERSONALIZE_VARIANTS_HEADER, &format!("{:?}", variants));
        }
        if let Some(locale) = &forwarded.resolved_locale {
            ctx.output.kv(RESOLVED_LOCALE_HEADER, locale);
        }
    }
    ctx.output.kv(
        "cache-control",
        explanation.cache_control.as_deref().unwrap_or("(origin)"),
    );
    for cookie in &explanation.cookies {
        ctx.output.list_item(&format!("set-cookie {}", cookie));
    }
    if !explanation.variant_aliases.is_empty() {
        ctx.output.kv("variant aliases", &explanation.variant_aliases.join(", "));
    }

    Ok(())
}
