//! Spin HTTP component entry point.

use std::sync::Arc;

use anyhow::{anyhow, Context};
use futures::SinkExt;
use http::header::{HeaderName, HeaderValue};
use once_cell::sync::OnceCell;
use spin_sdk::http::{Fields, IncomingRequest, Method as SpinMethod, OutgoingResponse, ResponseOutparam};
use spin_sdk::http_component;

use edge_sdk::edge_cms::DeliveryClient;
use edge_sdk::edge_core::{RequestContext, RequestId, ResponseContext, SiteConfig};
use edge_sdk::edge_data::{FetchClient, SpinTransport};
use edge_sdk::edge_observability::StructuredLogger;
use edge_sdk::edge_personalize::{DecisionService, EdgeApiClient, SharedClient};
use http::StatusCode;

use crate::app::App;

static APP: OnceCell<App> = OnceCell::new();
static DECISIONS: SharedClient = SharedClient::new();

/// Application state, built from Spin variables on first use.
fn app() -> anyhow::Result<&'static App> {
    APP.get_or_try_init(|| {
        let config = SiteConfig::from_lookup(|key| spin_sdk::variables::get(&key.to_lowercase()).ok())
            .context("invalid site configuration")?;
        config.validate().context("invalid site configuration")?;

        let decisions = DECISIONS.get_or_try_init(|| {
            let fetch = FetchClient::new(Arc::new(SpinTransport));
            EdgeApiClient::new(fetch, config.personalize.edge_api_url.as_deref())
                .map(|client| Arc::new(client) as Arc<dyn DecisionService>)
        })?;

        let content = DeliveryClient::new(FetchClient::new(Arc::new(SpinTransport)), config.cms.clone());

        Ok(App::new(&config, decisions, Arc::new(content)))
    })
}

/// Marketing site handler: every route goes through the edge pipeline.
#[http_component]
async fn handle_site(req: IncomingRequest, response_out: ResponseOutparam) {
    let response = match serve(req).await {
        Ok(response) => response,
        Err(err) => {
            StructuredLogger::new(RequestId::generate())
                .with_component("marketing-site")
                .error_builder("request not served")
                .field("error", format!("{:#}", err))
                .emit();
            let mut response = ResponseContext::json(
                StatusCode::INTERNAL_SERVER_ERROR,
                &serde_json::json!({"error": "Internal server error"}),
            );
            edge_sdk::edge_cache::enforce_no_store(&mut response);
            response
        }
    };

    if let Err(err) = write_response(response, response_out).await {
        StructuredLogger::new(RequestId::generate())
            .with_component("marketing-site")
            .error_builder("failed to write response")
            .field("error", format!("{:#}", err))
            .emit();
    }
}

async fn serve(req: IncomingRequest) -> anyhow::Result<ResponseContext> {
    let app = app()?;
    let request = into_context(req).await?;
    Ok(app.handle(request).await)
}

fn http_method(method: &SpinMethod) -> anyhow::Result<http::Method> {
    let method = match method {
        SpinMethod::Get => http::Method::GET,
        SpinMethod::Post => http::Method::POST,
        SpinMethod::Put => http::Method::PUT,
        SpinMethod::Patch => http::Method::PATCH,
        SpinMethod::Delete => http::Method::DELETE,
        SpinMethod::Head => http::Method::HEAD,
        SpinMethod::Options => http::Method::OPTIONS,
        SpinMethod::Connect => http::Method::CONNECT,
        SpinMethod::Trace => http::Method::TRACE,
        SpinMethod::Other(other) => http::Method::from_bytes(other.as_bytes())?,
    };
    Ok(method)
}

/// Convert the Spin request into a `RequestContext`.
///
/// Repeated headers (e.g. several `cookie` lines) are kept.
async fn into_context(req: IncomingRequest) -> anyhow::Result<RequestContext> {
    let method = http_method(&req.method())?;
    let path = req.path_with_query().unwrap_or_else(|| "/".to_string());
    let mut request = RequestContext::parse(method, &path)?;

    for (name, value) in req.headers().entries() {
        let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_bytes(&value),
        ) else {
            continue;
        };
        request.headers.append(name, value);
    }

    let body = req
        .into_body()
        .await
        .map_err(|e| anyhow!("failed to read request body: {:?}", e))?;

    Ok(request.with_body(body))
}

async fn write_response(response: ResponseContext, response_out: ResponseOutparam) -> anyhow::Result<()> {
    let header_list: Vec<(String, Vec<u8>)> = response
        .headers
        .iter()
        .map(|(name, value)| (name.as_str().to_string(), value.as_bytes().to_vec()))
        .collect();

    let headers = Fields::from_list(&header_list).map_err(|e| anyhow!("invalid response headers: {:?}", e))?;
    let outgoing = OutgoingResponse::new(headers);
    outgoing
        .set_status_code(response.status.as_u16())
        .map_err(|_| anyhow!("invalid status {}", response.status))?;

    let mut body = outgoing.take_body();
    response_out.set(outgoing);
    body.send(response.body)
        .await
        .map_err(|e| anyhow!("failed to send body: {:?}", e))?;

    Ok(())
}
