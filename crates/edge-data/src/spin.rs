//! Spin outbound HTTP transport.

use async_trait::async_trait;
use edge_core::{RequestContext, ResponseContext};
use http::header::{HeaderName, HeaderValue};
use http::StatusCode;
use spin_sdk::http::{Method as SpinMethod, Request, Response};

use crate::client::FetchError;
use crate::transport::HttpTransport;

/// Transport backed by the Spin host's outbound HTTP.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpinTransport;

fn spin_method(method: &http::Method) -> SpinMethod {
    match *method {
        http::Method::GET => SpinMethod::Get,
        http::Method::POST => SpinMethod::Post,
        http::Method::PUT => SpinMethod::Put,
        http::Method::PATCH => SpinMethod::Patch,
        http::Method::DELETE => SpinMethod::Delete,
        http::Method::HEAD => SpinMethod::Head,
        http::Method::OPTIONS => SpinMethod::Options,
        _ => SpinMethod::Other(method.as_str().to_string()),
    }
}

#[async_trait(?Send)]
impl HttpTransport for SpinTransport {
    async fn send(&self, request: RequestContext) -> Result<ResponseContext, FetchError> {
        let mut builder = Request::builder();
        builder
            .method(spin_method(&request.method))
            .uri(request.uri.to_string());

        for (name, value) in request.headers.iter() {
            if let Ok(value) = value.to_str() {
                builder.header(name.as_str(), value);
            }
        }

        let outgoing = builder.body(request.body).build();

        let resp: Response = spin_sdk::http::send(outgoing)
            .await
            .map_err(|e| FetchError::Connection(e.to_string()))?;

        let status = StatusCode::from_u16(*resp.status())
            .map_err(|e| FetchError::Request(e.to_string()))?;

        let mut response = ResponseContext::new(status, Vec::new());
        for (name, value) in resp.headers() {
            let (Ok(name), Ok(value)) = (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_bytes(value.as_bytes()),
            ) else {
                continue;
            };
            response.headers.append(name, value);
        }
        response.body = resp.into_body();

        Ok(response)
    }
}
