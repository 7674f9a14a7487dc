//! `POST /api/contentstack/getElementWithRefs`.

use edge_sdk::edge_cms::{ContentSource, ElementRequest};
use edge_sdk::edge_core::headers::PERSONALIZE_VARIANTS_HEADER;
use edge_sdk::edge_core::{RequestContext, ResponseContext};
use edge_sdk::edge_observability::StructuredLogger;
use http::{header, Method, StatusCode};
use serde_json::json;

use super::error_response;

/// Serve one entry with references for client-side fetches.
///
/// Answers the entry as JSON, `{}` when it does not exist, and a generic
/// 500 on any failure, including a malformed body.
pub(crate) async fn handle_element(
    content: &dyn ContentSource,
    request: &RequestContext,
    logger: &StructuredLogger,
) -> ResponseContext {
    if request.method != Method::POST {
        let mut response = error_response(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed");
        response.set_header(header::ALLOW, "POST");
        return response;
    }

    let element: ElementRequest = match serde_json::from_slice(&request.body) {
        Ok(element) => element,
        Err(err) => {
            logger
                .error_builder("invalid element request")
                .field("error", err.to_string())
                .emit();
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch data");
        }
    };

    let variant_param = request
        .header(PERSONALIZE_VARIANTS_HEADER)
        .filter(|v| !v.is_empty());

    let result = content
        .get_by_id(
            &element.id,
            &element.content_type,
            element.locale.as_deref(),
            &element.references,
            &element.live_preview,
            variant_param,
        )
        .await;

    match result {
        Ok(Some(entry)) => ResponseContext::json(StatusCode::OK, &entry.into_value()),
        Ok(None) => ResponseContext::json(StatusCode::OK, &json!({})),
        Err(err) => {
            logger
                .error_builder("element fetch failed")
                .field("content_type", element.content_type.as_str())
                .field("entry_uid", element.id.as_str())
                .field("error", err.to_string())
                .emit();
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch data")
        }
    }
}
