//! `POST /api/contentstack/getElements`.

use edge_sdk::edge_cms::{ContentSource, ElementsLookup, ElementsRequest};
use edge_sdk::edge_core::headers::PERSONALIZE_VARIANTS_HEADER;
use edge_sdk::edge_core::{RequestContext, ResponseContext};
use edge_sdk::edge_observability::StructuredLogger;
use http::{header, Method, StatusCode};
use serde_json::json;

use super::error_response;

/// Serve entry lists (by type, url or taxonomy term) for client-side
/// fetches. No match is `{"entries": []}`; any failure is a generic 500.
pub(crate) async fn handle_elements(
    content: &dyn ContentSource,
    request: &RequestContext,
    logger: &StructuredLogger,
) -> ResponseContext {
    if request.method != Method::POST {
        let mut response = error_response(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed");
        response.set_header(header::ALLOW, "POST");
        return response;
    }

    let elements: ElementsRequest = match serde_json::from_slice(&request.body) {
        Ok(elements) => elements,
        Err(err) => {
            logger
                .error_builder("invalid elements request")
                .field("error", err.to_string())
                .emit();
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch data");
        }
    };

    let variant_param = request
        .header(PERSONALIZE_VARIANTS_HEADER)
        .filter(|v| !v.is_empty());
    let content_type = elements.content_type.as_str();
    let locale = elements.locale.as_deref();
    let preview = &elements.live_preview;

    let result = match &elements.lookup {
        ElementsLookup::Type => content.get_by_type(content_type, locale, preview, variant_param).await,
        ElementsLookup::Url { url } => {
            content
                .get_by_url(content_type, url, locale, preview, variant_param)
                .await
        }
        ElementsLookup::Taxonomy { term } => {
            content
                .get_by_taxonomy(content_type, locale, term, preview, variant_param)
                .await
        }
    };

    match result {
        Ok(entries) => ResponseContext::json(StatusCode::OK, &json!({ "entries": entries })),
        Err(err) => {
            logger
                .error_builder("elements fetch failed")
                .field("content_type", content_type)
                .field("error", err.to_string())
                .emit();
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch data")
        }
    }
}
