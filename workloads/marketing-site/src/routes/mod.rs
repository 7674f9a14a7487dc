//! Origin routes.

mod element;
mod elements;
mod page;

pub(crate) use element::handle_element;
pub(crate) use elements::handle_elements;
pub(crate) use page::handle_page;
pub use page::{HOMEPAGE_CONTENT_TYPE, PAGE_CONTENT_TYPE};

use edge_sdk::edge_core::ResponseContext;
use http::StatusCode;
use serde_json::json;

/// JSON error body. Never carries internal details.
pub(crate) fn error_response(status: StatusCode, message: &str) -> ResponseContext {
    ResponseContext::json(status, &json!({ "error": message }))
}
