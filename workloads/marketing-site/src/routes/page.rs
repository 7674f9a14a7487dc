//! Locale pages: `/{locale}` and `/{locale}/{path}`.

use edge_sdk::edge_cache::{generate_etag, CacheHeadersBuilder};
use edge_sdk::edge_cms::{ContentSource, Entry, LivePreviewQuery};
use edge_sdk::edge_core::{LocaleSet, RequestContext, ResponseContext};
use edge_sdk::edge_observability::StructuredLogger;
use edge_sdk::edge_pipeline::PageContext;
use http::{header, Method, StatusCode};

use super::error_response;
use crate::render::{render_document, render_sections, SeoMetadata};

/// Content type holding the home page and the site-wide SEO defaults.
pub const HOMEPAGE_CONTENT_TYPE: &str = "homepage";

/// Content type for pages below the locale root, matched by `url`.
pub const PAGE_CONTENT_TYPE: &str = "page";

/// Render a locale page from the forwarded request.
///
/// Unsupported locales and missing entries are 404; a failed content query
/// is a generic 500.
pub(crate) async fn handle_page(
    content: &dyn ContentSource,
    locales: &LocaleSet,
    live_preview_enabled: bool,
    request: &RequestContext,
    logger: &StructuredLogger,
) -> ResponseContext {
    if request.method != Method::GET && request.method != Method::HEAD {
        let mut response = error_response(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed");
        response.set_header(header::ALLOW, "GET, HEAD");
        return response;
    }

    let Ok(page) = PageContext::from_request(request, locales) else {
        return error_response(StatusCode::NOT_FOUND, "Not found");
    };

    let preview = match request.query() {
        Some(query) if live_preview_enabled => LivePreviewQuery::from_query(query),
        _ => LivePreviewQuery::none(),
    };

    let (home, entry) = match fetch_entries(content, &page, &preview).await {
        Ok(found) => found,
        Err(err) => {
            logger
                .error_builder("page content query failed")
                .field("locale", page.locale.as_str())
                .field("page_path", page.page_path.as_str())
                .field("error", err.to_string())
                .emit();
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error");
        }
    };

    let Some(entry) = entry else {
        return error_response(StatusCode::NOT_FOUND, "Not found");
    };

    let seo = SeoMetadata::from_entries([&entry].into_iter().chain(home.as_ref()));
    let html = render_document(&page, &seo, &render_sections(&entry));

    let mut response = ResponseContext::new(StatusCode::OK, Vec::new());
    response.set_header(header::CONTENT_TYPE, "text/html; charset=utf-8");
    response.set_header(header::CONTENT_LANGUAGE, page.locale.as_str());
    CacheHeadersBuilder::new()
        .no_store()
        .etag(generate_etag(html.as_bytes()))
        .apply_to(&mut response);
    if request.method == Method::GET {
        response.body = html.into_bytes();
    }
    response
}

/// Fetch the homepage and, below the root, the page entry in parallel.
///
/// Returns `(homepage, entry to render)`.
async fn fetch_entries(
    content: &dyn ContentSource,
    page: &PageContext,
    preview: &LivePreviewQuery,
) -> Result<(Option<Entry>, Option<Entry>), edge_sdk::edge_cms::ContentError> {
    let locale = Some(page.locale.as_str());
    let variant_param = page.variant_param();
    let is_root = page.page_path == "/";

    let homepage = content.get_by_type(HOMEPAGE_CONTENT_TYPE, locale, preview, variant_param);
    let subpage = async {
        if is_root {
            return Ok(Vec::new());
        }
        content
            .get_by_url(PAGE_CONTENT_TYPE, &page.page_path, locale, preview, variant_param)
            .await
    };

    let (homepages, pages) = futures::try_join!(homepage, subpage)?;
    let home = homepages.into_iter().next();
    let entry = if is_root {
        home.clone()
    } else {
        pages.into_iter().next()
    };

    Ok((home, entry))
}
