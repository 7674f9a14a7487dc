//! Full-page document shell.

use edge_sdk::edge_pipeline::PageContext;
use serde_json::json;

use super::seo::SeoMetadata;

/// Wrap rendered sections in the page shell.
///
/// The page context is embedded as JSON so client-side fetches reuse the
/// same locale and variants.
pub fn render_document(page: &PageContext, seo: &SeoMetadata, main: &str) -> String {
    let context = json!({
        "locale": page.locale.as_str(),
        "variants": page.variant_param().unwrap_or(""),
        "path": page.page_path,
    });
    // `</` would close the script element early.
    let context = context.to_string().replace("</", "<\\/");

    format!(
        r#"<!DOCTYPE html>
<html lang="{}">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
{}<style>{}</style>
</head>
<body>
<main class="container">
{}
</main>
<script id="__PAGE_CONTEXT__" type="application/json">{}</script>
</body>
</html>"#,
        page.locale,
        seo.render(),
        STYLES,
        main,
        context
    )
}

const STYLES: &str = r#"
* { box-sizing: border-box; margin: 0; padding: 0; }
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; background: #f9fafb; color: #1e293b; }
.container { max-width: 1200px; margin: 0 auto; padding: 2rem 1rem; }
.banner { border-radius: 8px; padding: 3rem; min-height: 300px; display: flex; align-items: center; justify-content: center; margin-bottom: 2rem; }
.banner-content { position: relative; display: inline-block; }
.banner-headline { font-size: 4rem; font-weight: 700; }
.banner-line { position: absolute; bottom: -0.5rem; left: -0.5rem; right: -0.5rem; height: 10px; border-radius: 5px; }
.form form { display: flex; flex-direction: column; gap: 1rem; max-width: 480px; }
.form label { display: flex; flex-direction: column; gap: 0.25rem; }
.notice { background: #fefce8; border: 1px solid #fef08a; border-radius: 6px; padding: 1rem; color: #854d0e; }
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use edge_sdk::edge_core::{LocaleSet, RequestContext};

    #[test]
    fn test_document_carries_locale_and_variants() {
        let request = RequestContext::get("/fr")
            .unwrap()
            .with_header("x-personalize-variants", "exp</script>=1")
            .unwrap();
        let page = PageContext::from_request(&request, &LocaleSet::default()).unwrap();
        let html = render_document(&page, &SeoMetadata::default(), "<p>hi</p>");

        assert!(html.contains(r#"<html lang="fr">"#));
        assert!(html.contains("<p>hi</p>"));
        assert!(html.contains(r#""variants":"exp<\/script>=1""#));
        assert!(!html.contains("exp</script>"));
    }
}
