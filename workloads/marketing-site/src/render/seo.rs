//! SEO metadata from the entry's `seo` group.

use edge_sdk::edge_cms::Entry;
use serde_json::Value;

use super::html_escape;

/// Page metadata rendered into `<head>`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeoMetadata {
    pub title: Option<String>,
    pub description: Option<String>,
    /// `false` when the entry sets `no_index`.
    pub index: bool,
    /// `false` when the entry sets `no_follow`.
    pub follow: bool,
    pub og_title: Option<String>,
    pub og_description: Option<String>,
    pub og_image: Option<String>,
}

fn text(entry: &Entry, pointer: &str) -> Option<String> {
    entry
        .pointer(pointer)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn flag(entry: &Entry, pointer: &str) -> bool {
    entry.pointer(pointer).and_then(Value::as_bool).unwrap_or(false)
}

impl SeoMetadata {
    /// Read metadata from an entry. Missing fields stay empty and robots
    /// default to `index, follow`.
    pub fn from_entry(entry: &Entry) -> Self {
        // Asset fields arrive as objects; plain URLs are accepted too.
        let og_image = entry
            .pointer("/seo/og_meta_tags/image/url")
            .or_else(|| entry.pointer("/seo/og_meta_tags/image"))
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        Self {
            title: text(entry, "/seo/title"),
            description: text(entry, "/seo/description"),
            index: !flag(entry, "/seo/no_index"),
            follow: !flag(entry, "/seo/no_follow"),
            og_title: text(entry, "/seo/og_meta_tags/title"),
            og_description: text(entry, "/seo/og_meta_tags/description"),
            og_image,
        }
    }

    /// The first entry that carries an `seo` group wins.
    pub fn from_entries<'a>(entries: impl IntoIterator<Item = &'a Entry>) -> Self {
        entries
            .into_iter()
            .find(|entry| entry.get("seo").is_some_and(Value::is_object))
            .map(Self::from_entry)
            .unwrap_or_else(|| Self {
                index: true,
                follow: true,
                ..Self::default()
            })
    }

    pub fn robots(&self) -> String {
        format!(
            "{}, {}",
            if self.index { "index" } else { "noindex" },
            if self.follow { "follow" } else { "nofollow" }
        )
    }

    /// Render `<title>` and the meta tags.
    pub fn render(&self) -> String {
        let mut head = String::new();

        if let Some(title) = &self.title {
            head.push_str(&format!("<title>{}</title>\n", html_escape(title)));
        }
        if let Some(description) = &self.description {
            head.push_str(&meta_name("description", description));
        }
        head.push_str(&meta_name("robots", &self.robots()));

        let og = [
            ("og:title", &self.og_title),
            ("og:description", &self.og_description),
            ("og:image", &self.og_image),
        ];
        for (property, value) in og {
            if let Some(value) = value {
                head.push_str(&format!(
                    "<meta property=\"{}\" content=\"{}\">\n",
                    property,
                    html_escape(value)
                ));
            }
        }

        head
    }
}

fn meta_name(name: &str, content: &str) -> String {
    format!("<meta name=\"{}\" content=\"{}\">\n", name, html_escape(content))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(value: Value) -> Entry {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_full_seo_group() {
        let seo = SeoMetadata::from_entry(&entry(json!({
            "seo": {
                "title": "Underline",
                "description": "A demo",
                "no_index": true,
                "og_meta_tags": {
                    "title": "OG",
                    "image": {"url": "https://images.example/og.png"}
                }
            }
        })));

        assert_eq!(seo.title.as_deref(), Some("Underline"));
        assert_eq!(seo.robots(), "noindex, follow");
        assert_eq!(seo.og_title.as_deref(), Some("OG"));
        assert_eq!(seo.og_description, None);
        assert_eq!(seo.og_image.as_deref(), Some("https://images.example/og.png"));
    }

    #[test]
    fn test_missing_group_defaults() {
        let seo = SeoMetadata::from_entry(&entry(json!({"title": "Home"})));
        assert_eq!(seo.title, None);
        assert_eq!(seo.robots(), "index, follow");
    }

    #[test]
    fn test_from_entries_falls_back() {
        let page = entry(json!({"title": "About"}));
        let home = entry(json!({"seo": {"title": "Site"}}));
        let seo = SeoMetadata::from_entries([&page, &home]);
        assert_eq!(seo.title.as_deref(), Some("Site"));

        let none = SeoMetadata::from_entries(std::iter::empty());
        assert_eq!(none.robots(), "index, follow");
    }

    #[test]
    fn test_render_escapes() {
        let seo = SeoMetadata {
            title: Some("Fish & <Chips>".into()),
            og_image: Some("https://x/\"a\".png".into()),
            index: true,
            follow: false,
            ..SeoMetadata::default()
        };
        let html = seo.render();
        assert!(html.contains("<title>Fish &amp; &lt;Chips&gt;</title>"));
        assert!(html.contains(r#"<meta name="robots" content="index, nofollow">"#));
        assert!(html.contains("&quot;a&quot;"));
        assert!(!html.contains("og:title"));
    }
}
