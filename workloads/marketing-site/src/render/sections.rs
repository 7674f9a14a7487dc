//! Page sections rendered from entry fields.

use edge_sdk::edge_cms::Entry;
use serde_json::Value;

use super::html_escape;

const DEFAULT_BACKGROUND: &str = "#1A1A1A";
const DEFAULT_LINE: &str = "#3A8FFF";
const DEFAULT_TEXT: &str = "#FFFFFF";

/// Render every section the entry has content for.
pub fn render_sections(entry: &Entry) -> String {
    let mut html = String::new();

    if let Some(banner) = render_color_banner(entry) {
        html.push_str(&banner);
    }

    match entry.get("underline_form") {
        Some(form) if !form.is_null() => html.push_str(&render_form(form)),
        _ => html.push_str(
            r#"<div class="notice" data-section="form">
    <p>No form configured for this page. Add a form using the Underline Form field in the CMS.</p>
</div>"#,
        ),
    }

    html
}

/// Color picker fields hold `{hex, r, g, b}`; only `hex` is used.
fn color(entry: &Entry, field: &str) -> Option<String> {
    let value = entry.get(field)?;
    let hex = value
        .get("hex")
        .and_then(Value::as_str)
        .or_else(|| value.as_str())?;
    is_css_color(hex).then(|| hex.to_string())
}

fn is_css_color(value: &str) -> bool {
    value
        .strip_prefix('#')
        .is_some_and(|hex| matches!(hex.len(), 3 | 6 | 8) && hex.chars().all(|c| c.is_ascii_hexdigit()))
}

/// The underline banner, shown when any of its colors is set.
fn render_color_banner(entry: &Entry) -> Option<String> {
    let background = color(entry, "background_color");
    let line = color(entry, "line_color");
    let text = color(entry, "text_color");
    if background.is_none() && line.is_none() && text.is_none() {
        return None;
    }

    let headline = entry
        .get("headline")
        .and_then(Value::as_str)
        .unwrap_or("Underline");

    Some(format!(
        r#"<section class="banner" data-section="banner" style="background-color: {}">
    <div class="banner-content">
        <h1 class="banner-headline" style="color: {}">{}</h1>
        <div class="banner-line" style="background-color: {}"></div>
    </div>
</section>"#,
        background.as_deref().unwrap_or(DEFAULT_BACKGROUND),
        text.as_deref().unwrap_or(DEFAULT_TEXT),
        html_escape(headline),
        line.as_deref().unwrap_or(DEFAULT_LINE),
    ))
}

fn render_form(form: &Value) -> String {
    let str_field = |key: &str| form.get(key).and_then(Value::as_str);

    let fields: String = form
        .get("fields")
        .and_then(Value::as_array)
        .map(|fields| fields.iter().map(render_form_field).collect())
        .unwrap_or_default();

    let title = str_field("title")
        .map(|t| format!("    <h2>{}</h2>\n", html_escape(t)))
        .unwrap_or_default();

    format!(
        r#"<section class="form" data-section="form">
{}    <form method="post" action="{}">
{}        <button type="submit">{}</button>
    </form>
</section>"#,
        title,
        html_escape(str_field("action").unwrap_or("")),
        fields,
        html_escape(str_field("submit_label").unwrap_or("Submit")),
    )
}

fn render_form_field(field: &Value) -> String {
    let get = |key: &str| field.get(key).and_then(Value::as_str).unwrap_or("");
    let name = get("name");
    let label = match get("label") {
        "" => name,
        label => label,
    };
    let kind = match get("type") {
        "" => "text",
        kind => kind,
    };
    let required = if field.get("required").and_then(Value::as_bool).unwrap_or(false) {
        " required"
    } else {
        ""
    };

    format!(
        "        <label>{}<input type=\"{}\" name=\"{}\"{}></label>\n",
        html_escape(label),
        html_escape(kind),
        html_escape(name),
        required
    )
}
