//! Shared page chrome: layout, navigation and escaping.

use std::fmt::Write;

use axum::http::StatusCode;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::config::SiteConfig;
use crate::models::CATEGORIES;

/// Escapes text for HTML element content and double-quoted attributes.
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Everything outside the RFC 3986 unreserved set.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.').remove(b'~');

/// Percent-encodes a single URL path segment.
pub fn path_segment(input: &str) -> String {
    utf8_percent_encode(input, SEGMENT).to_string()
}

/// Head metadata for one page.
#[derive(Debug, Clone)]
pub struct PageMeta {
    pub title: String,
    pub description: String,
    /// Site-relative path of the page, e.g. `/prompt/diwali`.
    pub path: String,
    pub image: Option<String>,
}

pub fn layout(site: &SiteConfig, meta: &PageMeta, body: &str) -> String {
    let url = site.url(&meta.path);
    let image = meta
        .image
        .as_deref()
        .map(|src| format!(r#"<meta property="og:image" content="{}">"#, escape(src)))
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<meta name="description" content="{description}">
<link rel="canonical" href="{url}">
<meta property="og:site_name" content="{site_name}">
<meta property="og:title" content="{title}">
<meta property="og:description" content="{description}">
<meta property="og:url" content="{url}">
{image}
</head>
<body>
{navbar}
<main>
{body}
</main>
</body>
</html>
"#,
        title = escape(&meta.title),
        description = escape(&meta.description),
        url = escape(&url),
        site_name = escape(&site.name),
        navbar = navbar(site),
    )
}

fn navbar(site: &SiteConfig) -> String {
    format!(
        r#"<nav>
<a href="/" class="brand">{}</a>
<a href="/">Home</a>
<a href="/contact">Contact</a>
<a href="/admin">Admin</a>
<a href="/privacy-policy">Privacy Policy</a>
<a href="/terms-of-service">Terms of Service</a>
</nav>"#,
        escape(&site.name)
    )
}

/// Chip links to each display category.
pub fn category_links() -> String {
    let mut out = String::from(r#"<div class="categories">"#);
    for category in CATEGORIES {
        let _ = write!(
            out,
            r#"<a href="/categories/{}">{}</a>"#,
            path_segment(category),
            escape(category)
        );
    }
    out.push_str("</div>");
    out
}

/// A visible notification box. `kind` becomes the CSS class.
pub fn notice(kind: &str, message: &str) -> String {
    format!(r#"<p class="notice {}" role="alert">{}</p>"#, kind, escape(message))
}

/// Bare error page used when no site context is available.
pub fn error_page(status: StatusCode, message: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head><meta charset=\"utf-8\"><title>{status}</title></head>\n<body>\n<h1>{status}</h1>\n<p>{message}</p>\n<p><a href=\"/\">Back to home</a></p>\n</body>\n</html>\n",
        status = status,
        message = escape(message)
    )
}
