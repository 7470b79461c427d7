//! Scraping helpers shared by the rendered-page adapters.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Selector};
use url::Url;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Compile a selector literal.
///
/// Only used for the adapters' built-in selectors, which are known to parse.
pub fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|_| panic!("invalid CSS selector: {}", css))
}

/// Collapse runs of whitespace (including newlines and nbsp) to one space.
pub fn normalize_whitespace(text: &str) -> String {
    WHITESPACE_RE
        .replace_all(&text.replace('\u{a0}', " "), " ")
        .trim()
        .to_string()
}

/// Decode HTML entities, tolerating one level of double encoding.
pub fn clean_html_entities(text: &str) -> String {
    let mut cleaned = text.to_string();
    for _ in 0..2 {
        let decoded = html_escape::decode_html_entities(&cleaned).into_owned();
        if decoded == cleaned {
            break;
        }
        cleaned = decoded;
    }
    cleaned
}

/// Visible text of an element, whitespace-normalized. `None` when blank.
pub fn element_text(element: ElementRef<'_>) -> Option<String> {
    let raw = element.text().collect::<Vec<_>>().join(" ");
    let text = normalize_whitespace(&clean_html_entities(&raw));
    (!text.is_empty()).then_some(text)
}

/// Text of the first descendant matching `sel`.
pub fn text_of(element: ElementRef<'_>, sel: &Selector) -> Option<String> {
    element.select(sel).find_map(element_text)
}

/// Attribute of the first descendant matching `sel` that carries it.
pub fn attr_of(element: ElementRef<'_>, sel: &Selector, attr: &str) -> Option<String> {
    element
        .select(sel)
        .filter_map(|el| el.value().attr(attr))
        .map(str::trim)
        .find(|value| !value.is_empty())
        .map(str::to_string)
}

/// Image URL of the first matching `<img>`, falling back to lazy-load attributes.
pub fn image_of(element: ElementRef<'_>, sel: &Selector) -> Option<String> {
    let img = element.select(sel).next()?;
    ["src", "data-src", "data-srcset", "srcset"]
        .iter()
        .filter_map(|attr| img.value().attr(attr))
        .map(|value| value.split_whitespace().next().unwrap_or(""))
        .find(|value| !value.is_empty() && !value.starts_with("data:"))
        .map(str::to_string)
}

/// Resolve `href` against `base`, returning an absolute http(s) URL.
///
/// Protocol-relative URLs (`//cdn.example.com/x.jpg`) are promoted to https.
pub fn absolute_url(base: &Url, href: &str) -> Option<String> {
    let href = clean_html_entities(href.trim());
    if href.is_empty() {
        return None;
    }
    let resolved = if let Some(rest) = href.strip_prefix("//") {
        Url::parse(&format!("https://{}", rest)).ok()?
    } else {
        base.join(&href).ok()?
    };
    matches!(resolved.scheme(), "http" | "https").then(|| resolved.to_string())
}
