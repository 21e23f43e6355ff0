//! HTML extraction for crawled pages
//!
//! This module turns a page body into a [`PageRecord`]:
//! - First `<h1>` text
//! - First paragraph (preferring the page's `<main>` element)
//! - Outgoing links (from `<a href>`)
//! - Image URLs (from `<img src>`)
//!
//! Extraction never fails; anything that cannot be parsed degrades to an
//! empty field.

use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Structured data extracted from one page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageRecord {
    /// The URL the page was fetched from (not normalized)
    pub url: String,

    /// Text of the first `<h1>`, may be empty
    pub h1: String,

    /// Text of the first qualifying paragraph, may be empty
    pub first_paragraph: String,

    /// Absolute URLs of outgoing links, in document order
    pub outgoing_links: Vec<String>,

    /// Absolute image URLs, in document order
    pub image_urls: Vec<String>,
}

/// Extracts page data from HTML fetched from `page_url`
///
/// Links and images are resolved against `page_url`. If `page_url` does not
/// parse, the record carries the URL and empty fields.
///
/// # Example
///
/// ```
/// use linkloom::crawler::extract_page_data;
///
/// let html = r#"<html><body><h1>Hi</h1><p>Intro</p><a href="/next">Next</a></body></html>"#;
/// let page = extract_page_data(html, "https://example.com/");
/// assert_eq!(page.h1, "Hi");
/// assert_eq!(page.first_paragraph, "Intro");
/// assert_eq!(page.outgoing_links, vec!["https://example.com/next".to_string()]);
/// ```
pub fn extract_page_data(html: &str, page_url: &str) -> PageRecord {
    let base_url = match Url::parse(page_url) {
        Ok(url) => url,
        Err(e) => {
            tracing::debug!("Cannot resolve links against {}: {}", page_url, e);
            return PageRecord {
                url: page_url.to_string(),
                ..PageRecord::default()
            };
        }
    };

    let document = Html::parse_document(html);

    PageRecord {
        url: page_url.to_string(),
        h1: extract_h1(&document),
        first_paragraph: extract_first_paragraph(&document),
        outgoing_links: extract_links(&document, &base_url),
        image_urls: extract_images(&document, &base_url),
    }
}

/// Returns the trimmed text of the first `<h1>`
pub fn get_h1_from_html(html: &str) -> String {
    extract_h1(&Html::parse_document(html))
}

/// Returns the trimmed text of the first paragraph
///
/// A paragraph inside the first `<main>` wins; otherwise the first `<p>` in
/// the document is used.
pub fn get_first_paragraph_from_html(html: &str) -> String {
    extract_first_paragraph(&Html::parse_document(html))
}

/// Returns the absolute URLs of all followable `<a href>` links
pub fn get_urls_from_html(html: &str, base_url: &Url) -> Vec<String> {
    extract_links(&Html::parse_document(html), base_url)
}

/// Returns the absolute URLs of all `<img src>` images
pub fn get_images_from_html(html: &str, base_url: &Url) -> Vec<String> {
    extract_images(&Html::parse_document(html), base_url)
}

fn extract_h1(document: &Html) -> String {
    let Ok(h1_selector) = Selector::parse("h1") else {
        return String::new();
    };

    document
        .select(&h1_selector)
        .next()
        .map(element_text)
        .unwrap_or_default()
}

fn extract_first_paragraph(document: &Html) -> String {
    let (Ok(main_selector), Ok(p_selector)) = (Selector::parse("main"), Selector::parse("p"))
    else {
        return String::new();
    };

    let in_main = document
        .select(&main_selector)
        .next()
        .and_then(|main| main.select(&p_selector).next());

    in_main
        .or_else(|| document.select(&p_selector).next())
        .map(element_text)
        .unwrap_or_default()
}

fn extract_links(document: &Html, base_url: &Url) -> Vec<String> {
    collect_resolved(document, "a[href]", "href", base_url)
}

fn extract_images(document: &Html, base_url: &Url) -> Vec<String> {
    collect_resolved(document, "img[src]", "src", base_url)
}

/// Resolves `attr` of every element matching `selector`, in document order
fn collect_resolved(document: &Html, selector: &str, attr: &str, base_url: &Url) -> Vec<String> {
    let Ok(selector) = Selector::parse(selector) else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|element| element.value().attr(attr))
        .filter_map(|value| resolve_link(value, base_url))
        .collect()
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Empty and fragment-only hrefs
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if lowered.starts_with("javascript:")
        || lowered.starts_with("mailto:")
        || lowered.starts_with("tel:")
        || lowered.starts_with("data:")
    {
        return None;
    }

    let absolute_url = base_url.join(href).ok()?;
    match absolute_url.scheme() {
        "http" | "https" => Some(absolute_url.to_string()),
        _ => None,
    }
}
