//! HTML link and image extraction
//!
//! # Link Extraction Rules
//!
//! **Include:**
//! - `<a href="...">` anywhere in the document
//!
//! **Exclude:**
//! - `<a href="..." download>`
//! - `javascript:`, `mailto:`, `tel:` links and data URIs
//! - Fragment-only links (same page anchors)
//! - Anything that does not resolve to http or https
//!
//! Links are deduplicated by absolute href, keeping the first occurrence
//! so document order is preserved.

use crate::fetcher::{Link, LinkSet, MediaRef};
use crate::url::{classify_link, LinkScope};
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Extracts all followable links from the document, classified against `base_url`
///
/// # Example
///
/// ```
/// use scraper::Html;
/// use sumi_scribe::fetcher::extract_links;
/// use url::Url;
///
/// let html = Html::parse_document(
///     r#"<a href="/docs">Docs</a><a href="https://other.org/">Other</a>"#,
/// );
/// let base = Url::parse("https://example.com/").unwrap();
/// let links = extract_links(&html, &base);
///
/// assert_eq!(links.internal[0].href, "https://example.com/docs");
/// assert_eq!(links.external[0].text, "Other");
/// ```
pub fn extract_links(document: &Html, base_url: &Url) -> LinkSet {
    let mut links = LinkSet::default();
    let mut seen = HashSet::new();

    let Ok(a_selector) = Selector::parse("a[href]") else {
        return links;
    };

    for element in document.select(&a_selector) {
        if element.value().attr("download").is_some() {
            continue;
        }

        let Some(absolute) = element
            .value()
            .attr("href")
            .and_then(|href| resolve_link(href, base_url))
        else {
            continue;
        };

        if !seen.insert(absolute.as_str().to_string()) {
            continue;
        }

        let link = Link {
            href: absolute.to_string(),
            text: collapse_whitespace(&element.text().collect::<String>()),
        };

        match classify_link(base_url, &absolute) {
            LinkScope::Internal => links.internal.push(link),
            LinkScope::External => links.external.push(link),
        }
    }

    links
}

/// Extracts image references from the document
///
/// Images without a resolvable `src` are skipped; repeated sources are
/// reported once.
pub fn extract_media(document: &Html, base_url: &Url) -> Vec<MediaRef> {
    let Ok(img_selector) = Selector::parse("img[src]") else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut media = Vec::new();

    for element in document.select(&img_selector) {
        let Some(src) = element
            .value()
            .attr("src")
            .map(str::trim)
            .filter(|s| !s.is_empty() && !s.starts_with("data:"))
            .and_then(|s| base_url.join(s).ok())
        else {
            continue;
        };

        if seen.insert(src.to_string()) {
            media.push(MediaRef {
                src: src.to_string(),
                alt: element.value().attr("alt").unwrap_or("").trim().to_string(),
            });
        }
    }

    media
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Fragment-only hrefs
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
pub fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if ["javascript:", "mailto:", "tel:", "data:"]
        .iter()
        .any(|scheme| lower.starts_with(scheme))
    {
        return None;
    }

    let mut absolute = base_url.join(href).ok()?;
    if absolute.scheme() != "http" && absolute.scheme() != "https" {
        return None;
    }

    absolute.set_fragment(None);
    Some(absolute)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
