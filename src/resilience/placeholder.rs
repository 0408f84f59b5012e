//! Synthetic payloads for the degraded and placeholder tiers
//!
//! Each builder returns a payload with exactly the fields of the real
//! one. Values are clearly synthetic; nothing here pretends to be page
//! content.

use crate::crawler::CrawlPage;
use crate::envelope::{CrawlSitePayload, ExtractPayload, FetchPagePayload};
use crate::extract::{ExtractionResult, FieldSchema, FieldValue};
use crate::fetcher::{CacheMode, LinkSet};
use crate::render::count_words;

/// Body text used when the fetch backend is missing
pub(crate) const UNAVAILABLE_DETAIL: &str =
    "Placeholder content: the fetch backend is unavailable, so this page was not retrieved.";

/// Body text used after an unexpected failure
pub(crate) fn error_detail(error: &str) -> String {
    format!("Placeholder content generated after an error: {}", error)
}

fn placeholder_markdown(url: &str, detail: &str, extra: &[String]) -> String {
    let mut markdown = format!("# Content from {}\n\n{}", url, detail);
    if !extra.is_empty() {
        markdown.push_str("\n\n");
        markdown.push_str(&extra.join("\n"));
    }
    markdown
}

pub(crate) fn fetch_page(
    url: &str,
    include_images: bool,
    cache_mode: CacheMode,
    detail: &str,
) -> FetchPagePayload {
    let markdown = placeholder_markdown(
        url,
        detail,
        &[
            format!("Include images: {}", include_images),
            format!("Cache mode: {}", cache_mode),
        ],
    );

    FetchPagePayload {
        url: url.to_string(),
        title: format!("Content from {}", url),
        word_count: count_words(&markdown),
        markdown,
        links: LinkSet::default(),
        images: include_images.then(Vec::new),
    }
}

/// A single seed page at depth 0
pub(crate) fn crawl_site(url: &str, include_images: bool, detail: &str) -> CrawlSitePayload {
    let markdown = placeholder_markdown(url, detail, &[]);
    let page = CrawlPage {
        url: url.to_string(),
        title: format!("Content from {}", url),
        word_count: count_words(&markdown),
        markdown,
        depth: 0,
        media: include_images.then(Vec::new),
    };

    CrawlSitePayload {
        base_url: url.to_string(),
        pages: vec![page],
        pages_crawled: 1,
        max_depth_reached: 0,
    }
}

/// Data shaped like the requested record
///
/// Every single-valued field carries `detail`; multi-valued fields stay
/// empty so no links or items are invented. Without a schema the default
/// `{title, content, links}` record is used.
pub(crate) fn extract(
    url: &str,
    selector: &str,
    schema: Option<&FieldSchema>,
    detail: &str,
) -> ExtractPayload {
    let mut data = ExtractionResult::new();

    match schema {
        Some(schema) => {
            for field in &schema.fields {
                let value = if field.multiple {
                    FieldValue::Multiple(Vec::new())
                } else {
                    FieldValue::Single(detail.to_string())
                };
                data.insert(field.name.clone(), value);
            }
        }
        None => {
            data.insert("title".to_string(), FieldValue::Single(String::new()));
            data.insert("content".to_string(), FieldValue::Single(detail.to_string()));
            data.insert("links".to_string(), FieldValue::Multiple(Vec::new()));
        }
    }

    ExtractPayload {
        url: url.to_string(),
        selector: selector.to_string(),
        data,
    }
}
