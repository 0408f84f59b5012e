//! Page renderer
//!
//! Turns the raw output of a [`DocumentFetcher`] into a
//! [`RenderedDocument`]: title, markdown body, word count, classified
//! links and (optionally) image references.

use crate::fetcher::{CacheMode, DocumentFetcher, FetchedPage, LinkSet, MediaRef};
use crate::url::{classify_link, LinkScope};
use crate::{Result, ScribeError};
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use url::Url;

/// Elements whose content never belongs in the markdown body
const NON_CONTENT_TAGS: &[&str] = &["script", "style", "noscript", "template", "iframe"];

/// A fetched page normalized into markdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedDocument {
    /// The URL that was requested
    pub url: String,
    pub title: String,
    pub markdown: String,
    /// Whitespace-separated tokens in `markdown`
    pub word_count: usize,
    pub links: LinkSet,
    /// Present only when images were requested
    pub media: Option<Vec<MediaRef>>,
}

/// Fetches and renders pages through a shared fetch backend
///
/// Clones share the backend slot, so a backend installed through one
/// clone is used by all of them from the next fetch on.
#[derive(Clone)]
pub struct PageRenderer {
    fetcher: Arc<RwLock<Arc<dyn DocumentFetcher>>>,
}

impl PageRenderer {
    pub fn new(fetcher: Arc<dyn DocumentFetcher>) -> Self {
        Self {
            fetcher: Arc::new(RwLock::new(fetcher)),
        }
    }

    /// Swaps in a new fetch backend; in-flight fetches keep the old one
    pub async fn replace_fetcher(&self, fetcher: Arc<dyn DocumentFetcher>) {
        *self.fetcher.write().await = fetcher;
    }

    async fn current_fetcher(&self) -> Arc<dyn DocumentFetcher> {
        self.fetcher.read().await.clone()
    }

    /// Fetches `url` and renders it
    ///
    /// # Returns
    ///
    /// * `Ok(RenderedDocument)` - The page was fetched and rendered
    /// * `Err(ScribeError::Fetch)` - The URL is invalid or could not be retrieved
    /// * `Err(ScribeError::DependencyUnavailable)` - The fetch backend is unusable
    pub async fn render(
        &self,
        url: &str,
        include_images: bool,
        cache_mode: CacheMode,
    ) -> Result<RenderedDocument> {
        let requested = Url::parse(url.trim())
            .map_err(|e| ScribeError::fetch(url, format!("invalid URL: {}", e)))?;

        let fetched = self.current_fetcher().await.fetch(&requested, cache_mode).await?;
        let document = render_fetched(&requested, &fetched, include_images);

        tracing::debug!(
            "Rendered {}: {} words, {} links",
            document.url,
            document.word_count,
            document.links.len()
        );

        Ok(document)
    }

    /// Fetches `url` and returns the raw backend output without rendering
    ///
    /// Used by extraction, which works on the HTML tree rather than markdown.
    pub async fn fetch_raw(&self, url: &str, cache_mode: CacheMode) -> Result<FetchedPage> {
        let requested = Url::parse(url.trim())
            .map_err(|e| ScribeError::fetch(url, format!("invalid URL: {}", e)))?;
        self.current_fetcher().await.fetch(&requested, cache_mode).await
    }
}

/// Renders an already-fetched page
///
/// Links are re-classified against `requested` so that a redirect to a
/// different host does not turn the requested site's links external.
pub fn render_fetched(requested: &Url, fetched: &FetchedPage, include_images: bool) -> RenderedDocument {
    let document = Html::parse_document(&fetched.raw_html);

    let title = extract_title(&document).unwrap_or_else(|| requested.to_string());
    let markdown = html_to_markdown(&content_html(&document));
    let word_count = count_words(&markdown);

    RenderedDocument {
        url: requested.to_string(),
        title,
        markdown,
        word_count,
        links: reclassify(requested, &fetched.links),
        media: include_images.then(|| fetched.media.clone()),
    }
}

/// Counts whitespace-separated tokens
pub fn count_words(markdown: &str) -> usize {
    markdown.split_whitespace().count()
}

/// Page title from `<title>`, falling back to the first `<h1>`
fn extract_title(document: &Html) -> Option<String> {
    ["title", "h1"].iter().find_map(|tag| {
        let selector = Selector::parse(tag).ok()?;
        document
            .select(&selector)
            .next()
            .map(|element| {
                element
                    .text()
                    .collect::<String>()
                    .split_whitespace()
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .filter(|s| !s.is_empty())
    })
}

/// Body HTML with non-content elements removed
fn content_html(document: &Html) -> String {
    let body_html = Selector::parse("body")
        .ok()
        .and_then(|selector| document.select(&selector).next().map(|b| b.inner_html()))
        .unwrap_or_else(|| document.root_element().html());

    let mut result = body_html;
    for tag in NON_CONTENT_TAGS {
        if let Ok(selector) = Selector::parse(tag) {
            for element in document.select(&selector) {
                result = result.replace(&element.html(), "");
            }
        }
    }

    result
}

/// Converts HTML to markdown, falling back to plain text
fn html_to_markdown(html: &str) -> String {
    let markdown = htmd::convert(html).unwrap_or_else(|e| {
        tracing::warn!("Markdown conversion failed, using plain text: {}", e);
        Html::parse_fragment(html)
            .root_element()
            .text()
            .collect::<Vec<_>>()
            .join(" ")
    });

    markdown.trim().to_string()
}

fn reclassify(requested: &Url, links: &LinkSet) -> LinkSet {
    let mut result = LinkSet::default();

    for link in links.internal.iter().chain(links.external.iter()) {
        let scope = Url::parse(&link.href)
            .map(|target| classify_link(requested, &target))
            .unwrap_or(LinkScope::External);

        match scope {
            LinkScope::Internal => result.internal.push(link.clone()),
            LinkScope::External => result.external.push(link.clone()),
        }
    }

    result
}
