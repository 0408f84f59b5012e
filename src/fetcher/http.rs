//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the engine, including:
//! - Building HTTP clients with the configured user agent and timeouts
//! - GET requests with cache directives
//! - Content-Type checks (only HTML is rendered)
//! - Error classification into `ScribeError::Fetch`

use crate::config::FetcherConfig;
use crate::fetcher::parser::{extract_links, extract_media};
use crate::fetcher::{CacheMode, DocumentFetcher, FetchedPage};
use crate::{Result, ScribeError};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CACHE_CONTROL, CONTENT_TYPE, PRAGMA};
use reqwest::{redirect::Policy, Client};
use scraper::Html;
use std::time::Duration;
use url::Url;

/// Maximum number of redirects followed for one request
const MAX_REDIRECTS: usize = 10;

/// Content types that are handed to the renderer
const HTML_CONTENT_TYPES: &[&str] = &["text/html", "application/xhtml+xml"];

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use sumi_scribe::config::FetcherConfig;
/// use sumi_scribe::fetcher::build_http_client;
///
/// let client = build_http_client(&FetcherConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &FetcherConfig) -> std::result::Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml;q=0.9,*/*;q=0.5"),
    );

    Client::builder()
        .user_agent(config.user_agent.as_str())
        .default_headers(headers)
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetch backend that talks HTTP directly
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Creates a fetcher from configuration
    ///
    /// # Returns
    ///
    /// * `Ok(HttpFetcher)` - Client built successfully
    /// * `Err(ScribeError::DependencyUnavailable)` - The HTTP stack could not be initialized
    pub fn new(config: &FetcherConfig) -> Result<Self> {
        let client = build_http_client(config)
            .map_err(|e| ScribeError::DependencyUnavailable(format!("HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl DocumentFetcher for HttpFetcher {
    /// Fetches a URL and extracts its links and images
    ///
    /// # Error Mapping
    ///
    /// | Condition | Result |
    /// |-----------|--------|
    /// | Non-2xx status | `Fetch` with the status code |
    /// | Non-HTML Content-Type | `Fetch` naming the content type |
    /// | Timeout | `Fetch` ("request timed out") |
    /// | Connection failure | `Fetch` ("connection failed") |
    /// | Body read failure | `Fetch` |
    async fn fetch(&self, url: &Url, cache_mode: CacheMode) -> Result<FetchedPage> {
        let mut request = self.client.get(url.clone());
        if cache_mode.skips_cache() {
            request = request
                .header(CACHE_CONTROL, "no-cache")
                .header(PRAGMA, "no-cache");
        }

        let response = request.send().await.map_err(|e| classify_error(url, &e))?;

        let status = response.status();
        let final_url = response.url().clone();

        if !status.is_success() {
            return Err(ScribeError::fetch(url.as_str(), format!("HTTP {}", status)));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_ascii_lowercase();

        if !content_type.is_empty() && !HTML_CONTENT_TYPES.iter().any(|t| content_type.contains(t))
        {
            return Err(ScribeError::fetch(
                url.as_str(),
                format!("Expected HTML, got {}", content_type),
            ));
        }

        let raw_html = response
            .text()
            .await
            .map_err(|e| classify_error(url, &e))?;

        tracing::debug!(
            "Fetched {} ({} bytes, final URL {})",
            url,
            raw_html.len(),
            final_url
        );

        let document = Html::parse_document(&raw_html);
        let links = extract_links(&document, &final_url);
        let media = extract_media(&document, &final_url);

        Ok(FetchedPage {
            url: final_url,
            raw_html,
            links,
            media,
        })
    }
}

/// Maps a reqwest error onto a fetch error with a stable message
fn classify_error(url: &Url, error: &reqwest::Error) -> ScribeError {
    let message = if error.is_timeout() {
        "request timed out".to_string()
    } else if error.is_connect() {
        "connection failed".to_string()
    } else if error.is_redirect() {
        format!("too many redirects (limit {})", MAX_REDIRECTS)
    } else {
        error.to_string()
    };

    ScribeError::fetch(url.as_str(), message)
}
