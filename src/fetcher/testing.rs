//! In-memory fetch backend for unit tests

use crate::fetcher::parser::{extract_links, extract_media};
use crate::fetcher::{CacheMode, DocumentFetcher, FetchedPage};
use crate::{Result, ScribeError};
use async_trait::async_trait;
use scraper::Html;
use std::collections::HashMap;
use std::sync::Mutex;
use url::Url;

/// Serves fixed HTML per URL and records every request
#[derive(Default)]
pub(crate) struct StaticFetcher {
    pages: HashMap<String, String>,
    requests: Mutex<Vec<String>>,
}

impl StaticFetcher {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), html.to_string());
        self
    }

    /// URLs requested so far, in order
    pub(crate) fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl DocumentFetcher for StaticFetcher {
    async fn fetch(&self, url: &Url, _cache_mode: CacheMode) -> Result<FetchedPage> {
        self.requests.lock().unwrap().push(url.to_string());

        let raw_html = self
            .pages
            .get(url.as_str())
            .cloned()
            .ok_or_else(|| ScribeError::fetch(url.as_str(), "HTTP 404 Not Found"))?;

        let document = Html::parse_document(&raw_html);
        Ok(FetchedPage {
            links: extract_links(&document, url),
            media: extract_media(&document, url),
            url: url.clone(),
            raw_html,
        })
    }
}
