//! Crawler module for bounded site traversal
//!
//! This module contains the multi-page crawling logic, including:
//! - The depth and page-count budget
//! - The per-page records a traversal produces
//! - The breadth-first traversal loop itself

mod traversal;

pub use traversal::Traversal;

use crate::fetcher::MediaRef;
use crate::render::RenderedDocument;
use crate::ConfigError;
use serde::{Deserialize, Serialize};

/// Limits on how far and how wide a traversal may go
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlBudget {
    /// Maximum link depth from the seed (0 = seed page only)
    pub max_depth: u32,
    /// Maximum number of pages rendered (always at least 1)
    pub max_pages: u32,
}

impl CrawlBudget {
    /// Creates a budget, rejecting a zero page limit
    pub fn new(max_depth: u32, max_pages: u32) -> Result<Self, ConfigError> {
        if max_pages == 0 {
            return Err(ConfigError::Validation(
                "max_pages must be >= 1, got 0".to_string(),
            ));
        }

        Ok(Self {
            max_depth,
            max_pages,
        })
    }

    /// Creates a budget, raising a zero page limit to 1
    pub fn clamped(max_depth: u32, max_pages: u32) -> Self {
        Self {
            max_depth,
            max_pages: max_pages.max(1),
        }
    }
}

/// One rendered page of a traversal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrawlPage {
    pub url: String,
    pub title: String,
    pub markdown: String,
    pub word_count: usize,
    /// Hops from the seed page, assigned when the URL was discovered
    pub depth: u32,
    #[serde(rename = "images", default, skip_serializing_if = "Option::is_none")]
    pub media: Option<Vec<MediaRef>>,
}

impl CrawlPage {
    pub fn from_document(document: RenderedDocument, depth: u32) -> Self {
        Self {
            url: document.url,
            title: document.title,
            markdown: document.markdown,
            word_count: document.word_count,
            depth,
            media: document.media,
        }
    }
}

/// A page that could not be rendered during a traversal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlFailure {
    pub url: String,
    pub depth: u32,
    pub error: String,
}

/// Everything a traversal produced
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrawlOutcome {
    /// Rendered pages in the order they were visited
    pub pages: Vec<CrawlPage>,
    /// Pages whose render failed; they still consumed budget
    pub failures: Vec<CrawlFailure>,
    /// Deepest depth among rendered pages (0 when nothing rendered)
    pub max_depth_reached: u32,
    /// Set when the fetch backend disappeared after some pages rendered
    pub interrupted: Option<String>,
}

impl CrawlOutcome {
    pub fn pages_crawled(&self) -> usize {
        self.pages.len()
    }
}
