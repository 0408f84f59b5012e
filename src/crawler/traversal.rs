//! Breadth-first traversal under a crawl budget
//!
//! # Algorithm
//!
//! 1. Seed a FIFO frontier with `(seed, depth 0)`
//! 2. Pop the next entry; stop once `max_pages` URLs have been visited
//! 3. Render the page and record it (or record the failure)
//! 4. If `depth < max_depth`, enqueue the page's internal links at
//!    `depth + 1`, in document order, skipping anything already visited
//!    or queued
//!
//! Pages are fetched at the URL they were discovered under. The
//! normalized form is only the deduplication key, so `/docs/` and
//! `/docs` count as one page while the server still sees the exact path.
//!
//! Termination is guaranteed: every iteration visits a new URL and the
//! visited set is capped at `max_pages`.

use crate::crawler::{CrawlBudget, CrawlFailure, CrawlOutcome, CrawlPage};
use crate::fetcher::CacheMode;
use crate::render::PageRenderer;
use crate::url::normalize_url;
use crate::{Result, ScribeError, UrlError};
use std::collections::{HashSet, VecDeque};
use url::Url;

/// A single bounded crawl from one seed URL
pub struct Traversal<'r> {
    renderer: &'r PageRenderer,
    budget: CrawlBudget,
    include_images: bool,
}

impl<'r> Traversal<'r> {
    pub fn new(renderer: &'r PageRenderer, budget: CrawlBudget) -> Self {
        Self {
            renderer,
            budget,
            include_images: false,
        }
    }

    /// Carries image references on every crawled page
    pub fn include_images(mut self, include_images: bool) -> Self {
        self.include_images = include_images;
        self
    }

    /// Runs the traversal to completion or budget exhaustion
    ///
    /// A failed page render is recorded in `CrawlOutcome::failures` and the
    /// traversal moves on. An invalid seed URL aborts the run. A fetch
    /// backend reporting `DependencyUnavailable` stops it: the error is
    /// returned when nothing was rendered yet, otherwise the pages rendered
    /// so far are returned with `CrawlOutcome::interrupted` set.
    pub async fn run(&self, seed_url: &str) -> Result<CrawlOutcome> {
        let seed_key = normalize_url(seed_url)?.to_string();
        let mut seed = Url::parse(seed_url.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;
        seed.set_fragment(None);

        let mut frontier: VecDeque<(Url, u32)> = VecDeque::from([(seed, 0)]);
        let mut queued: HashSet<String> = HashSet::from([seed_key]);
        let mut visited = 0usize;
        let mut outcome = CrawlOutcome::default();

        tracing::info!(
            "Starting traversal of {} (max depth {}, max pages {})",
            seed_url,
            self.budget.max_depth,
            self.budget.max_pages
        );

        while let Some((url, depth)) = frontier.pop_front() {
            if visited >= self.budget.max_pages as usize {
                tracing::debug!(
                    "Page budget exhausted with {} URLs left in frontier",
                    frontier.len() + 1
                );
                break;
            }

            visited += 1;

            let document = match self
                .renderer
                .render(url.as_str(), self.include_images, CacheMode::Default)
                .await
            {
                Ok(document) => document,
                Err(e @ ScribeError::DependencyUnavailable(_)) => {
                    if outcome.pages.is_empty() {
                        return Err(e);
                    }
                    tracing::warn!(
                        "Fetch backend lost at {}, keeping {} rendered pages: {}",
                        url,
                        outcome.pages.len(),
                        e
                    );
                    outcome.interrupted = Some(e.to_string());
                    break;
                }
                Err(e) => {
                    tracing::warn!("Failed to render {} at depth {}: {}", url, depth, e);
                    outcome.failures.push(CrawlFailure {
                        url: url.to_string(),
                        depth,
                        error: e.to_string(),
                    });
                    continue;
                }
            };

            if depth < self.budget.max_depth {
                for link in &document.links.internal {
                    let Ok(key) = normalize_url(&link.href) else {
                        tracing::debug!("Skipping unnormalizable link {}", link.href);
                        continue;
                    };
                    let Ok(mut next) = Url::parse(&link.href) else {
                        continue;
                    };
                    next.set_fragment(None);

                    if queued.insert(key.to_string()) {
                        frontier.push_back((next, depth + 1));
                    }
                }
            }

            outcome.max_depth_reached = outcome.max_depth_reached.max(depth);
            outcome.pages.push(CrawlPage::from_document(document, depth));

            tracing::debug!(
                "Visited {} at depth {} ({} rendered, {} queued)",
                url,
                depth,
                outcome.pages.len(),
                frontier.len()
            );
        }

        tracing::info!(
            "Traversal complete: {} pages rendered, {} failed, max depth {}",
            outcome.pages.len(),
            outcome.failures.len(),
            outcome.max_depth_reached
        );

        Ok(outcome)
    }
}
