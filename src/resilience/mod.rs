//! Resilience chain and the public engine
//!
//! [`Engine`] exposes the four operations. Each one runs inside its own
//! `tracing` span and goes through the same fallback pipeline:
//!
//! - **Primary**: real fetch and render, plus extraction, traversal or
//!   file write
//! - **Degraded**: the fetch backend reported `DependencyUnavailable`;
//!   a synthetic payload of the same shape with a `note`
//! - **Placeholder**: any other failure; an error-derived payload with
//!   `error_details`
//!
//! Every envelope reports `success=true` except a save whose placeholder
//! file could not be written either.

mod bootstrap;
mod chain;
mod placeholder;

pub use bootstrap::Bootstrap;

use crate::config::Config;
use crate::crawler::{CrawlBudget, Traversal};
use crate::envelope::{
    CrawlSitePayload, ExtractPayload, FetchPagePayload, ResponseEnvelope, SavePayload,
};
use crate::extract::{extract, FieldSchema};
use crate::fetcher::{CacheMode, DocumentFetcher, HttpFetcher, UnavailableFetcher};
use crate::output::{markdown_filename, MarkdownWriter};
use crate::render::PageRenderer;
use crate::{Result, ScribeError};
use bootstrap::BootstrapOnce;
use chain::run_chain;
use placeholder::{error_detail, UNAVAILABLE_DETAIL};
use std::sync::Arc;
use tracing::Instrument;

fn degraded_note(error: &ScribeError) -> String {
    format!(
        "Degraded response with placeholder content; fetch backend unavailable ({})",
        error
    )
}

/// The only unsuccessful envelope: neither the page nor a placeholder was written
fn save_failure(
    url: &str,
    filename: &str,
    include_images: bool,
    cause: &ScribeError,
    write_err: &ScribeError,
) -> ResponseEnvelope<SavePayload> {
    tracing::error!("Placeholder file could not be written: {}", write_err);
    ResponseEnvelope::failure(
        SavePayload {
            url: url.to_string(),
            filename: markdown_filename(filename),
            word_count: 0,
            include_images,
        },
        format!(
            "Failed to save {} as markdown: {}; placeholder file could not be written: {}",
            url, cause, write_err
        ),
    )
}

/// Content acquisition engine
pub struct Engine {
    config: Config,
    renderer: PageRenderer,
    writer: MarkdownWriter,
    bootstrap: BootstrapOnce,
}

impl Engine {
    /// Creates an engine backed by the HTTP fetcher
    ///
    /// If the HTTP client cannot be built the engine still starts; every
    /// operation then answers from the degraded tier.
    pub fn new(config: Config) -> Self {
        let fetcher: Arc<dyn DocumentFetcher> = match HttpFetcher::new(&config.fetcher) {
            Ok(fetcher) => Arc::new(fetcher),
            Err(e) => {
                tracing::warn!("HTTP fetcher unavailable, operations will degrade: {}", e);
                Arc::new(UnavailableFetcher::new(e.to_string()))
            }
        };

        Self::with_fetcher(config, fetcher)
    }

    /// Creates an engine around any fetch backend
    pub fn with_fetcher(config: Config, fetcher: Arc<dyn DocumentFetcher>) -> Self {
        Self {
            writer: MarkdownWriter::new(&config.output),
            renderer: PageRenderer::new(fetcher),
            bootstrap: BootstrapOnce::new(None),
            config,
        }
    }

    /// Installs the collaborator tried once when the backend is missing
    pub fn with_bootstrap(mut self, bootstrap: Arc<dyn Bootstrap>) -> Self {
        self.bootstrap = BootstrapOnce::new(Some(bootstrap));
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Fetches one page and renders it to markdown
    pub async fn fetch_page(
        &self,
        url: &str,
        include_images: bool,
        cache_mode: CacheMode,
    ) -> ResponseEnvelope<FetchPagePayload> {
        let span = tracing::info_span!("fetch_page", url = %url, cache_mode = %cache_mode);

        run_chain(
            self.fetch_page_primary(url, include_images, cache_mode),
            move |err| async move {
                self.bootstrap.attempt(&self.renderer);
                Ok(ResponseEnvelope::degraded(
                    placeholder::fetch_page(url, include_images, cache_mode, UNAVAILABLE_DETAIL),
                    degraded_note(&err),
                ))
            },
            move |err| async move {
                let detail = error_detail(&err.to_string());
                ResponseEnvelope::placeholder(
                    placeholder::fetch_page(url, include_images, cache_mode, &detail),
                    err.to_string(),
                )
            },
        )
        .instrument(span)
        .await
    }

    async fn fetch_page_primary(
        &self,
        url: &str,
        include_images: bool,
        cache_mode: CacheMode,
    ) -> Result<ResponseEnvelope<FetchPagePayload>> {
        let document = self.renderer.render(url, include_images, cache_mode).await?;

        tracing::info!(
            "Fetched {}: {} words, {} links",
            document.url,
            document.word_count,
            document.links.len()
        );

        Ok(ResponseEnvelope::primary(FetchPagePayload {
            url: document.url,
            markdown: document.markdown,
            title: document.title,
            word_count: document.word_count,
            links: document.links,
            images: document.media,
        }))
    }

    /// Walks a site breadth-first from `url` under the given budget
    ///
    /// A `max_pages` of 0 is raised to 1.
    pub async fn crawl_site(
        &self,
        url: &str,
        max_depth: u32,
        max_pages: u32,
        include_images: bool,
    ) -> ResponseEnvelope<CrawlSitePayload> {
        let span = tracing::info_span!("crawl_site", url = %url, max_depth, max_pages);

        if max_pages == 0 {
            tracing::warn!(parent: &span, "max_pages of 0 raised to 1");
        }
        let budget = CrawlBudget::clamped(max_depth, max_pages);

        run_chain(
            self.crawl_site_primary(url, budget, include_images),
            move |err| async move {
                self.bootstrap.attempt(&self.renderer);
                Ok(ResponseEnvelope::degraded(
                    placeholder::crawl_site(url, include_images, UNAVAILABLE_DETAIL),
                    degraded_note(&err),
                ))
            },
            move |err| async move {
                let detail = error_detail(&err.to_string());
                ResponseEnvelope::placeholder(
                    placeholder::crawl_site(url, include_images, &detail),
                    err.to_string(),
                )
            },
        )
        .instrument(span)
        .await
    }

    async fn crawl_site_primary(
        &self,
        url: &str,
        budget: CrawlBudget,
        include_images: bool,
    ) -> Result<ResponseEnvelope<CrawlSitePayload>> {
        let outcome = Traversal::new(&self.renderer, budget)
            .include_images(include_images)
            .run(url)
            .await?;

        // The seed is always visited first, so nothing rendered means it failed
        if outcome.pages.is_empty() {
            if let Some(failure) = outcome.failures.first() {
                return Err(ScribeError::fetch(
                    url,
                    format!("seed page could not be rendered: {}", failure.error),
                ));
            }
        }

        let envelope = ResponseEnvelope::primary(CrawlSitePayload {
            base_url: url.to_string(),
            pages_crawled: outcome.pages_crawled(),
            max_depth_reached: outcome.max_depth_reached,
            pages: outcome.pages,
        });

        Ok(match outcome.interrupted {
            Some(reason) => {
                self.bootstrap.attempt(&self.renderer);
                envelope.with_note(format!(
                    "Crawl stopped early with partial results; fetch backend unavailable ({})",
                    reason
                ))
            }
            None => envelope,
        })
    }

    /// Extracts a structured record from one page
    ///
    /// # Arguments
    ///
    /// * `url` - Page to fetch
    /// * `schema` - Field descriptors; `None` yields `{title, content, links}`
    /// * `selector` - CSS scope; empty means the schema's base selector or the whole page
    pub async fn extract_structured(
        &self,
        url: &str,
        schema: Option<&FieldSchema>,
        selector: &str,
    ) -> ResponseEnvelope<ExtractPayload> {
        let span = tracing::info_span!("extract_structured", url = %url, selector = %selector);

        run_chain(
            self.extract_primary(url, schema, selector),
            move |err| async move {
                self.bootstrap.attempt(&self.renderer);
                Ok(ResponseEnvelope::degraded(
                    placeholder::extract(url, selector, schema, UNAVAILABLE_DETAIL),
                    degraded_note(&err),
                ))
            },
            move |err| async move {
                let detail = error_detail(&err.to_string());
                ResponseEnvelope::placeholder(
                    placeholder::extract(url, selector, schema, &detail),
                    err.to_string(),
                )
            },
        )
        .instrument(span)
        .await
    }

    async fn extract_primary(
        &self,
        url: &str,
        schema: Option<&FieldSchema>,
        selector: &str,
    ) -> Result<ResponseEnvelope<ExtractPayload>> {
        if let Some(schema) = schema {
            schema.validate()?;
        }

        let page = self.renderer.fetch_raw(url, CacheMode::Default).await?;
        let data = extract(&page.url, &page.raw_html, schema, selector)?;

        tracing::info!("Extracted {} fields from {}", data.len(), page.url);

        Ok(ResponseEnvelope::primary(ExtractPayload {
            url: url.to_string(),
            selector: selector.to_string(),
            data,
        }))
    }

    /// Renders a page and writes its markdown to `filename`
    ///
    /// When rendering fails a placeholder file is written instead. Only
    /// when that write fails as well does the envelope report
    /// `success=false`.
    pub async fn save_as_markdown(
        &self,
        url: &str,
        filename: &str,
        include_images: bool,
    ) -> ResponseEnvelope<SavePayload> {
        let span = tracing::info_span!("save_as_markdown", url = %url, filename = %filename);

        run_chain(
            self.save_primary(url, filename, include_images),
            move |err| async move {
                self.bootstrap.attempt(&self.renderer);
                // A failed write ends the chain here
                let envelope = match self
                    .writer
                    .save_placeholder(url, filename, &err.to_string())
                    .await
                {
                    Ok(saved) => ResponseEnvelope::degraded(
                        SavePayload {
                            url: url.to_string(),
                            filename: saved.filename(),
                            word_count: saved.word_count,
                            include_images,
                        },
                        degraded_note(&err),
                    ),
                    Err(write_err) => save_failure(url, filename, include_images, &err, &write_err),
                };
                Ok(envelope)
            },
            move |err| async move {
                match self
                    .writer
                    .save_placeholder(url, filename, &err.to_string())
                    .await
                {
                    Ok(saved) => ResponseEnvelope::placeholder(
                        SavePayload {
                            url: url.to_string(),
                            filename: saved.filename(),
                            word_count: saved.word_count,
                            include_images,
                        },
                        err.to_string(),
                    )
                    .with_note("Placeholder file written because the page could not be saved"),
                    Err(write_err) => {
                        save_failure(url, filename, include_images, &err, &write_err)
                    }
                }
            },
        )
        .instrument(span)
        .await
    }

    async fn save_primary(
        &self,
        url: &str,
        filename: &str,
        include_images: bool,
    ) -> Result<ResponseEnvelope<SavePayload>> {
        let document = self
            .renderer
            .render(url, include_images, CacheMode::Default)
            .await?;

        let saved = self
            .writer
            .save(&serde_json::Value::String(document.markdown), filename)
            .await?;

        tracing::info!("Saved {} to {}", url, saved.path.display());

        Ok(ResponseEnvelope::primary(SavePayload {
            url: url.to_string(),
            filename: saved.filename(),
            word_count: document.word_count,
            include_images,
        }))
    }
}
