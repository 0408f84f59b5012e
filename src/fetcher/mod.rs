//! Document fetcher boundary
//!
//! This module defines the seam between the engine and whatever actually
//! retrieves pages:
//! - The `DocumentFetcher` trait that every fetch backend implements
//! - The HTTP backend built on reqwest
//! - HTML link and media extraction shared by fetch backends
//! - A stand-in backend for when no fetch machinery could be initialized

mod http;
mod parser;
#[cfg(test)]
pub(crate) mod testing;

pub use http::{build_http_client, HttpFetcher};
pub use parser::{extract_links, extract_media, resolve_link};

use crate::{Result, ScribeError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

/// Cache directive passed through to the fetch backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheMode {
    /// Let intermediaries serve cached copies
    #[default]
    Default,
    /// Ask every cache on the path for a fresh copy
    Bypass,
    /// Refetch unconditionally; over HTTP this sends the same directives as `Bypass`
    Force,
}

impl CacheMode {
    /// Maps the boolean `bypass_cache` flag used by callers
    pub fn from_bypass(bypass: bool) -> Self {
        if bypass {
            Self::Bypass
        } else {
            Self::Default
        }
    }

    /// Returns true if caches on the path must not answer
    pub fn skips_cache(&self) -> bool {
        matches!(self, Self::Bypass | Self::Force)
    }
}

impl FromStr for CacheMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "default" => Ok(Self::Default),
            "bypass" => Ok(Self::Bypass),
            "force" => Ok(Self::Force),
            other => Err(format!(
                "unknown cache mode '{}', expected default, bypass or force",
                other
            )),
        }
    }
}

impl fmt::Display for CacheMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => write!(f, "DEFAULT"),
            Self::Bypass => write!(f, "BYPASS"),
            Self::Force => write!(f, "FORCE"),
        }
    }
}

/// A hyperlink found on a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Absolute target URL
    pub href: String,
    /// Visible anchor text, whitespace-collapsed
    pub text: String,
}

/// An image reference found on a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaRef {
    /// Absolute image URL
    pub src: String,
    /// Alternative text (empty when the page gives none)
    pub alt: String,
}

/// Links on a page split by whether they stay on the page's site
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkSet {
    pub internal: Vec<Link>,
    pub external: Vec<Link>,
}

impl LinkSet {
    /// Total number of links in both sets
    pub fn len(&self) -> usize {
        self.internal.len() + self.external.len()
    }

    /// Returns true if there are no links at all
    pub fn is_empty(&self) -> bool {
        self.internal.is_empty() && self.external.is_empty()
    }
}

/// Raw output of a fetch backend for one URL
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub url: Url,
    /// Response body
    pub raw_html: String,
    /// Resolved links, classified against the final URL
    pub links: LinkSet,
    /// Resolved image references
    pub media: Vec<MediaRef>,
}

/// A backend capable of retrieving a page
///
/// Implementations return `ScribeError::Fetch` when a particular URL
/// cannot be retrieved and `ScribeError::DependencyUnavailable` when the
/// backend itself is not usable at all.
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    /// Fetches a single URL
    async fn fetch(&self, url: &Url, cache_mode: CacheMode) -> Result<FetchedPage>;
}

/// Fetch backend used when no real backend could be initialized
///
/// Every call reports `DependencyUnavailable`, which routes operations
/// to the degraded tier of the resilience chain.
#[derive(Debug, Clone)]
pub struct UnavailableFetcher {
    reason: String,
}

impl UnavailableFetcher {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl DocumentFetcher for UnavailableFetcher {
    async fn fetch(&self, _url: &Url, _cache_mode: CacheMode) -> Result<FetchedPage> {
        Err(ScribeError::DependencyUnavailable(self.reason.clone()))
    }
}
