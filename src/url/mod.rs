//! URL handling module for Sumi-Scribe
//!
//! This module provides URL normalization, domain extraction, and the
//! internal/external classification used by the renderer and traversal.

mod domain;
mod normalize;

use ::url::Url;

// Re-export main functions
pub use domain::{extract_domain, registrable_domain};
pub use normalize::normalize_url;

/// Where a link points relative to the page it was found on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkScope {
    /// Same registrable domain as the page
    Internal,
    /// Any other host
    External,
}

/// Classifies `target` against the page URL `base`
///
/// Two URLs are internal to each other when their hosts share a
/// registrable domain, so `blog.example.com` and `www.example.com` are
/// both internal to `example.com`. Hosts that cannot be determined are
/// treated as external.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sumi_scribe::url::{classify_link, LinkScope};
///
/// let base = Url::parse("https://www.example.com/").unwrap();
/// let blog = Url::parse("https://blog.example.com/post").unwrap();
/// let other = Url::parse("https://other.org/").unwrap();
///
/// assert_eq!(classify_link(&base, &blog), LinkScope::Internal);
/// assert_eq!(classify_link(&base, &other), LinkScope::External);
/// ```
pub fn classify_link(base: &Url, target: &Url) -> LinkScope {
    let base_domain = extract_domain(base).map(|d| registrable_domain(&d));
    let target_domain = extract_domain(target).map(|d| registrable_domain(&d));

    match (base_domain, target_domain) {
        (Some(a), Some(b)) if a == b => LinkScope::Internal,
        _ => LinkScope::External,
    }
}
