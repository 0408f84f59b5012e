//! Sumi-Scribe: a resilient web content acquisition engine
//!
//! This crate fetches pages, renders them to markdown, walks sites under
//! explicit depth and page budgets, extracts schema-driven records and
//! writes rendered documents to disk. Every public operation goes through
//! a fallback chain so callers always receive a well-formed envelope.

pub mod config;
pub mod crawler;
pub mod envelope;
pub mod extract;
pub mod fetcher;
pub mod output;
pub mod render;
pub mod resilience;
pub mod url;

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Sumi-Scribe operations
#[derive(Debug, Error)]
pub enum ScribeError {
    #[error("Fetch failed for {url}: {message}")]
    Fetch { url: String, message: String },

    #[error("Rendering dependency unavailable: {0}")]
    DependencyUnavailable(String),

    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),
}

impl ScribeError {
    /// Builds a fetch error for the given URL
    pub fn fetch(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Fetch {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Returns true if the error means the fetch machinery itself is missing
    pub fn is_dependency_unavailable(&self) -> bool {
        matches!(self, Self::DependencyUnavailable(_))
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,
}

/// Result type alias for Sumi-Scribe operations
pub type Result<T> = std::result::Result<T, ScribeError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlBudget, CrawlPage};
pub use envelope::{DegradationTier, ResponseEnvelope};
pub use extract::{FieldDescriptor, FieldSchema, FieldType, FieldValue};
pub use fetcher::{CacheMode, DocumentFetcher, HttpFetcher};
pub use render::RenderedDocument;
pub use resilience::Engine;
