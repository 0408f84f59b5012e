//! Response envelope
//!
//! Every public engine operation answers with a [`ResponseEnvelope`]: a
//! `success` flag, the operation payload flattened next to it, and the
//! optional `error` / `error_details` / `note` diagnostics.
//!
//! The [`DegradationTier`] records which stage of the resilience chain
//! produced the envelope. It is available to Rust callers but never
//! serialized, so the JSON shape is the same on every tier.

use crate::crawler::CrawlPage;
use crate::extract::ExtractionResult;
use crate::fetcher::{LinkSet, MediaRef};
use serde::{Deserialize, Serialize};

/// Which resilience stage produced a response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DegradationTier {
    /// Real fetch and render
    Primary,
    /// Fetch backend unavailable; synthetic payload with a `note`
    Degraded,
    /// Unexpected failure; error-derived payload with `error_details`
    Placeholder,
}

/// The canonical result shape of every operation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseEnvelope<T> {
    pub success: bool,

    #[serde(flatten)]
    pub payload: T,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_details: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,

    #[serde(skip)]
    pub tier: DegradationTier,
}

impl<T> ResponseEnvelope<T> {
    /// A full result from the primary path
    pub fn primary(payload: T) -> Self {
        Self {
            success: true,
            payload,
            error: None,
            error_details: None,
            note: None,
            tier: DegradationTier::Primary,
        }
    }

    /// A synthetic payload produced because the fetch backend is missing
    pub fn degraded(payload: T, note: impl Into<String>) -> Self {
        Self {
            note: Some(note.into()),
            tier: DegradationTier::Degraded,
            ..Self::primary(payload)
        }
    }

    /// An error-derived payload that still reports success
    pub fn placeholder(payload: T, error_details: impl Into<String>) -> Self {
        Self {
            error_details: Some(error_details.into()),
            tier: DegradationTier::Placeholder,
            ..Self::primary(payload)
        }
    }

    /// The one envelope that reports `success=false`
    pub fn failure(payload: T, error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            tier: DegradationTier::Placeholder,
            ..Self::primary(payload)
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// Payload of fetch-page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchPagePayload {
    pub url: String,
    pub markdown: String,
    pub title: String,
    pub word_count: usize,
    pub links: LinkSet,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<MediaRef>>,
}

/// Payload of crawl-site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrawlSitePayload {
    pub base_url: String,
    pub pages: Vec<CrawlPage>,
    pub pages_crawled: usize,
    pub max_depth_reached: u32,
}

/// Payload of extract-structured
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractPayload {
    pub url: String,
    /// The scope selector the caller supplied
    pub selector: String,
    pub data: ExtractionResult,
}

/// Payload of save-as-markdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavePayload {
    pub url: String,
    /// Path of the written file as it was finally resolved
    pub filename: String,
    pub word_count: usize,
    pub include_images: bool,
}
