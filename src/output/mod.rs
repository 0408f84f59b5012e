//! Persistence writer
//!
//! This module handles:
//! - Normalizing save filenames to a `.md` extension
//! - Resolving them against the configured output directory
//! - Writing rendered markdown, or a placeholder banner when rendering failed

use crate::config::OutputConfig;
use crate::render::count_words;
use crate::{Result, ScribeError};
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};

/// A file the writer produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedFile {
    /// Where the file was finally written
    pub path: PathBuf,
    /// Words in the written body
    pub word_count: usize,
}

impl SavedFile {
    /// The path as reported to callers
    pub fn filename(&self) -> String {
        self.path.display().to_string()
    }
}

/// Writes markdown documents to disk
#[derive(Debug, Clone, Default)]
pub struct MarkdownWriter {
    directory: Option<PathBuf>,
}

impl MarkdownWriter {
    pub fn new(config: &OutputConfig) -> Self {
        Self {
            directory: config
                .directory
                .as_deref()
                .filter(|d| !d.trim().is_empty())
                .map(PathBuf::from),
        }
    }

    /// Writes `body` to the file named by `filename`
    ///
    /// # Arguments
    ///
    /// * `body` - Markdown text, or a JSON object carrying `raw_markdown`
    /// * `filename` - Target name; `.md` is appended when missing
    ///
    /// # Returns
    ///
    /// * `Ok(SavedFile)` - The body was written
    /// * `Err(ScribeError::Write)` - The final write attempt failed
    pub async fn save(&self, body: &serde_json::Value, filename: &str) -> Result<SavedFile> {
        let text = body_text(body);
        self.write(&text, filename).await
    }

    /// Writes a placeholder document explaining why real content is missing
    pub async fn save_placeholder(
        &self,
        url: &str,
        filename: &str,
        reason: &str,
    ) -> Result<SavedFile> {
        let text = placeholder_markdown(url, reason, Local::now());
        self.write(&text, filename).await
    }

    async fn write(&self, text: &str, filename: &str) -> Result<SavedFile> {
        let requested = self.target_path(filename);
        let path = prepare_target(&requested).await;

        tokio::fs::write(&path, text)
            .await
            .map_err(|source| ScribeError::Write {
                path: path.clone(),
                source,
            })?;

        tracing::info!("Wrote {} ({} bytes)", path.display(), text.len());

        Ok(SavedFile {
            path,
            word_count: count_words(text),
        })
    }

    fn target_path(&self, filename: &str) -> PathBuf {
        let name = PathBuf::from(markdown_filename(filename));
        match &self.directory {
            Some(directory) if name.is_relative() => directory.join(name),
            _ => name,
        }
    }
}

/// Appends `.md` unless the name already ends with it (any case)
pub fn markdown_filename(filename: &str) -> String {
    let filename = filename.trim();
    if filename.to_lowercase().ends_with(".md") {
        filename.to_string()
    } else {
        format!("{}.md", filename)
    }
}

/// The markdown text of a document body
///
/// Plain strings are used as-is. Objects carrying a string `raw_markdown`
/// are unwrapped. Anything else is written as its JSON text.
pub fn body_text(body: &serde_json::Value) -> String {
    match body {
        serde_json::Value::String(text) => text.clone(),
        serde_json::Value::Object(map) => match map.get("raw_markdown") {
            Some(serde_json::Value::String(text)) => text.clone(),
            _ => body.to_string(),
        },
        other => other.to_string(),
    }
}

/// Banner document written in place of real content
pub fn placeholder_markdown(url: &str, reason: &str, generated_at: DateTime<Local>) -> String {
    format!(
        "# Content from {url}\n\n\
         *Generated {}*\n\n\
         **Note:** this file is an automatically generated placeholder; \
         the page could not be rendered.\n\n\
         ## Error\n\n```\n{reason}\n```\n",
        generated_at.format("%Y-%m-%d %H:%M:%S")
    )
}

/// Makes sure the parent directory of `path` exists
///
/// When the directory cannot be created the file falls back to its base
/// name in the current working directory.
async fn prepare_target(path: &Path) -> PathBuf {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => return path.to_path_buf(),
    };

    if tokio::fs::metadata(parent).await.is_ok_and(|m| m.is_dir()) {
        return path.to_path_buf();
    }

    match tokio::fs::create_dir_all(parent).await {
        Ok(()) => {
            tracing::info!("Created directory {}", parent.display());
            path.to_path_buf()
        }
        Err(e) => {
            let fallback = path
                .file_name()
                .map(PathBuf::from)
                .unwrap_or_else(|| path.to_path_buf());
            tracing::warn!(
                "Failed to create {}: {}; writing {} in the current directory",
                parent.display(),
                e,
                fallback.display()
            );
            fallback
        }
    }
}
