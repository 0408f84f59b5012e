//! Schema extractor
//!
//! Interprets a [`FieldSchema`] against an HTML document at run time.
//! There is no fixed record type: each call produces an ordered map
//! from field name to a single string or a list of strings.
//!
//! # Scoping
//!
//! Field selectors are resolved inside the elements matched by the scope
//! selector. When the scope selector is empty the schema's
//! `base_selector` is used, and when that is absent too the whole
//! document is the scope. A field match counts once even when scope
//! elements are nested, and results follow document order.
//!
//! # Example
//!
//! ```
//! use sumi_scribe::extract::{extract, FieldDescriptor, FieldSchema};
//! use url::Url;
//!
//! let html = "<main><h1>Hello</h1><p>One</p><p>Two</p></main>";
//! let schema = FieldSchema::new(vec![
//!     FieldDescriptor::text("title", "h1"),
//!     FieldDescriptor::text("paragraphs", "p").multiple(),
//! ]);
//! let url = Url::parse("https://example.com/").unwrap();
//!
//! let data = extract(&url, html, Some(&schema), "main").unwrap();
//! assert_eq!(data["title"].as_single(), Some("Hello"));
//! assert_eq!(data["paragraphs"].as_multiple().unwrap().len(), 2);
//! ```

mod schema;

pub use schema::{ExtractionResult, FieldDescriptor, FieldSchema, FieldType, FieldValue};

use crate::fetcher::resolve_link;
use crate::{Result, ScribeError};
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Extracts a record from `html`
///
/// Without a schema, a default record `{title, content, links}` is built
/// from the scope. With a schema, every field appears in the result:
/// unmatched single fields are `""` and unmatched multiple fields are `[]`.
///
/// # Returns
///
/// * `Ok(ExtractionResult)` - Values for every field, in schema order
/// * `Err(ScribeError::Extraction)` - A selector failed to parse or the schema is invalid
pub fn extract(
    url: &Url,
    html: &str,
    schema: Option<&FieldSchema>,
    scope_selector: &str,
) -> Result<ExtractionResult> {
    let document = Html::parse_document(html);

    let scope_selector = match (scope_selector.trim(), schema) {
        ("", Some(schema)) => schema.base_selector.as_deref().unwrap_or("").trim(),
        (selector, _) => selector,
    };
    let scope = Scope::resolve(&document, scope_selector)?;

    match schema {
        Some(schema) => extract_with_schema(&document, &scope, schema),
        None => Ok(extract_default(&document, &scope, url)),
    }
}

/// The set of elements an extraction is confined to
enum Scope<'a> {
    Document,
    Elements(Vec<ElementRef<'a>>),
}

impl<'a> Scope<'a> {
    fn resolve(document: &'a Html, selector: &str) -> Result<Self> {
        if selector.is_empty() {
            return Ok(Self::Document);
        }

        let selector = parse_selector(selector)?;
        Ok(Self::Elements(document.select(&selector).collect()))
    }

    /// All elements matching `selector` that sit inside the scope, in document order
    fn select(&self, document: &'a Html, selector: &Selector) -> Vec<ElementRef<'a>> {
        match self {
            Self::Document => document.select(selector).collect(),
            Self::Elements(roots) => {
                let root_ids: HashSet<_> = roots.iter().map(|r| r.id()).collect();
                document
                    .select(selector)
                    .filter(|element| element.ancestors().any(|a| root_ids.contains(&a.id())))
                    .collect()
            }
        }
    }

    /// Whitespace-normalized text of the scope
    fn text(&self, document: &'a Html) -> String {
        match self {
            Self::Document => Selector::parse("body")
                .ok()
                .and_then(|body| document.select(&body).next())
                .map(|body| element_text(&body))
                .unwrap_or_else(|| element_text(&document.root_element())),
            Self::Elements(roots) => roots
                .iter()
                .map(element_text)
                .filter(|t| !t.is_empty())
                .collect::<Vec<_>>()
                .join("\n\n"),
        }
    }
}

fn extract_with_schema<'a>(
    document: &'a Html,
    scope: &Scope<'a>,
    schema: &FieldSchema,
) -> Result<ExtractionResult> {
    schema.validate()?;

    let mut result = ExtractionResult::new();

    for field in &schema.fields {
        let selector = parse_selector(&field.selector)?;

        let mut values = scope
            .select(document, &selector)
            .into_iter()
            .filter_map(|element| match field.field_type {
                FieldType::Text => Some(element_text(&element)),
                FieldType::Attribute => field
                    .attribute
                    .as_deref()
                    .and_then(|name| element.value().attr(name))
                    .map(str::to_string),
            });

        let value = if field.multiple {
            FieldValue::Multiple(values.collect())
        } else {
            FieldValue::Single(values.next().unwrap_or_default())
        };

        result.insert(field.name.clone(), value);
    }

    tracing::debug!(
        "Extracted {} fields{}",
        result.len(),
        schema
            .name
            .as_deref()
            .map(|n| format!(" for schema {}", n))
            .unwrap_or_default()
    );

    Ok(result)
}

/// Builds `{title, content, links}` from the scope
fn extract_default<'a>(document: &'a Html, scope: &Scope<'a>, url: &Url) -> ExtractionResult {
    let mut result = ExtractionResult::new();

    let title = Selector::parse("h1")
        .ok()
        .and_then(|h1| scope.select(document, &h1).into_iter().next())
        .map(|h1| element_text(&h1))
        .filter(|t| !t.is_empty())
        .or_else(|| {
            Selector::parse("title")
                .ok()
                .and_then(|t| document.select(&t).next())
                .map(|t| element_text(&t))
        })
        .unwrap_or_default();

    let links = Selector::parse("a[href]")
        .map(|a| {
            scope
                .select(document, &a)
                .into_iter()
                .filter_map(|el| el.value().attr("href"))
                .filter_map(|href| resolve_link(href, url))
                .map(|u| u.to_string())
                .collect()
        })
        .unwrap_or_default();

    result.insert("title".to_string(), FieldValue::Single(title));
    result.insert(
        "content".to_string(),
        FieldValue::Single(scope.text(document)),
    );
    result.insert("links".to_string(), FieldValue::Multiple(links));
    result
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector)
        .map_err(|e| ScribeError::Extraction(format!("invalid selector '{}': {}", selector, e)))
}

fn element_text(element: &ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
