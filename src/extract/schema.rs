use crate::{Result, ScribeError};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// How a field turns a matched element into a value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Whitespace-normalized text content
    #[default]
    #[serde(alias = "TEXT")]
    Text,
    /// Value of a named attribute
    #[serde(alias = "ATTRIBUTE")]
    Attribute,
}

/// One named field of a schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Key of this field in the extraction result
    pub name: String,

    /// CSS selector, resolved inside the extraction scope
    pub selector: String,

    #[serde(rename = "type", default)]
    pub field_type: FieldType,

    /// Attribute to read; required for `FieldType::Attribute` only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,

    /// Collect every match instead of the first one
    #[serde(default)]
    pub multiple: bool,
}

impl FieldDescriptor {
    /// A single-valued text field
    pub fn text(name: impl Into<String>, selector: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            selector: selector.into(),
            field_type: FieldType::Text,
            attribute: None,
            multiple: false,
        }
    }

    /// A single-valued attribute field
    pub fn attribute(
        name: impl Into<String>,
        selector: impl Into<String>,
        attribute: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            selector: selector.into(),
            field_type: FieldType::Attribute,
            attribute: Some(attribute.into()),
            multiple: false,
        }
    }

    /// Switches the field to collect every match
    pub fn multiple(mut self) -> Self {
        self.multiple = true;
        self
    }
}

/// A declarative description of the record to extract
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSchema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Scope used when the caller passes an empty scope selector
    #[serde(
        rename = "baseSelector",
        alias = "base_selector",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub base_selector: Option<String>,

    pub fields: Vec<FieldDescriptor>,
}

impl FieldSchema {
    pub fn new(fields: Vec<FieldDescriptor>) -> Self {
        Self {
            name: None,
            base_selector: None,
            fields,
        }
    }

    /// Interprets a JSON value as a schema and validates it
    ///
    /// Malformed JSON shapes surface as `ScribeError::Extraction`, the same
    /// as any other schema problem.
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        let schema: Self = serde_json::from_value(value)
            .map_err(|e| ScribeError::Extraction(format!("invalid schema: {}", e)))?;
        schema.validate()?;
        Ok(schema)
    }

    /// Checks the schema invariants
    ///
    /// - every field name is non-empty and unique
    /// - every selector is non-empty
    /// - `attribute` is set exactly when the field type is `Attribute`
    pub fn validate(&self) -> Result<()> {
        let mut names = HashSet::new();

        for field in &self.fields {
            if field.name.trim().is_empty() {
                return Err(ScribeError::Extraction(
                    "field name cannot be empty".to_string(),
                ));
            }

            if !names.insert(field.name.as_str()) {
                return Err(ScribeError::Extraction(format!(
                    "duplicate field name '{}'",
                    field.name
                )));
            }

            if field.selector.trim().is_empty() {
                return Err(ScribeError::Extraction(format!(
                    "field '{}' has an empty selector",
                    field.name
                )));
            }

            let has_attribute = field
                .attribute
                .as_deref()
                .is_some_and(|a| !a.trim().is_empty());

            match (field.field_type, has_attribute) {
                (FieldType::Attribute, false) => {
                    return Err(ScribeError::Extraction(format!(
                        "field '{}' is an attribute field but names no attribute",
                        field.name
                    )));
                }
                (FieldType::Text, true) => {
                    return Err(ScribeError::Extraction(format!(
                        "field '{}' is a text field but names an attribute",
                        field.name
                    )));
                }
                _ => {}
            }
        }

        Ok(())
    }
}

/// An extracted value: one string or an ordered list of strings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Single(String),
    Multiple(Vec<String>),
}

impl FieldValue {
    pub fn as_single(&self) -> Option<&str> {
        match self {
            Self::Single(value) => Some(value),
            Self::Multiple(_) => None,
        }
    }

    pub fn as_multiple(&self) -> Option<&[String]> {
        match self {
            Self::Single(_) => None,
            Self::Multiple(values) => Some(values),
        }
    }
}

/// Field name to extracted value, in schema order
pub type ExtractionResult = IndexMap<String, FieldValue>;
