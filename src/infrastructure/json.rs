//! DICOM JSON model loader (PS3.18 F.2)
//!
//! A document is an object keyed by 8-hex-digit tags, each element carrying a
//! `vr` and an optional `Value` array. A top-level array is accepted and its
//! first object is used, as returned by DICOMweb metadata queries.

use std::path::Path;
use std::sync::Arc;

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::{Dataset, DomainError, Element, Tag};
use crate::infrastructure::traits::{DocumentLoader, FileSystem};
use crate::util::path::PathExt;

/// Error parsing a DICOM JSON document.
#[derive(Error, Debug)]
pub enum DocumentParseError {
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("document is not an object")]
    NotAnObject,

    #[error("empty document array")]
    EmptyArray,

    #[error("invalid tag key: {key}")]
    InvalidTagKey {
        key: String,
        #[source]
        source: DomainError,
    },

    #[error("element {0} is not an object")]
    ElementNotObject(Tag),

    #[error("element {0} has a non-array Value")]
    ValueNotArray(Tag),

    #[error("sequence {0} holds a non-object item")]
    SequenceItemNotObject(Tag),

    #[error("element {0} holds a nested array")]
    NestedArray(Tag),
}

/// Loads documents in the DICOM JSON model through a `FileSystem`.
pub struct JsonDocumentLoader {
    fs: Arc<dyn FileSystem>,
    extensions: Vec<String>,
}

impl JsonDocumentLoader {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self {
            fs,
            extensions: vec!["json".to_string()],
        }
    }

    /// File extensions recognised by `accepts`.
    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions;
        self
    }
}

impl DocumentLoader for JsonDocumentLoader {
    #[instrument(level = "debug", skip(self))]
    fn load(&self, path: &Path) -> ApplicationResult<Dataset> {
        if !self.fs.exists(path) {
            return Err(ApplicationError::DocumentNotFound(path.to_path_buf()));
        }
        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read document", path)?;

        let dataset = parse_document(&content).map_err(|e| ApplicationError::Document {
            path: path.to_path_buf(),
            source: Box::new(e),
        })?;
        debug!("loaded {} top-level attributes", dataset.len());
        Ok(dataset)
    }

    fn accepts(&self, path: &Path) -> bool {
        path.has_extension_in(&self.extensions)
    }
}

/// Parse DICOM JSON text into a dataset.
pub fn parse_document(content: &str) -> Result<Dataset, DocumentParseError> {
    let value: Value = serde_json::from_str(content)?;

    match value {
        Value::Object(map) => parse_dataset(&map),
        Value::Array(items) => match items.first() {
            Some(Value::Object(map)) => parse_dataset(map),
            Some(_) => Err(DocumentParseError::NotAnObject),
            None => Err(DocumentParseError::EmptyArray),
        },
        _ => Err(DocumentParseError::NotAnObject),
    }
}

fn parse_dataset(map: &Map<String, Value>) -> Result<Dataset, DocumentParseError> {
    let mut dataset = Dataset::new();
    for (key, element) in map {
        let tag: Tag = key
            .parse()
            .map_err(|source| DocumentParseError::InvalidTagKey {
                key: key.clone(),
                source,
            })?;
        let element = element
            .as_object()
            .ok_or(DocumentParseError::ElementNotObject(tag))?;
        dataset.insert(tag, parse_element(tag, element)?);
    }
    Ok(dataset)
}

fn parse_element(tag: Tag, element: &Map<String, Value>) -> Result<Element, DocumentParseError> {
    let vr = element.get("vr").and_then(Value::as_str).unwrap_or_default();
    let values = match element.get("Value") {
        None | Some(Value::Null) => &[][..],
        Some(Value::Array(values)) => values.as_slice(),
        Some(_) => return Err(DocumentParseError::ValueNotArray(tag)),
    };

    if vr == "SQ" {
        let items = values
            .iter()
            .map(|item| match item {
                Value::Object(map) => parse_dataset(map),
                _ => Err(DocumentParseError::SequenceItemNotObject(tag)),
            })
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(Element::Sequence(items));
    }

    let strings = values
        .iter()
        .map(|value| scalar_to_string(tag, value))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Element::Strings(strings))
}

fn scalar_to_string(tag: Tag, value: &Value) -> Result<Option<String>, DocumentParseError> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Bool(b) => Ok(Some(b.to_string())),
        // Person names carry their components as an object
        Value::Object(pn) => Ok(pn
            .get("Alphabetic")
            .and_then(Value::as_str)
            .map(str::to_string)),
        Value::Array(_) => Err(DocumentParseError::NestedArray(tag)),
    }
}
