//! The list of resources we want thumbnails for, loaded once at startup.

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;

use crate::error::SeederError;

/// One entry in the catalog.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize)]
pub struct CatalogItem {
    /// Resource category, eg `pose`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Display label, unique within `kind`.
    pub name: String,
    /// Free-text image search query.
    pub query: String,
    /// Generation prompt stored alongside the record. Required, a missing one fails validation.
    #[serde(default)]
    pub prompt: String,
}

/// An ordered, validated list of [CatalogItem]s.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    items: Vec<CatalogItem>,
}

impl Catalog {
    /// The catalog shipped in `data/catalog.json`.
    pub fn bundled() -> Result<Self, SeederError> {
        let raw = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/data/catalog.json"));
        Self::from_json(raw)
    }

    /// Reads a JSON catalog from disk.
    pub fn from_path(path: &Path) -> Result<Self, SeederError> {
        let raw = std::fs::read_to_string(path).map_err(|err| {
            SeederError::Catalog(format!("Failed to read {}: {err}", path.display()))
        })?;
        Self::from_json(&raw)
    }

    /// Parses and validates a JSON array of items.
    pub fn from_json(raw: &str) -> Result<Self, SeederError> {
        let items: Vec<CatalogItem> = serde_json::from_str(raw)?;
        Self::new(items)
    }

    /// Validates `items`, rejecting blank fields and repeated `(type, name)` keys.
    pub fn new(items: Vec<CatalogItem>) -> Result<Self, SeederError> {
        let mut seen = HashSet::new();
        for (index, item) in items.iter().enumerate() {
            if item.kind.trim().is_empty() {
                return Err(SeederError::Catalog(format!("item {index} has an empty type")));
            }
            if item.name.trim().is_empty() {
                return Err(SeederError::Catalog(format!("item {index} has an empty name")));
            }
            if item.query.trim().is_empty() {
                return Err(SeederError::Catalog(format!(
                    "{:?} has an empty query",
                    item.name
                )));
            }
            if item.prompt.trim().is_empty() {
                return Err(SeederError::Catalog(format!(
                    "{:?} has an empty prompt",
                    item.name
                )));
            }
            if !seen.insert((item.kind.as_str(), item.name.as_str())) {
                return Err(SeederError::Catalog(format!(
                    "duplicate entry for {}/{}",
                    item.kind, item.name
                )));
            }
        }
        Ok(Self { items })
    }

    /// Items in catalog order.
    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when there is nothing to seed.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
