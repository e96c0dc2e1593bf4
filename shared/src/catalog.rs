//! Bundled crop encyclopedia
//!
//! The table ships inside the binary and is parsed once at startup. It is
//! never fetched remotely and never mutated after construction.

use std::collections::HashMap;

use thiserror::Error;

use crate::models::CropRecord;

const BUNDLED_CROPS: &str = include_str!("../data/crops.json");

/// Errors raised while building a catalog
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to parse crop catalog: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Crop id must not be empty")]
    EmptyId,

    #[error("Crop id must be lowercase: {0}")]
    NotLowercase(String),

    #[error("Duplicate crop id: {0}")]
    Duplicate(String),
}

/// Read-only mapping from crop id to its record
#[derive(Debug, Clone, Default)]
pub struct CropCatalog {
    records: HashMap<String, CropRecord>,
}

impl CropCatalog {
    /// Load the catalog compiled into the crate
    pub fn bundled() -> Result<Self, CatalogError> {
        Self::from_json(BUNDLED_CROPS)
    }

    /// Build a catalog from a JSON array of records
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let records: Vec<CropRecord> = serde_json::from_str(json)?;
        Self::from_records(records)
    }

    /// Build a catalog, enforcing lowercase unique ids
    pub fn from_records(
        records: impl IntoIterator<Item = CropRecord>,
    ) -> Result<Self, CatalogError> {
        let mut map = HashMap::new();
        for record in records {
            if record.id.is_empty() {
                return Err(CatalogError::EmptyId);
            }
            if record.id != record.id.to_lowercase() {
                return Err(CatalogError::NotLowercase(record.id));
            }
            if map.contains_key(&record.id) {
                return Err(CatalogError::Duplicate(record.id));
            }
            map.insert(record.id.clone(), record);
        }
        Ok(Self { records: map })
    }

    /// Case-insensitive exact lookup
    pub fn get(&self, name: &str) -> Option<&CropRecord> {
        self.records.get(&name.to_lowercase())
    }

    /// Crop ids in alphabetical order
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.records.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
