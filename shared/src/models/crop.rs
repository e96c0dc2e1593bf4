//! Crop encyclopedia records

use serde::{Deserialize, Serialize};

/// Descriptive record for one crop in the bundled catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct CropRecord {
    /// Lowercase catalog key
    pub id: String,
    pub display_name: String,
    pub category: String,
    pub benefits: Vec<String>,
    pub agronomic_profile: AgronomicProfile,
    /// Image locations in display order
    pub image_refs: Vec<String>,
}

/// Growing conditions and practices for a crop
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct AgronomicProfile {
    pub soil: String,
    pub ph_range: String,
    pub irrigation: String,
    pub temperature: String,
    pub fertilization: String,
    pub technology: String,
}
