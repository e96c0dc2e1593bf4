//! NDVI banding
//!
//! The recommendation service reports NDVI as a bare number. For display it is
//! split into five bands with boundaries belonging to the lower band.

use serde::{Deserialize, Serialize};

/// Upper bounds (inclusive) of the Barren, Sparse and Dense bands
pub const NDVI_BARREN_MAX: f64 = 0.3;
pub const NDVI_SPARSE_MAX: f64 = 0.6;
pub const NDVI_DENSE_MAX: f64 = 0.9;

/// Vegetation band derived from an NDVI reading
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum NdviBand {
    /// No reading, or not a number
    Unknown,
    /// v <= 0: water, rock, built-up land
    NonVegetated,
    /// 0 < v <= 0.3
    Barren,
    /// 0.3 < v <= 0.6
    SparseVegetation,
    /// 0.6 < v <= 0.9
    DenseVegetation,
    /// v > 0.9
    VeryDenseVegetation,
}

impl NdviBand {
    /// Classify an optional reading; total over every `f64` including NaN
    pub fn classify(value: Option<f64>) -> Self {
        match value {
            None => NdviBand::Unknown,
            Some(v) if v.is_nan() => NdviBand::Unknown,
            Some(v) if v <= 0.0 => NdviBand::NonVegetated,
            Some(v) if v <= NDVI_BARREN_MAX => NdviBand::Barren,
            Some(v) if v <= NDVI_SPARSE_MAX => NdviBand::SparseVegetation,
            Some(v) if v <= NDVI_DENSE_MAX => NdviBand::DenseVegetation,
            Some(_) => NdviBand::VeryDenseVegetation,
        }
    }

    /// Guidance shown next to the reading; `Unknown` has none
    pub fn message(&self) -> Option<&'static str> {
        match self {
            NdviBand::Unknown => None,
            NdviBand::NonVegetated => Some(
                "No vegetation detected. The area is likely water, rock or built-up land, \
                 so no crop is recommended.",
            ),
            NdviBand::Barren => Some("Very little vegetation. The land may be dry or barren."),
            NdviBand::SparseVegetation => {
                Some("Sparse vegetation. Crops are growing but may be young or stressed.")
            }
            NdviBand::DenseVegetation => Some("Dense, healthy vegetation."),
            NdviBand::VeryDenseVegetation => Some("Very dense, lush green vegetation."),
        }
    }

    /// Whether a primary crop recommendation may be shown for this band
    pub fn allows_recommendation(&self) -> bool {
        !matches!(self, NdviBand::Unknown | NdviBand::NonVegetated)
    }
}

impl std::fmt::Display for NdviBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NdviBand::Unknown => write!(f, "Unknown"),
            NdviBand::NonVegetated => write!(f, "Non-vegetated"),
            NdviBand::Barren => write!(f, "Barren"),
            NdviBand::SparseVegetation => write!(f, "Sparse Vegetation"),
            NdviBand::DenseVegetation => write!(f, "Dense Vegetation"),
            NdviBand::VeryDenseVegetation => write!(f, "Very Dense Vegetation"),
        }
    }
}

/// Classify an NDVI reading into its band
pub fn classify_ndvi(value: Option<f64>) -> NdviBand {
    NdviBand::classify(value)
}
