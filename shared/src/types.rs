//! Common types used across the client

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A point on the map in decimal degrees
///
/// Each field is parsed as a decimal and forwarded in its canonical decimal
/// form, so `+77.5` goes out as `77.5` and digits beyond 28 are rounded.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Coordinate {
    pub latitude: Decimal,
    pub longitude: Decimal,
}

impl Coordinate {
    pub fn new(latitude: Decimal, longitude: Decimal) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.latitude, self.longitude)
    }
}

/// Raw coordinate text as captured from the input fields
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CoordinateInput {
    pub latitude: String,
    pub longitude: String,
}

impl CoordinateInput {
    pub fn new(latitude: impl Into<String>, longitude: impl Into<String>) -> Self {
        Self {
            latitude: latitude.into(),
            longitude: longitude.into(),
        }
    }
}
