//! Validation of user-entered coordinates
//!
//! Only presence and numeric form are checked here. Range checks are left to
//! the recommendation service, which owns the definition of a usable point.

use std::str::FromStr;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::types::{Coordinate, CoordinateInput};

/// Reasons a coordinate input is rejected before any request is made
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CoordinateError {
    #[error("coordinates required: please enter valid latitude and longitude")]
    Missing { field: &'static str },

    #[error("{field} must be a decimal number, got {value:?}")]
    NotANumber { field: &'static str, value: String },
}

impl CoordinateError {
    /// Name of the offending input field
    pub fn field(&self) -> &'static str {
        match self {
            CoordinateError::Missing { field } | CoordinateError::NotANumber { field, .. } => field,
        }
    }
}

/// Parse one coordinate field, rejecting empty and non-numeric text
pub fn parse_degrees(field: &'static str, raw: &str) -> Result<Decimal, CoordinateError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CoordinateError::Missing { field });
    }
    Decimal::from_str(trimmed).map_err(|_| CoordinateError::NotANumber {
        field,
        value: trimmed.to_string(),
    })
}

impl CoordinateInput {
    /// Validate the input and produce a coordinate ready for submission
    pub fn parse(&self) -> Result<Coordinate, CoordinateError> {
        // Both fields must be present before either is checked for form.
        if self.latitude.trim().is_empty() {
            return Err(CoordinateError::Missing { field: "latitude" });
        }
        if self.longitude.trim().is_empty() {
            return Err(CoordinateError::Missing { field: "longitude" });
        }
        let latitude = parse_degrees("latitude", &self.latitude)?;
        let longitude = parse_degrees("longitude", &self.longitude)?;
        Ok(Coordinate::new(latitude, longitude))
    }
}
