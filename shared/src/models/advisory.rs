//! Soil and weather guidance shown next to raw readings

use serde::{Deserialize, Serialize};

/// Soil acidity class
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SoilPhClass {
    /// pH below 6
    Acidic,
    /// pH 6 to 7 inclusive
    Neutral,
    /// pH above 7
    Alkaline,
}

impl SoilPhClass {
    pub fn classify(ph: f64) -> Option<Self> {
        if ph.is_nan() {
            return None;
        }
        Some(if ph < 6.0 {
            SoilPhClass::Acidic
        } else if ph <= 7.0 {
            SoilPhClass::Neutral
        } else {
            SoilPhClass::Alkaline
        })
    }

    pub fn message(&self) -> &'static str {
        match self {
            SoilPhClass::Acidic => "Acidic soil, suitable for crops like coffee and tea.",
            SoilPhClass::Neutral => "A pH of 6-7 is ideal for most crops.",
            SoilPhClass::Alkaline => "Alkaline soil, good for barley and mustard.",
        }
    }
}

/// Relative humidity class
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum HumidityClass {
    /// Below 40%
    Low,
    /// 40% to 80% inclusive
    Moderate,
    /// Above 80%
    High,
}

impl HumidityClass {
    pub fn classify(percent: f64) -> Option<Self> {
        if percent.is_nan() {
            return None;
        }
        Some(if percent < 40.0 {
            HumidityClass::Low
        } else if percent <= 80.0 {
            HumidityClass::Moderate
        } else {
            HumidityClass::High
        })
    }

    pub fn message(&self) -> &'static str {
        match self {
            HumidityClass::Low => "Low humidity can stress plants.",
            HumidityClass::Moderate => "Humidity is within a comfortable range for most crops.",
            HumidityClass::High => "High humidity can promote fungal diseases.",
        }
    }
}
