//! Recommendation service payloads

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Most alternates ever shown for one query
pub const MAX_ALTERNATES: usize = 3;

/// Soil and weather readings for a coordinate
///
/// Every field is independently optional. A missing field is unknown, never zero.
/// Reads the service's labelled keys and writes camelCase ones.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct SoilWeatherFields {
    #[serde(rename(deserialize = "Soil pH"), default)]
    pub soil_ph: Option<f64>,
    #[serde(rename(deserialize = "Soil Nitrogen"), default)]
    pub soil_nitrogen: Option<f64>,
    #[serde(rename(deserialize = "Temperature (°C)"), default)]
    pub temperature_c: Option<f64>,
    #[serde(rename(deserialize = "Humidity (%)"), default)]
    pub humidity_pct: Option<f64>,
    #[serde(rename(deserialize = "Rainfall (mm)"), default)]
    pub rainfall_mm: Option<f64>,
}

/// Body of `GET /get-crop-recommendation`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RecommendationResult {
    #[serde(rename = "NDVI", default)]
    pub ndvi: Option<f64>,
    #[serde(flatten)]
    pub conditions: SoilWeatherFields,
    #[serde(rename = "Recommended Crop", default)]
    pub recommended_crop_id: Option<String>,
}

impl RecommendationResult {
    /// Parse a primary recommendation body
    pub fn from_json(body: &str) -> serde_json::Result<Self> {
        serde_json::from_str(body)
    }

    /// Recommended crop name, ignoring blank values
    pub fn recommended_crop(&self) -> Option<&str> {
        self.recommended_crop_id
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct TopCropEntry {
    crop: String,
}

#[derive(Debug, Default, Deserialize)]
struct AlternatesPayload {
    #[serde(rename = "Top 3 Crops", default)]
    top_crops: Option<Vec<TopCropEntry>>,
    #[serde(rename = "Additional Crop Suggestions", default)]
    additional: Option<Vec<String>>,
}

/// Extract alternate crop names from a `GET /get-top-3-crops` body
///
/// `"Top 3 Crops"` takes precedence over `"Additional Crop Suggestions"`.
/// Its first entry is the primary recommendation and is skipped. The strings
/// shape is taken as-is. A body with neither key yields no alternates.
pub fn parse_alternates(body: &Value) -> serde_json::Result<Vec<String>> {
    let payload = AlternatesPayload::deserialize(body)?;

    let names: Vec<String> = match (payload.top_crops, payload.additional) {
        (Some(top), _) => top.into_iter().skip(1).map(|entry| entry.crop).collect(),
        (None, Some(additional)) => additional,
        (None, None) => Vec::new(),
    };

    Ok(names
        .into_iter()
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .take(MAX_ALTERNATES)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_full_payload() {
        let result = RecommendationResult::from_json(
            r#"{"NDVI": 0.3742, "Soil pH": 6.5, "Soil Nitrogen": 154, "Temperature (°C)": 25.67,
                "Humidity (%)": 46.05, "Rainfall (mm)": 0.0, "Recommended Crop": "rice"}"#,
        )
        .unwrap();

        assert_eq!(result.ndvi, Some(0.3742));
        assert_eq!(result.conditions.soil_ph, Some(6.5));
        assert_eq!(result.conditions.soil_nitrogen, Some(154.0));
        assert_eq!(result.conditions.temperature_c, Some(25.67));
        assert_eq!(result.conditions.humidity_pct, Some(46.05));
        assert_eq!(result.conditions.rainfall_mm, Some(0.0));
        assert_eq!(result.recommended_crop(), Some("rice"));
    }

    #[test]
    fn test_missing_and_null_fields_are_unknown() {
        let result =
            RecommendationResult::from_json(r#"{"NDVI": null, "Soil pH": 7.1}"#).unwrap();
        assert_eq!(result.ndvi, None);
        assert_eq!(result.conditions.soil_ph, Some(7.1));
        assert_eq!(result.conditions.soil_nitrogen, None);
        assert_eq!(result.conditions.rainfall_mm, None);
        assert_eq!(result.recommended_crop(), None);
    }

    #[test]
    fn test_zero_ndvi_is_not_unknown() {
        let result = RecommendationResult::from_json(r#"{"NDVI": 0}"#).unwrap();
        assert_eq!(result.ndvi, Some(0.0));
    }

    #[test]
    fn test_empty_object() {
        let result = RecommendationResult::from_json("{}").unwrap();
        assert_eq!(result, RecommendationResult::default());
    }

    #[test]
    fn test_blank_crop_name_is_absent() {
        let result = RecommendationResult::from_json(r#"{"Recommended Crop": "  "}"#).unwrap();
        assert_eq!(result.recommended_crop(), None);
    }

    #[test]
    fn test_extra_keys_ignored() {
        let result =
            RecommendationResult::from_json(r#"{"NDVI": 0.5, "Model": "NaiveBayes"}"#).unwrap();
        assert_eq!(result.ndvi, Some(0.5));
    }

    #[test]
    fn test_non_object_rejected() {
        assert!(RecommendationResult::from_json("[1, 2]").is_err());
    }

    #[test]
    fn test_top_crops_skips_primary() {
        let body = json!({
            "Top 3 Crops": [{"crop": "rice"}, {"crop": "jute"}, {"crop": "coconut"}]
        });
        assert_eq!(parse_alternates(&body).unwrap(), vec!["jute", "coconut"]);
    }

    #[test]
    fn test_additional_suggestions_taken_as_is() {
        let body = json!({"Additional Crop Suggestions": ["maize", "cotton", "banana"]});
        assert_eq!(parse_alternates(&body).unwrap(), vec!["maize", "cotton", "banana"]);
    }

    #[test]
    fn test_top_crops_take_precedence() {
        let body = json!({
            "Top 3 Crops": [{"crop": "rice"}, {"crop": "jute"}],
            "Additional Crop Suggestions": ["maize"]
        });
        assert_eq!(parse_alternates(&body).unwrap(), vec!["jute"]);
    }

    #[test]
    fn test_alternates_capped_and_cleaned() {
        let body = json!({
            "Additional Crop Suggestions": ["maize", " ", "cotton", "banana", "mango"]
        });
        assert_eq!(parse_alternates(&body).unwrap(), vec!["maize", "cotton", "banana"]);
    }

    #[test]
    fn test_no_known_key_yields_empty() {
        assert!(parse_alternates(&json!({"status": "ok"})).unwrap().is_empty());
    }

    #[test]
    fn test_malformed_alternates_rejected() {
        assert!(parse_alternates(&json!({"Top 3 Crops": "rice"})).is_err());
        assert!(parse_alternates(&json!("rice")).is_err());
    }
}
