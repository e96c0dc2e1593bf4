//! WebAssembly module for the AgroVision insights page
//!
//! Provides client-side computation for:
//! - NDVI band classification
//! - Crop encyclopedia lookups
//! - Folding raw service responses into a ready-to-render view

use std::sync::OnceLock;

use serde_json::Value;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;
pub use shared::{CatalogError, CropCatalog};

static CATALOG: OnceLock<CropCatalog> = OnceLock::new();

/// Bundled catalog, parsed on first use
fn catalog() -> &'static CropCatalog {
    CATALOG.get_or_init(|| {
        CropCatalog::bundled().unwrap_or_else(|err| {
            log_warning(&format!("Crop catalog unavailable: {}", err));
            CropCatalog::default()
        })
    })
}

#[cfg(target_arch = "wasm32")]
fn log_warning(message: &str) {
    web_sys::console::warn_1(&JsValue::from_str(message));
}

#[cfg(not(target_arch = "wasm32"))]
fn log_warning(_message: &str) {}

/// Classify an NDVI reading; NaN means no reading
#[wasm_bindgen]
pub fn classify_ndvi_band(value: f64) -> String {
    let reading = if value.is_nan() { None } else { Some(value) };
    format!("{}", classify_ndvi(reading))
}

/// Guidance text for an NDVI reading, empty when unknown
#[wasm_bindgen]
pub fn ndvi_band_message(value: f64) -> String {
    let reading = if value.is_nan() { None } else { Some(value) };
    classify_ndvi(reading).message().unwrap_or_default().to_string()
}

/// Whether the crop detail section should be rendered
#[wasm_bindgen]
pub fn should_show_crop_detail(ndvi: f64, crop_name: &str) -> bool {
    let reading = if ndvi.is_nan() { None } else { Some(ndvi) };
    show_crop_detail(reading, catalog().get(crop_name))
}

/// Check that both coordinate fields hold a decimal number
#[wasm_bindgen]
pub fn validate_coordinate_input(latitude: &str, longitude: &str) -> bool {
    CoordinateInput::new(latitude, longitude).parse().is_ok()
}

/// Catalog record as JSON, or an empty string when unknown
#[wasm_bindgen]
pub fn crop_info(name: &str) -> String {
    catalog()
        .get(name)
        .and_then(|record| serde_json::to_string(record).ok())
        .unwrap_or_default()
}

/// All catalog ids as a JSON array
#[wasm_bindgen]
pub fn crop_ids() -> String {
    serde_json::to_string(&catalog().ids()).unwrap_or_else(|_| "[]".to_string())
}

/// Build the insights view from raw service responses
///
/// `top_crops_json` may be empty when the alternates lookup was skipped or
/// failed; alternates then come out empty.
#[wasm_bindgen]
pub fn render_insights(
    recommendation_json: &str,
    top_crops_json: &str,
) -> Result<String, JsValue> {
    render_insights_json(recommendation_json, top_crops_json).map_err(|e| JsValue::from_str(&e))
}

fn render_insights_json(
    recommendation_json: &str,
    top_crops_json: &str,
) -> Result<String, String> {
    let result = RecommendationResult::from_json(recommendation_json)
        .map_err(|e| format!("Invalid recommendation JSON: {}", e))?;

    let crop = result.recommended_crop().and_then(|name| {
        let record = catalog().get(name).cloned();
        if record.is_none() {
            log_warning(&format!("Recommended crop not in catalog: {}", name));
        }
        record
    });

    let crops = if top_crops_json.trim().is_empty() {
        Vec::new()
    } else {
        serde_json::from_str::<Value>(top_crops_json)
            .map_err(|e| e.to_string())
            .and_then(|body| parse_alternates(&body).map_err(|e| e.to_string()))
            .unwrap_or_else(|err| {
                log_warning(&format!("Ignoring top crops response: {}", err));
                Vec::new()
            })
    };

    let state = InsightsState {
        result: Some(result),
        recommended_crop: crop,
        alternate_crops: crops,
        ..InsightsState::default()
    };

    serde_json::to_string(&state.view()).map_err(|e| e.to_string())
}
