//! Insights view state
//!
//! The state for one insights panel is an immutable value. Every change is an
//! [`InsightsEvent`] folded in with [`InsightsState::apply`], which returns the
//! next version. Events are tagged with the query that produced them, and any
//! event from a superseded query is discarded.

use serde::Serialize;

use super::advisory::{HumidityClass, SoilPhClass};
use super::crop::CropRecord;
use super::ndvi::NdviBand;
use super::recommendation::{RecommendationResult, SoilWeatherFields};
use crate::types::Coordinate;

/// Something that happened to the insights panel
#[derive(Debug, Clone, PartialEq)]
pub enum InsightsEvent {
    /// Input was rejected before any request was made
    ValidationFailed { query_id: u64, message: String },
    /// A new query was submitted
    QueryStarted { query_id: u64, coordinate: Coordinate },
    /// The primary lookup returned; `crop` is its catalog match, if any
    PrimaryLoaded {
        query_id: u64,
        result: RecommendationResult,
        crop: Option<CropRecord>,
    },
    /// The primary lookup failed; the query ends here
    PrimaryFailed { query_id: u64, message: String },
    /// Alternate suggestions arrived (empty when the lookup failed)
    AlternatesLoaded { query_id: u64, crops: Vec<String> },
    /// The query is over, whatever path it took
    Finished { query_id: u64 },
    /// Any in-flight query was abandoned
    Cancelled { query_id: u64 },
}

impl InsightsEvent {
    pub fn query_id(&self) -> u64 {
        match self {
            InsightsEvent::ValidationFailed { query_id, .. }
            | InsightsEvent::QueryStarted { query_id, .. }
            | InsightsEvent::PrimaryLoaded { query_id, .. }
            | InsightsEvent::PrimaryFailed { query_id, .. }
            | InsightsEvent::AlternatesLoaded { query_id, .. }
            | InsightsEvent::Finished { query_id }
            | InsightsEvent::Cancelled { query_id } => *query_id,
        }
    }

    /// Events that take ownership of the panel from the current query
    fn opens_query(&self) -> bool {
        matches!(
            self,
            InsightsEvent::ValidationFailed { .. }
                | InsightsEvent::QueryStarted { .. }
                | InsightsEvent::Cancelled { .. }
        )
    }
}

/// One version of the insights panel state
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InsightsState {
    /// Query that owns this state; 0 before the first submission
    pub query_id: u64,
    pub coordinate: Option<Coordinate>,
    pub result: Option<RecommendationResult>,
    /// Catalog match for the primary recommendation
    pub recommended_crop: Option<CropRecord>,
    pub alternate_crops: Vec<String>,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl InsightsState {
    /// Whether `event` may change this state
    ///
    /// Opening events need a newer query id. Everything else must come from
    /// the query that currently owns the state.
    pub fn accepts(&self, event: &InsightsEvent) -> bool {
        if event.opens_query() {
            event.query_id() > self.query_id
        } else {
            event.query_id() == self.query_id
        }
    }

    /// Fold one event into the state, producing the next version
    pub fn apply(&self, event: InsightsEvent) -> InsightsState {
        if !self.accepts(&event) {
            return self.clone();
        }

        match event {
            InsightsEvent::ValidationFailed { query_id, message } => InsightsState {
                query_id,
                error: Some(message),
                ..InsightsState::default()
            },
            InsightsEvent::QueryStarted {
                query_id,
                coordinate,
            } => InsightsState {
                query_id,
                coordinate: Some(coordinate),
                is_loading: true,
                ..InsightsState::default()
            },
            InsightsEvent::PrimaryLoaded { result, crop, .. } if self.is_loading => InsightsState {
                result: Some(result),
                recommended_crop: crop,
                ..self.clone()
            },
            InsightsEvent::PrimaryFailed { message, .. } if self.is_loading => InsightsState {
                result: None,
                recommended_crop: None,
                alternate_crops: Vec::new(),
                is_loading: false,
                error: Some(message),
                ..self.clone()
            },
            InsightsEvent::AlternatesLoaded { crops, .. } if self.is_loading => InsightsState {
                alternate_crops: crops,
                ..self.clone()
            },
            InsightsEvent::Finished { .. } => InsightsState {
                is_loading: false,
                ..self.clone()
            },
            InsightsEvent::Cancelled { query_id } => InsightsState {
                query_id,
                is_loading: false,
                ..self.clone()
            },
            // Late results for a query that already finished.
            _ => self.clone(),
        }
    }

    /// Derive the presentation record for the rendering layer
    pub fn view(&self) -> InsightsView {
        let ndvi_value = self.result.as_ref().and_then(|r| r.ndvi);
        let ndvi_band = NdviBand::classify(ndvi_value);
        let conditions = self.result.as_ref().map(|r| r.conditions.clone());

        let recommended_crop = if show_crop_detail(ndvi_value, self.recommended_crop.as_ref()) {
            self.recommended_crop.clone()
        } else {
            None
        };

        InsightsView {
            query_id: self.query_id,
            coordinate: self.coordinate,
            ndvi_value,
            ndvi_band,
            ndvi_message: ndvi_band.message().map(str::to_string),
            soil_ph_class: conditions
                .as_ref()
                .and_then(|c| c.soil_ph)
                .and_then(SoilPhClass::classify),
            humidity_class: conditions
                .as_ref()
                .and_then(|c| c.humidity_pct)
                .and_then(HumidityClass::classify),
            soil_weather_fields: conditions,
            recommended_crop_name: self
                .result
                .as_ref()
                .and_then(|r| r.recommended_crop())
                .map(str::to_string),
            recommended_crop,
            alternate_crops: self.alternate_crops.clone(),
            error_message: self.error.clone(),
            is_loading: self.is_loading,
        }
    }
}

/// Crop detail is shown only for a positive NDVI reading and a catalog match
pub fn show_crop_detail(ndvi: Option<f64>, crop: Option<&CropRecord>) -> bool {
    crop.is_some() && NdviBand::classify(ndvi).allows_recommendation()
}

/// Everything the rendering layer needs, with no further business logic
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightsView {
    pub query_id: u64,
    pub coordinate: Option<Coordinate>,
    pub ndvi_value: Option<f64>,
    pub ndvi_band: NdviBand,
    pub ndvi_message: Option<String>,
    /// Present whenever a primary result is
    pub soil_weather_fields: Option<SoilWeatherFields>,
    pub soil_ph_class: Option<SoilPhClass>,
    pub humidity_class: Option<HumidityClass>,
    /// Name as returned by the service, resolved or not
    pub recommended_crop_name: Option<String>,
    /// Gated on NDVI; see [`show_crop_detail`]
    pub recommended_crop: Option<CropRecord>,
    /// Shown whenever non-empty, regardless of NDVI band
    pub alternate_crops: Vec<String>,
    pub error_message: Option<String>,
    pub is_loading: bool,
}
