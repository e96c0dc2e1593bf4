//! Insights controller tests
//!
//! Drive the controller against an in-memory recommendation source and check
//! the published view after each query path.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use agrovision_insights::{
    AppError, AppResult, ErrorKind, InsightsController, RecommendationSource,
};
use async_trait::async_trait;
use rust_decimal::Decimal;
use shared::{
    Coordinate, CoordinateInput, CropCatalog, NdviBand, RecommendationResult, SoilWeatherFields,
};
use tokio::sync::Notify;

/// What the fake returns for one latitude
#[derive(Clone)]
enum Reply<T> {
    Ok(T),
    Fail,
    /// Signal `started` and never answer
    Hang,
}

struct FakeSource {
    primary: Mutex<HashMap<Decimal, Reply<RecommendationResult>>>,
    alternates: Mutex<HashMap<Decimal, Reply<Vec<String>>>>,
    primary_calls: AtomicUsize,
    alternates_calls: AtomicUsize,
    started: Notify,
}

impl FakeSource {
    fn new() -> Self {
        Self {
            primary: Mutex::new(HashMap::new()),
            alternates: Mutex::new(HashMap::new()),
            primary_calls: AtomicUsize::new(0),
            alternates_calls: AtomicUsize::new(0),
            started: Notify::new(),
        }
    }

    fn primary(self, lat: i64, reply: Reply<RecommendationResult>) -> Self {
        self.primary.lock().unwrap().insert(Decimal::from(lat), reply);
        self
    }

    fn alternates(self, lat: i64, reply: Reply<Vec<String>>) -> Self {
        self.alternates.lock().unwrap().insert(Decimal::from(lat), reply);
        self
    }

    fn primary_calls(&self) -> usize {
        self.primary_calls.load(Ordering::SeqCst)
    }

    fn alternates_calls(&self) -> usize {
        self.alternates_calls.load(Ordering::SeqCst)
    }

    async fn answer<T: Clone>(&self, reply: Option<Reply<T>>) -> AppResult<T> {
        match reply {
            Some(Reply::Ok(value)) => Ok(value),
            Some(Reply::Hang) => {
                self.started.notify_one();
                std::future::pending().await
            }
            Some(Reply::Fail) | None => Err(AppError::Fetch(
                "Recommendation API error: 500 Internal Server Error - boom".to_string(),
            )),
        }
    }
}

#[async_trait]
impl RecommendationSource for FakeSource {
    async fn fetch_recommendation(
        &self,
        coordinate: &Coordinate,
    ) -> AppResult<RecommendationResult> {
        self.primary_calls.fetch_add(1, Ordering::SeqCst);
        let reply = self.primary.lock().unwrap().get(&coordinate.latitude).cloned();
        self.answer(reply).await
    }

    async fn fetch_alternates(&self, coordinate: &Coordinate) -> AppResult<Vec<String>> {
        self.alternates_calls.fetch_add(1, Ordering::SeqCst);
        let reply = self.alternates.lock().unwrap().get(&coordinate.latitude).cloned();
        self.answer(reply).await
    }
}

fn recommendation(ndvi: Option<f64>, crop: Option<&str>) -> RecommendationResult {
    RecommendationResult {
        ndvi,
        conditions: SoilWeatherFields {
            soil_ph: Some(6.5),
            soil_nitrogen: Some(154.0),
            temperature_c: Some(25.67),
            humidity_pct: Some(46.05),
            rainfall_mm: Some(0.0),
        },
        recommended_crop_id: crop.map(str::to_string),
    }
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn controller(source: Arc<FakeSource>) -> InsightsController {
    controller_with_timeout(source, Duration::from_secs(5))
}

fn controller_with_timeout(source: Arc<FakeSource>, timeout: Duration) -> InsightsController {
    InsightsController::new(source, Arc::new(CropCatalog::bundled().unwrap()), timeout)
}

fn input(lat: i64, lon: i64) -> CoordinateInput {
    CoordinateInput::new(lat.to_string(), lon.to_string())
}

/// A good reading publishes readings, crop detail and alternates
#[tokio::test]
async fn test_successful_query_shows_crop_and_alternates() {
    let source = Arc::new(
        FakeSource::new()
            .primary(12, Reply::Ok(recommendation(Some(0.3742), Some("rice"))))
            .alternates(12, Reply::Ok(names(&["jute", "coconut"]))),
    );
    let controller = controller(source.clone());

    let view = controller.submit_query(&input(12, 77)).await.unwrap();

    assert!(!view.is_loading);
    assert_eq!(view.ndvi_value, Some(0.3742));
    assert_eq!(view.ndvi_band, NdviBand::SparseVegetation);
    assert_eq!(view.recommended_crop.as_ref().map(|c| c.id.as_str()), Some("rice"));
    assert_eq!(view.alternate_crops, vec!["jute", "coconut"]);
    assert_eq!(view.soil_weather_fields.unwrap().rainfall_mm, Some(0.0));
    assert!(view.error_message.is_none());
    assert_eq!(source.primary_calls(), 1);
    assert_eq!(source.alternates_calls(), 1);
    assert_eq!(controller.view(), controller.state().view());
}

/// Zero NDVI hides crop detail but keeps it in state
#[tokio::test]
async fn test_zero_ndvi_hides_resolved_crop() {
    let source = Arc::new(
        FakeSource::new()
            .primary(12, Reply::Ok(recommendation(Some(0.0), Some("rice"))))
            .alternates(12, Reply::Ok(names(&["maize"]))),
    );
    let controller = controller(source);

    let view = controller.submit_query(&input(12, 77)).await.unwrap();

    assert_eq!(view.ndvi_band, NdviBand::NonVegetated);
    assert!(view.recommended_crop.is_none());
    assert!(controller.state().recommended_crop.is_some());
    // not gated on NDVI
    assert_eq!(view.alternate_crops, vec!["maize"]);
}

/// A failed primary lookup shows an error and never asks for alternates
#[tokio::test]
async fn test_primary_failure_reports_error_and_skips_alternates() {
    let source = Arc::new(FakeSource::new().primary(12, Reply::Fail));
    let controller = controller(source.clone());

    let err = controller.submit_query(&input(12, 77)).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::FetchError);
    let view = controller.view();
    assert!(controller.state().result.is_none());
    assert!(view.soil_weather_fields.is_none());
    assert!(!view.error_message.unwrap_or_default().is_empty());
    assert!(!view.is_loading);
    assert_eq!(source.alternates_calls(), 0);
}

/// A failed alternates lookup leaves the primary result intact
#[tokio::test]
async fn test_alternates_failure_is_swallowed() {
    let source = Arc::new(
        FakeSource::new()
            .primary(12, Reply::Ok(recommendation(Some(0.7), Some("rice"))))
            .alternates(12, Reply::Fail),
    );
    let controller = controller(source.clone());

    let view = controller.submit_query(&input(12, 77)).await.unwrap();

    assert_eq!(source.alternates_calls(), 1);
    assert!(view.alternate_crops.is_empty());
    assert!(view.error_message.is_none());
    assert_eq!(view.ndvi_band, NdviBand::DenseVegetation);
    assert_eq!(view.recommended_crop.map(|c| c.display_name), Some("Rice".to_string()));
}

/// Crop names from the service resolve regardless of case
#[tokio::test]
async fn test_mixed_case_crop_resolves() {
    let source = Arc::new(
        FakeSource::new()
            .primary(12, Reply::Ok(recommendation(Some(0.5), Some("Rice"))))
            .alternates(12, Reply::Ok(Vec::new())),
    );
    let view = controller(source).submit_query(&input(12, 77)).await.unwrap();

    assert_eq!(view.recommended_crop.map(|c| c.id), Some("rice".to_string()));
}

/// A crop missing from the catalog keeps its name but has no detail
#[tokio::test]
async fn test_unknown_crop_keeps_result_without_detail() {
    let source = Arc::new(
        FakeSource::new()
            .primary(12, Reply::Ok(recommendation(Some(0.5), Some("unobtainium"))))
            .alternates(12, Reply::Ok(names(&["maize"]))),
    );
    let controller = controller(source.clone());

    let view = controller.submit_query(&input(12, 77)).await.unwrap();

    assert!(view.soil_weather_fields.is_some());
    assert_eq!(view.recommended_crop_name.as_deref(), Some("unobtainium"));
    assert!(view.recommended_crop.is_none());
    assert!(view.error_message.is_none());
    // A recommendation was produced, so alternates are still looked up.
    assert_eq!(source.alternates_calls(), 1);
    assert_eq!(view.alternate_crops, vec!["maize"]);
}

/// No recommended crop means no alternates lookup
#[tokio::test]
async fn test_no_recommended_crop_skips_alternates() {
    let source =
        Arc::new(FakeSource::new().primary(12, Reply::Ok(recommendation(Some(0.5), None))));
    let controller = controller(source.clone());

    let view = controller.submit_query(&input(12, 77)).await.unwrap();

    assert_eq!(source.alternates_calls(), 0);
    assert!(view.alternate_crops.is_empty());
    assert!(!view.is_loading);
}

/// Empty input is rejected before any lookup
#[tokio::test]
async fn test_empty_longitude_fails_without_network() {
    let source = Arc::new(FakeSource::new());
    let controller = controller(source.clone());

    let err = controller
        .submit_query(&CoordinateInput::new("12.6", ""))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ValidationError);
    assert!(matches!(err, AppError::Validation { ref field, .. } if field == "longitude"));
    assert_eq!(source.primary_calls(), 0);
    assert_eq!(source.alternates_calls(), 0);

    let view = controller.view();
    assert!(!view.is_loading);
    assert!(view.error_message.unwrap().contains("coordinates required"));
}

/// A new query clears the previous error
#[tokio::test]
async fn test_new_query_clears_previous_error() {
    let source = Arc::new(
        FakeSource::new()
            .primary(1, Reply::Fail)
            .primary(2, Reply::Ok(recommendation(Some(0.5), None))),
    );
    let controller = controller(source);

    assert!(controller.submit_query(&input(1, 1)).await.is_err());
    assert!(controller.view().error_message.is_some());

    let view = controller.submit_query(&input(2, 2)).await.unwrap();
    assert!(view.error_message.is_none());
    assert_eq!(view.ndvi_value, Some(0.5));
}

/// The last submission wins while an earlier primary lookup hangs
#[tokio::test]
async fn test_newer_query_supersedes_in_flight_query() {
    let source = Arc::new(
        FakeSource::new()
            .primary(1, Reply::Hang)
            .primary(2, Reply::Ok(recommendation(Some(0.95), Some("coffee"))))
            .alternates(2, Reply::Ok(names(&["maize"]))),
    );
    let controller = Arc::new(controller(source.clone()));

    let first = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.submit_query(&input(1, 1)).await })
    };
    source.started.notified().await;
    assert!(controller.is_loading());

    let view = controller.submit_query(&input(2, 2)).await.unwrap();
    let stale = first.await.unwrap();

    assert!(matches!(stale, Err(AppError::Superseded(_))));
    let final_view = controller.view();
    assert_eq!(final_view, view);
    assert_eq!(
        final_view.coordinate,
        Some(Coordinate::new(Decimal::from(2), Decimal::from(2)))
    );
    assert_eq!(final_view.ndvi_band, NdviBand::VeryDenseVegetation);
    assert_eq!(final_view.recommended_crop.map(|c| c.id), Some("coffee".to_string()));
    assert!(!final_view.is_loading);
}

/// Late alternates from an older query never reach the view
#[tokio::test]
async fn test_superseded_during_alternates_lookup() {
    let source = Arc::new(
        FakeSource::new()
            .primary(1, Reply::Ok(recommendation(Some(0.5), Some("rice"))))
            .alternates(1, Reply::Hang)
            .primary(2, Reply::Ok(recommendation(Some(0.2), None))),
    );
    let controller = Arc::new(controller(source.clone()));

    let first = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.submit_query(&input(1, 1)).await })
    };
    source.started.notified().await;

    let view = controller.submit_query(&input(2, 2)).await.unwrap();
    assert!(matches!(first.await.unwrap(), Err(AppError::Superseded(_))));

    assert_eq!(view.ndvi_band, NdviBand::Barren);
    assert!(view.recommended_crop.is_none());
    assert!(view.alternate_crops.is_empty());
    assert_eq!(controller.view(), view);
}

/// Cancel stops loading without reporting an error
#[tokio::test]
async fn test_cancel_aborts_in_flight_query() {
    let source = Arc::new(FakeSource::new().primary(1, Reply::Hang));
    let controller = Arc::new(controller(source.clone()));

    let pending = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.submit_query(&input(1, 1)).await })
    };
    source.started.notified().await;

    controller.cancel();

    assert!(matches!(pending.await.unwrap(), Err(AppError::Superseded(_))));
    assert!(!controller.is_loading());
    assert!(controller.view().error_message.is_none());
}

/// A primary lookup past the timeout is a fetch error
#[tokio::test]
async fn test_primary_timeout_is_fetch_error() {
    let source = Arc::new(FakeSource::new().primary(1, Reply::Hang));
    let controller = controller_with_timeout(source, Duration::from_millis(50));

    let err = controller.submit_query(&input(1, 1)).await.unwrap_err();

    assert!(matches!(err, AppError::Timeout(_)));
    assert_eq!(err.kind(), ErrorKind::FetchError);
    let view = controller.view();
    assert!(!view.is_loading);
    assert!(view.error_message.is_some());
}

/// An alternates lookup past the timeout yields no alternates
#[tokio::test]
async fn test_alternates_timeout_is_swallowed() {
    let source = Arc::new(
        FakeSource::new()
            .primary(1, Reply::Ok(recommendation(Some(0.5), Some("maize"))))
            .alternates(1, Reply::Hang),
    );
    let controller = controller_with_timeout(source, Duration::from_millis(50));

    let view = controller.submit_query(&input(1, 1)).await.unwrap();

    assert!(view.alternate_crops.is_empty());
    assert!(view.error_message.is_none());
    assert_eq!(view.recommended_crop.map(|c| c.id), Some("maize".to_string()));
}

/// Dropping a query mid-flight still clears the loading flag
#[tokio::test]
async fn test_dropping_query_future_clears_loading() {
    let source = Arc::new(FakeSource::new().primary(1, Reply::Hang));
    let controller = controller(source.clone());

    let coordinates = input(1, 1);
    {
        let query = controller.submit_query(&coordinates);
        tokio::pin!(query);
        tokio::select! {
            _ = &mut query => panic!("query should not complete"),
            _ = source.started.notified() => {}
        }
        assert!(controller.is_loading());
    }

    assert!(!controller.is_loading());
}

/// Watch subscribers are notified of the finished state
#[tokio::test]
async fn test_subscribers_see_loading_then_result() {
    let source = Arc::new(
        FakeSource::new()
            .primary(1, Reply::Ok(recommendation(Some(0.5), Some("rice"))))
            .alternates(1, Reply::Ok(names(&["jute"]))),
    );
    let controller = controller(source);
    let mut rx = controller.subscribe();

    controller.submit_query(&input(1, 1)).await.unwrap();

    assert!(rx.has_changed().unwrap());
    let state = rx.borrow_and_update().clone();
    assert!(!state.is_loading);
    assert_eq!(state.alternate_crops, vec!["jute"]);
}
