//! Insights query orchestration
//!
//! A query is a primary recommendation lookup, a catalog match for the
//! recommended crop, then an alternates lookup when a crop was recommended.
//! Every step publishes an event into a watch channel; the rendering layer
//! subscribes and renders whatever version it sees.
//!
//! Each query gets a fresh id. Starting a query, rejecting input or calling
//! [`InsightsController::cancel`] hands the panel to a newer id, and any
//! request still running for an older id is dropped mid-flight.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use shared::{
    Coordinate, CoordinateInput, CropCatalog, CropRecord, InsightsEvent, InsightsState,
    InsightsView,
};
use tokio::sync::watch;

use crate::error::{AppError, AppResult};
use crate::external::RecommendationSource;

/// Owns the insights query lifecycle
pub struct InsightsController {
    source: Arc<dyn RecommendationSource>,
    catalog: Arc<CropCatalog>,
    timeout: Duration,
    last_query_id: AtomicU64,
    state: watch::Sender<InsightsState>,
}

impl InsightsController {
    pub fn new(
        source: Arc<dyn RecommendationSource>,
        catalog: Arc<CropCatalog>,
        timeout: Duration,
    ) -> Self {
        let (state, _) = watch::channel(InsightsState::default());
        Self {
            source,
            catalog,
            timeout,
            last_query_id: AtomicU64::new(0),
            state,
        }
    }

    /// Receive every new version of the panel state
    pub fn subscribe(&self) -> watch::Receiver<InsightsState> {
        self.state.subscribe()
    }

    /// Current state snapshot
    pub fn state(&self) -> InsightsState {
        self.state.borrow().clone()
    }

    /// Current presentation record
    pub fn view(&self) -> InsightsView {
        self.state.borrow().view()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading
    }

    /// Run one query for the entered coordinates
    ///
    /// Returns the view as it stands when this query finishes. A query that
    /// loses the panel to a newer one returns [`AppError::Superseded`] and
    /// leaves the state untouched.
    pub async fn submit_query(&self, input: &CoordinateInput) -> AppResult<InsightsView> {
        let query_id = self.next_query_id();

        let coordinate = match input.parse() {
            Ok(coordinate) => coordinate,
            Err(err) => {
                let err = AppError::from(err);
                tracing::info!(query_id, error = %err, "Rejected coordinate input");
                publish(
                    &self.state,
                    InsightsEvent::ValidationFailed {
                        query_id,
                        message: err.user_message(),
                    },
                );
                return Err(err);
            }
        };

        if !publish(
            &self.state,
            InsightsEvent::QueryStarted {
                query_id,
                coordinate,
            },
        ) {
            tracing::debug!(query_id, "Query superseded before it started");
            return Err(AppError::Superseded(query_id));
        }
        tracing::info!(query_id, %coordinate, "Submitting insights query");

        let guard = FinishGuard {
            state: &self.state,
            query_id,
        };
        let outcome = self.run_query(query_id, coordinate).await;
        drop(guard);
        outcome?;

        let view = self.view();
        if view.query_id != query_id {
            return Err(AppError::Superseded(query_id));
        }
        tracing::info!(
            query_id,
            ndvi_band = %view.ndvi_band,
            crop = ?view.recommended_crop.as_ref().map(|c| &c.id),
            alternates = view.alternate_crops.len(),
            "Insights query completed"
        );
        Ok(view)
    }

    /// Abandon any in-flight query, e.g. when the view is torn down
    pub fn cancel(&self) {
        let query_id = self.next_query_id();
        publish(&self.state, InsightsEvent::Cancelled { query_id });
        tracing::debug!(query_id, "Insights panel cancelled");
    }

    async fn run_query(&self, query_id: u64, coordinate: Coordinate) -> AppResult<()> {
        let result = match self
            .guarded(query_id, self.source.fetch_recommendation(&coordinate))
            .await
        {
            Ok(result) => result,
            Err(err @ AppError::Superseded(_)) => {
                tracing::debug!(query_id, "Dropped primary lookup for superseded query");
                return Err(err);
            }
            Err(err) => {
                tracing::error!(query_id, error = %err, "Primary recommendation lookup failed");
                publish(
                    &self.state,
                    InsightsEvent::PrimaryFailed {
                        query_id,
                        message: err.user_message(),
                    },
                );
                return Err(err);
            }
        };

        let crop_name = result.recommended_crop().map(str::to_string);
        let crop = crop_name
            .as_deref()
            .and_then(|name| self.resolve_crop(query_id, name));

        publish(
            &self.state,
            InsightsEvent::PrimaryLoaded {
                query_id,
                result,
                crop,
            },
        );

        if crop_name.is_none() {
            return Ok(());
        }

        let crops = match self
            .guarded(query_id, self.source.fetch_alternates(&coordinate))
            .await
        {
            Ok(crops) => crops,
            Err(err @ AppError::Superseded(_)) => {
                tracing::debug!(query_id, "Dropped alternates lookup for superseded query");
                return Err(err);
            }
            Err(err) => {
                tracing::warn!(
                    query_id,
                    error = %err,
                    "Alternate crops lookup failed, showing none"
                );
                Vec::new()
            }
        };

        publish(&self.state, InsightsEvent::AlternatesLoaded { query_id, crops });
        Ok(())
    }

    fn resolve_crop(&self, query_id: u64, name: &str) -> Option<CropRecord> {
        let crop = self.catalog.get(name).cloned();
        if crop.is_none() {
            tracing::warn!(
                query_id,
                crop = name,
                "Recommended crop not in catalog, omitting detail"
            );
        }
        crop
    }

    /// Race a request against the timeout and against supersession
    async fn guarded<T, F>(&self, query_id: u64, request: F) -> AppResult<T>
    where
        F: Future<Output = AppResult<T>>,
    {
        let superseded = wait_until_superseded(self.state.subscribe(), query_id);

        tokio::select! {
            biased;
            _ = superseded => Err(AppError::Superseded(query_id)),
            outcome = tokio::time::timeout(self.timeout, request) => match outcome {
                Ok(result) => result,
                Err(_) => Err(AppError::Timeout(self.timeout)),
            },
        }
    }

    fn next_query_id(&self) -> u64 {
        self.last_query_id.fetch_add(1, Ordering::SeqCst) + 1
    }
}

/// Apply an event, notifying subscribers only when the state changed
fn publish(state: &watch::Sender<InsightsState>, event: InsightsEvent) -> bool {
    state.send_if_modified(|current| {
        let next = current.apply(event);
        if next == *current {
            return false;
        }
        *current = next;
        true
    })
}

async fn wait_until_superseded(mut rx: watch::Receiver<InsightsState>, query_id: u64) {
    loop {
        if rx.borrow_and_update().query_id != query_id {
            return;
        }
        if rx.changed().await.is_err() {
            return;
        }
    }
}

/// Publishes `Finished` for its query however the query exits
struct FinishGuard<'a> {
    state: &'a watch::Sender<InsightsState>,
    query_id: u64,
}

impl Drop for FinishGuard<'_> {
    fn drop(&mut self) {
        publish(
            self.state,
            InsightsEvent::Finished {
                query_id: self.query_id,
            },
        );
    }
}
