//! Recommendation service client
//!
//! Talks to the AgroVision backend, which combines satellite NDVI, soil and
//! weather data into a crop recommendation for a coordinate.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde_json::Value;
use shared::{parse_alternates, Coordinate, RecommendationResult};

use crate::config::ServiceConfig;
use crate::error::{AppError, AppResult};

/// The two lookups an insights query needs
#[async_trait]
pub trait RecommendationSource: Send + Sync {
    /// Primary recommendation with NDVI and soil/weather readings
    async fn fetch_recommendation(&self, coordinate: &Coordinate)
        -> AppResult<RecommendationResult>;

    /// Up to three alternate crop names for the same coordinate
    async fn fetch_alternates(&self, coordinate: &Coordinate) -> AppResult<Vec<String>>;
}

/// HTTP client for the recommendation service
#[derive(Clone)]
pub struct RecommendationClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl RecommendationClient {
    /// Create a client for the service at `base_url`
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn from_config(config: &ServiceConfig) -> AppResult<Self> {
        config.validate()?;
        Self::new(config.base_url.trim(), config.request_timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Probe the service's welcome endpoint
    #[tracing::instrument(skip(self), fields(base_url = %self.base_url))]
    pub async fn service_status(&self) -> AppResult<String> {
        let url = format!("{}/", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        let body: Value = Self::checked(response).await?.json().await.map_err(|e| {
            AppError::InvalidResponse(format!("Failed to parse status response: {}", e))
        })?;

        Ok(body
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("ok")
            .to_string())
    }

    async fn send_query(&self, path: &str, coordinate: &Coordinate) -> AppResult<Response> {
        let url = format!("{}/{}", self.base_url, path);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("lat", coordinate.latitude.to_string()),
                ("lon", coordinate.longitude.to_string()),
            ])
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        Self::checked(response).await
    }

    /// Turn a non-success status into an error carrying the body
    async fn checked(response: Response) -> AppResult<Response> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Fetch(format!(
                "Recommendation API error: {} - {}",
                status, body
            )));
        }
        Ok(response)
    }

    fn transport_error(&self, err: reqwest::Error) -> AppError {
        if err.is_timeout() {
            AppError::Timeout(self.timeout)
        } else {
            AppError::Fetch(format!("Recommendation API request failed: {}", err))
        }
    }
}

#[async_trait]
impl RecommendationSource for RecommendationClient {
    #[tracing::instrument(skip(self))]
    async fn fetch_recommendation(
        &self,
        coordinate: &Coordinate,
    ) -> AppResult<RecommendationResult> {
        let body = self
            .send_query("get-crop-recommendation", coordinate)
            .await?
            .text()
            .await
            .map_err(|e| self.transport_error(e))?;

        RecommendationResult::from_json(&body).map_err(|e| {
            AppError::InvalidResponse(format!("Failed to parse recommendation response: {}", e))
        })
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_alternates(&self, coordinate: &Coordinate) -> AppResult<Vec<String>> {
        let body: Value = self
            .send_query("get-top-3-crops", coordinate)
            .await?
            .json()
            .await
            .map_err(|e| {
                AppError::InvalidResponse(format!("Failed to parse top crops response: {}", e))
            })?;

        parse_alternates(&body).map_err(|e| {
            AppError::InvalidResponse(format!("Unexpected top crops response shape: {}", e))
        })
    }
}
