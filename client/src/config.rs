//! Configuration management for the insights client
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (config/development.toml, config/production.toml)
//! 3. Environment variable overrides with AGRO__ prefix

use std::time::Duration;

use config::{ConfigError, Environment, File};
use serde::Deserialize;

use crate::error::{AppError, AppResult};

/// Longest request timeout accepted, in seconds
pub const MAX_TIMEOUT_SECS: u64 = 120;

/// Main client configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Recommendation service configuration
    pub service: ServiceConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    /// Base URL of the recommendation service
    pub base_url: String,

    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Default tracing filter, used when RUST_LOG is unset
    pub filter: String,

    /// Emit JSON log lines instead of human-readable ones
    pub json: bool,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("AGRO_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("service.base_url", ServiceConfig::default().base_url)?
            .set_default("service.request_timeout_secs", 15)?
            .set_default("logging.filter", LoggingConfig::default().filter)?
            .set_default("logging.json", false)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (AGRO__ prefix)
            .add_source(
                Environment::with_prefix("AGRO")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Reject values the client cannot run with
    pub fn validate(&self) -> AppResult<()> {
        self.service.validate()
    }
}

impl ServiceConfig {
    pub fn validate(&self) -> AppResult<()> {
        let base_url = self.base_url.trim();
        if base_url.is_empty() {
            return Err(AppError::Configuration(
                "service.base_url must not be empty".to_string(),
            ));
        }
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(AppError::Configuration(format!(
                "service.base_url must be an http(s) URL, got {}",
                base_url
            )));
        }
        if self.request_timeout_secs == 0 || self.request_timeout_secs > MAX_TIMEOUT_SECS {
            return Err(AppError::Configuration(format!(
                "service.request_timeout_secs must be between 1 and {}, got {}",
                MAX_TIMEOUT_SECS, self.request_timeout_secs
            )));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            request_timeout_secs: 15,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "agrovision_insights=debug,reqwest=warn".to_string(),
            json: false,
        }
    }
}
