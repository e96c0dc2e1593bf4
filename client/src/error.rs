//! Error handling for the insights client
//!
//! Only validation and primary fetch failures ever reach the user. Everything
//! else degrades to a partial result and is logged.

use std::time::Duration;

use shared::CoordinateError;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Input errors
    #[error("Validation error: {message}")]
    Validation { field: String, message: String },

    // Recommendation service errors
    #[error("Recommendation service error: {0}")]
    Fetch(String),

    #[error("Recommendation service did not respond within {0:?}")]
    Timeout(Duration),

    #[error("Invalid response from recommendation service: {0}")]
    InvalidResponse(String),

    // Query lifecycle
    #[error("Query {0} was superseded by a newer query")]
    Superseded(u64),

    // Startup errors
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Error kinds as seen by the insights panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ValidationError,
    FetchError,
    Superseded,
    Startup,
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Validation { .. } => ErrorKind::ValidationError,
            AppError::Fetch(_) | AppError::Timeout(_) | AppError::InvalidResponse(_) => {
                ErrorKind::FetchError
            }
            AppError::Superseded(_) => ErrorKind::Superseded,
            AppError::Configuration(_) => ErrorKind::Startup,
        }
    }

    /// Stable machine-readable code, logged alongside user-facing failures
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation { .. } => "VALIDATION_ERROR",
            AppError::Fetch(_) => "FETCH_ERROR",
            AppError::Timeout(_) => "FETCH_TIMEOUT",
            AppError::InvalidResponse(_) => "INVALID_RESPONSE",
            AppError::Superseded(_) => "SUPERSEDED",
            AppError::Configuration(_) => "CONFIGURATION_ERROR",
        }
    }

    /// Whether the insights panel shows this error to the user
    pub fn is_user_visible(&self) -> bool {
        matches!(self.kind(), ErrorKind::ValidationError | ErrorKind::FetchError)
    }

    /// Message for the insights panel
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation { message, .. } => message.clone(),
            AppError::Fetch(_) | AppError::InvalidResponse(_) => {
                "Failed to fetch insights data.".to_string()
            }
            AppError::Timeout(limit) => format!(
                "Failed to fetch insights data: no response within {:?}.",
                limit
            ),
            other => other.to_string(),
        }
    }
}

impl From<CoordinateError> for AppError {
    fn from(err: CoordinateError) -> Self {
        AppError::Validation {
            field: err.field().to_string(),
            message: err.to_string(),
        }
    }
}

/// Result type alias for the client
pub type AppResult<T> = Result<T, AppError>;
