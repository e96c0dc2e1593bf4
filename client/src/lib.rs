//! AgroVision insights client
//!
//! Collects a coordinate, asks the recommendation service about it and turns
//! the answer into view state for a rendering layer.

pub mod config;
pub mod error;
pub mod external;
pub mod services;

pub use config::Config;
pub use error::{AppError, AppResult, ErrorKind};
pub use external::{RecommendationClient, RecommendationSource};
pub use services::InsightsController;
