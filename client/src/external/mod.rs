//! External API integrations

pub mod recommendation;

pub use recommendation::{RecommendationClient, RecommendationSource};
