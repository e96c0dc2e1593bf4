//! Shared types and models for the AgroVision insights client
//!
//! This crate contains the domain types and pure decision logic shared between
//! the native client, the browser (via WASM), and the tests of both.

pub mod catalog;
pub mod models;
pub mod types;
pub mod validation;

pub use catalog::*;
pub use models::*;
pub use types::*;
pub use validation::*;
