//! Domain models for the AgroVision insights client

mod advisory;
mod crop;
mod insights;
mod ndvi;
mod recommendation;

pub use advisory::*;
pub use crop::*;
pub use insights::*;
pub use ndvi::*;
pub use recommendation::*;
