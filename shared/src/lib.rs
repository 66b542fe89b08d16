//! Smart Scale Shared Library
//!
//! This crate contains the body composition engine and the shared types,
//! models, and utilities used across the backend and WASM modules.

pub mod body_composition;
pub mod errors;
pub mod models;
pub mod scale;
pub mod types;
pub mod validation;

// Re-export commonly used items
pub use body_composition::*;
pub use errors::*;
pub use scale::ScaleModel;
pub use types::*;

// Export models
pub use models::{HealthRecord, MeasurementRow, ReadingSource, UserProfile};
