//! Storage repositories
//!
//! Provides the data access layer for the measurement history.

pub mod measurements;

pub use measurements::MeasurementRepository;
