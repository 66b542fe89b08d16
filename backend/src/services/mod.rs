//! Business logic services
//!
//! Services encapsulate business logic and coordinate between
//! repositories and external systems.

pub mod advice;
pub mod measurement;
pub mod predictor;
pub mod simulator;
pub mod telemetry;

pub use advice::{AdviceSink, OllamaAdvisor};
pub use measurement::{MeasurementOutcome, MeasurementService};
pub use predictor::{FixedPredictor, Predictor, ProfilePredictor};
pub use telemetry::{HttpTelemetryPublisher, TelemetrySink};
