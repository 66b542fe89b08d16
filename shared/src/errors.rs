//! Error types for the Smart Scale application

use thiserror::Error;

/// Application-wide error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Scale packet decoding errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScaleError {
    #[error("Packet too short for {model}: expected at least {expected} bytes, got {actual}")]
    PacketTooShort {
        model: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid packet hex: {0}")]
    InvalidHex(String),

    #[error("Unknown scale device: {0}")]
    UnknownDevice(String),
}
