//! Estimation errors
//!
//! Every variant degrades to "insufficient evidence this tick"; none are fatal.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EstimationError {
    #[error("invalid frame: {0}")]
    InvalidFrame(String),
    #[error("face detector failed: {0}")]
    Detector(String),
    #[error("malformed detection: {0}")]
    MalformedDetection(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("unknown attention status: {0:?}")]
pub struct UnknownStatus(pub String);

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{field} out of range: {value}")]
    OutOfRange { field: &'static str, value: f64 },
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
    #[error("brightness band is empty: min {min} >= max {max}")]
    EmptyBrightnessBand { min: f64, max: f64 },
}
