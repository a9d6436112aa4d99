//! EQ-specific errors
use thiserror::Error;

/// Result type alias using `EqError`
pub type Result<T> = std::result::Result<T, EqError>;

/// EQ error types
///
/// Only configuration-time calls return these. The real-time path
/// (`process_block`, `update`, `push`, `pull`) never fails with an error.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EqError {
    /// Sample rate is zero, negative or not finite
    #[error("Invalid sample rate: {0} Hz")]
    InvalidSampleRate(f64),

    /// Block size is zero
    #[error("Invalid block size: {0} samples")]
    InvalidBlockSize(usize),

    /// Queue capacity is zero
    #[error("Invalid queue capacity: {0} slots")]
    InvalidCapacity(usize),

    /// A parameter value lies outside its allowed range
    #[error("Parameter '{parameter}' out of range: {value} (allowed {min}..={max})")]
    ParameterOutOfRange {
        parameter: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },

    /// Invalid settings
    #[error("Configuration error: {0}")]
    Config(String),
}
