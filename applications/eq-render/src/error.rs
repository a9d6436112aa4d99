//! Render error types
use soul_eq::EqError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RenderError>;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("EQ error: {0}")]
    Eq(#[from] EqError),

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    #[error("Unsupported audio format: {0}")]
    UnsupportedFormat(String),

    #[error("Analyzer thread panicked")]
    Analyzer,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<config::ConfigError> for RenderError {
    fn from(err: config::ConfigError) -> Self {
        RenderError::Config(err.to_string())
    }
}
