//! Error types for the pose coaching engine.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Analysis engine is not initialized")]
    NotInitialized,

    #[error("Analysis engine has been disposed")]
    Disposed,

    #[error("No pose detected in frame")]
    NoPoseDetected,

    #[error("Invalid pose frame: {0}")]
    InvalidFrame(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<config::ConfigError> for Error {
    fn from(e: config::ConfigError) -> Self {
        Error::Config(e.to_string())
    }
}
