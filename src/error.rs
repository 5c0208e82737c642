use std::io;
use thiserror::Error;

/// Custom error type for rigmon
#[derive(Error, Debug)]
pub enum RigError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Store error: {0}")]
    Store(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Not connected to the sensor store")]
    NotConnected,

    #[error("{0}")]
    Other(String),
}

/// Result type alias for rigmon
pub type Result<T> = std::result::Result<T, RigError>;

impl RigError {
    /// Create a config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        RigError::Config(msg.into())
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        RigError::Other(msg.into())
    }
}
