//! Error types for Riptide

use thiserror::Error;

/// Result type alias for Riptide operations
pub type RiptideResult<T> = Result<T, RiptideError>;

/// Main error type for Riptide
#[derive(Error, Debug)]
pub enum RiptideError {
    #[error("Bridge error: {0}")]
    Bridge(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Script error: {0}")]
    Script(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RiptideError {
    /// Create a new bridge error
    pub fn bridge(msg: impl Into<String>) -> Self {
        Self::Bridge(msg.into())
    }

    /// Create a new transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new script error
    pub fn script(msg: impl Into<String>) -> Self {
        Self::Script(msg.into())
    }
}
