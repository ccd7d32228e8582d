//! Error types for the library

use thiserror::Error;

/// Result type alias for this crate
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the library
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid grid layout or hyper-parameters
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Pattern length does not match the network size
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Pattern contains a value other than -1 or +1
    #[error("Invalid pattern: value {value} at unit {index} is not bipolar")]
    InvalidPattern { index: usize, value: f64 },

    /// Pattern has every unit off
    #[error("Cannot store a blank pattern")]
    BlankPattern,

    /// Pattern is not in the memory
    #[error("Pattern not found in memory")]
    PatternNotFound,

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}
