//! Error types for the attribution engine
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Result type alias for attribution operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the attribution engine
#[derive(Error, Debug)]
pub enum Error {
    /// Classifier-related errors (remote inventory queries)
    #[error("classifier error: {0}")]
    Classifier(String),

    /// Region enumeration errors
    #[error("region source error: {0}")]
    RegionSource(String),

    /// DNS resolution errors (forward or reverse)
    #[error("resolver error: {0}")]
    Resolver(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Network-related errors
    #[error("network error: {0}")]
    Network(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid input
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Classifier-specific error carrying the classifier name
    #[error("classifier error ({classifier}): {message}")]
    Source {
        /// Classifier name
        classifier: String,
        /// Error message
        message: String,
    },

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a classifier error
    pub fn classifier(msg: impl Into<String>) -> Self {
        Self::Classifier(msg.into())
    }

    /// Create a region source error
    pub fn region_source(msg: impl Into<String>) -> Self {
        Self::RegionSource(msg.into())
    }

    /// Create a resolver error
    pub fn resolver(msg: impl Into<String>) -> Self {
        Self::Resolver(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a classifier-specific error
    pub fn source(classifier: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Source {
            classifier: classifier.into(),
            message: message.into(),
        }
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
