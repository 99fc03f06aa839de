//! Error types for Petal.

use thiserror::Error;

/// The error type for all fallible Petal operations.
#[derive(Error, Debug)]
pub enum PetalError {
    /// A caller broke an API contract (e.g. a null token or a document
    /// without a reference value).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A named item (pipeline step, registered filter) does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Index or engine configuration could not be applied.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl PetalError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        PetalError::InvalidArgument(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        PetalError::NotFound(msg.into())
    }

    pub fn invalid_config(msg: impl Into<String>) -> Self {
        PetalError::InvalidConfig(msg.into())
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PetalError>;
