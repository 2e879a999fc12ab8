//! Error types raised by data store implementations.

use thiserror::Error;

/// Errors surfaced by [`super::DataStore`] implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid key '{0}': keys are '/'-separated non-empty segments without '.' or '..'")]
    InvalidKey(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;
