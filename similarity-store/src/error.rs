//! Error types for the similarity store.

use thiserror::Error;

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// A single document that the backend refused during an upsert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentFailure {
    /// Position of the document in the upsert input.
    pub index: usize,

    /// Backend-provided reason.
    pub message: String,
}

/// Errors that can occur in the similarity store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Backend unreachable or temporarily failing. Safe to retry.
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),

    /// Backend rejected the request.
    #[error("storage backend error: {0}")]
    Backend(String),

    /// Some documents of a batch were not stored.
    #[error("{} documents failed to store ({stored} stored): {}", .failures.len(), first_failure(.failures))]
    PartialBatch {
        stored: usize,
        failures: Vec<DocumentFailure>,
    },

    /// Vector length does not match the store dimension.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Caller passed an argument outside the operation contract.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    /// Whether the same call may succeed if issued again unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() || err.is_request() {
            StoreError::Unavailable(err.to_string())
        } else {
            StoreError::Backend(err.to_string())
        }
    }
}

fn first_failure(failures: &[DocumentFailure]) -> String {
    failures
        .first()
        .map(|f| format!("document {}: {}", f.index, f.message))
        .unwrap_or_default()
}
