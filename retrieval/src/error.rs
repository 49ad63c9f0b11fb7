//! Error types for the retrieval service.

use thiserror::Error;

/// Result type alias for retrieval operations.
pub type Result<T> = std::result::Result<T, RetrievalError>;

/// Errors that can occur in the retrieval service.
#[derive(Error, Debug)]
pub enum RetrievalError {
    /// Caller input rejected before any provider or store call.
    #[error("validation error: {0}")]
    Validation(String),

    /// Similarity store error.
    #[error("storage error: {0}")]
    Storage(#[from] rag_similarity_store::StoreError),

    /// Embedding or completion provider error.
    #[error("provider error: {0}")]
    Provider(#[from] rag_providers::ProviderError),

    /// The embedding provider returned the wrong number of vectors.
    #[error("embedding provider returned {actual} embeddings for {expected} documents")]
    EmbeddingCountMismatch { expected: usize, actual: usize },
}

impl RetrievalError {
    /// Whether the error is the caller's fault.
    pub fn is_validation(&self) -> bool {
        matches!(self, RetrievalError::Validation(_))
    }
}
