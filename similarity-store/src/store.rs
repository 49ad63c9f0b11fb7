//! The similarity store contract.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::document::{Document, ScoredDocument};
use crate::error::{Result, StoreError};

/// Durable document storage with cosine nearest-neighbour search.
///
/// Implementations must be safe to share between concurrent requests.
#[async_trait]
pub trait SimilarityStore: Send + Sync {
    /// Backend label used in logs.
    fn name(&self) -> &str;

    /// Ensure the backing collection exists. Calling it again is a no-op.
    async fn initialize(&self) -> Result<()>;

    /// Store documents, each one with its content, metadata and vector
    /// together. Returns the number of documents stored.
    async fn upsert(&self, documents: Vec<Document>) -> Result<usize>;

    /// Return up to `k` documents ordered by decreasing cosine similarity to
    /// `vector`, ties in insertion order. An empty store yields no results.
    async fn query(
        &self,
        vector: &[f32],
        k: usize,
        min_score: Option<f32>,
    ) -> Result<Vec<ScoredDocument>>;

    /// Drop and recreate the empty collection.
    async fn reset(&self) -> Result<()>;

    /// Number of stored documents.
    async fn count(&self) -> Result<usize>;
}

/// Tracks the fixed vector dimension of a store.
///
/// The dimension is either configured up front or established by the first
/// accepted upsert. `reset` returns to the configured value.
#[derive(Debug)]
pub struct DimensionGuard {
    configured: Option<usize>,
    current: RwLock<Option<usize>>,
}

impl DimensionGuard {
    /// Create a guard, optionally with a fixed dimension.
    pub fn new(configured: Option<usize>) -> Self {
        Self {
            configured,
            current: RwLock::new(configured),
        }
    }

    /// The dimension in force, if known yet.
    pub async fn get(&self) -> Option<usize> {
        *self.current.read().await
    }

    /// Check that every document matches the store dimension, establishing
    /// it from the batch when none is known yet.
    pub async fn admit(&self, documents: &[Document]) -> Result<()> {
        let Some(first) = documents.first() else {
            return Ok(());
        };

        let batch_dimension = first.dimension();
        if batch_dimension == 0 {
            return Err(StoreError::InvalidArgument(
                "embedding must not be empty".to_string(),
            ));
        }
        if let Some(doc) = documents.iter().find(|d| d.dimension() != batch_dimension) {
            return Err(StoreError::DimensionMismatch {
                expected: batch_dimension,
                actual: doc.dimension(),
            });
        }

        let mut current = self.current.write().await;
        match *current {
            Some(expected) if expected != batch_dimension => Err(StoreError::DimensionMismatch {
                expected,
                actual: batch_dimension,
            }),
            Some(_) => Ok(()),
            None => {
                *current = Some(batch_dimension);
                Ok(())
            }
        }
    }

    /// Check a query vector. Returns `false` when no dimension is known yet,
    /// meaning the store cannot hold any documents.
    pub async fn check_query(&self, vector: &[f32]) -> Result<bool> {
        match self.get().await {
            Some(expected) if expected != vector.len() => Err(StoreError::DimensionMismatch {
                expected,
                actual: vector.len(),
            }),
            Some(_) => Ok(true),
            None => Ok(false),
        }
    }

    /// Forget a dimension learned from data.
    pub async fn reset(&self) {
        *self.current.write().await = self.configured;
    }
}

/// Reject `k == 0` before touching the backend.
pub(crate) fn validate_k(k: usize) -> Result<()> {
    if k == 0 {
        return Err(StoreError::InvalidArgument(
            "k must be a positive integer".to_string(),
        ));
    }
    Ok(())
}
