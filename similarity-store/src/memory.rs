//! In-process similarity store.

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::document::{Document, ScoredDocument};
use crate::error::Result;
use crate::similarity::{cosine_similarity, top_k};
use crate::store::{DimensionGuard, SimilarityStore, validate_k};

/// A similarity store that keeps documents in memory.
///
/// Queries scan every document and compute exact cosine similarity on the
/// raw vectors. Documents are kept in insertion order.
pub struct InMemoryStore {
    /// Stored documents, oldest first.
    documents: RwLock<Vec<Document>>,

    /// Fixed vector dimension.
    dimension: DimensionGuard,
}

impl InMemoryStore {
    /// Create a store whose dimension is set by the first upsert.
    pub fn new() -> Self {
        Self {
            documents: RwLock::new(Vec::new()),
            dimension: DimensionGuard::new(None),
        }
    }

    /// Create a store with a fixed dimension.
    pub fn with_dimension(dimension: usize) -> Self {
        Self {
            documents: RwLock::new(Vec::new()),
            dimension: DimensionGuard::new(Some(dimension)),
        }
    }

    /// The dimension in force, if known yet.
    pub async fn dimension(&self) -> Option<usize> {
        self.dimension.get().await
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SimilarityStore for InMemoryStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn initialize(&self) -> Result<()> {
        Ok(())
    }

    async fn upsert(&self, documents: Vec<Document>) -> Result<usize> {
        if documents.is_empty() {
            return Ok(0);
        }

        // Held across admit so a concurrent reset cannot split the two.
        let mut stored = self.documents.write().await;
        self.dimension.admit(&documents).await?;

        let count = documents.len();
        stored.extend(documents);
        debug!("Stored {count} documents in memory");

        Ok(count)
    }

    async fn query(
        &self,
        vector: &[f32],
        k: usize,
        min_score: Option<f32>,
    ) -> Result<Vec<ScoredDocument>> {
        validate_k(k)?;
        if !self.dimension.check_query(vector).await? {
            return Ok(Vec::new());
        }

        let documents = self.documents.read().await;
        let mut scored = Vec::with_capacity(documents.len());
        for doc in documents.iter() {
            scored.push((cosine_similarity(vector, &doc.embedding)?, doc));
        }

        let results: Vec<ScoredDocument> = top_k(scored, k, min_score)
            .into_iter()
            .map(|(score, doc)| ScoredDocument {
                id: doc.id.clone(),
                content: doc.content.clone(),
                metadata: doc.metadata.clone(),
                score,
            })
            .collect();

        debug!(
            "Query over {} documents returned {} results",
            documents.len(),
            results.len()
        );
        Ok(results)
    }

    async fn reset(&self) -> Result<()> {
        let mut stored = self.documents.write().await;
        stored.clear();
        self.dimension.reset().await;
        info!("Cleared in-memory similarity store");
        Ok(())
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.documents.read().await.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use pretty_assertions::assert_eq;

    fn doc(content: &str, metadata: &str, embedding: Vec<f32>) -> Document {
        Document::new(content, embedding).with_metadata(metadata)
    }

    #[tokio::test]
    async fn test_initialize_is_idempotent() {
        let store = InMemoryStore::new();
        store.initialize().await.unwrap();
        store
            .upsert(vec![doc("kept", "", vec![1.0, 0.0])])
            .await
            .unwrap();
        store.initialize().await.unwrap();
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_round_trip_with_distractors() {
        let store = InMemoryStore::new();
        store
            .upsert(vec![
                doc("distractor", "doc2", vec![0.0, 1.0, 0.0]),
                doc("The cat sat on the mat", "doc1", vec![1.0, 0.0, 0.0]),
                doc("near miss", "doc3", vec![0.6, 0.8, 0.0]),
            ])
            .await
            .unwrap();

        let results = store.query(&[1.0, 0.0, 0.0], 1, None).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].content, "The cat sat on the mat");
        assert_eq!(results[0].metadata, "doc1");
        assert!((results[0].score - 1.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_ranking_order() {
        let store = InMemoryStore::new();
        store
            .upsert(vec![
                doc("A", "", vec![1.0, 0.0, 0.0]),
                doc("B", "", vec![0.0, 1.0, 0.0]),
            ])
            .await
            .unwrap();

        let results = store.query(&[1.0, 0.0, 0.0], 2, None).await.unwrap();
        let contents: Vec<&str> = results.iter().map(|r| r.content.as_str()).collect();
        assert_eq!(contents, vec!["A", "B"]);
        assert!(results[0].score > results[1].score);
    }

    #[tokio::test]
    async fn test_limit_respected_and_oversized_k() {
        let store = InMemoryStore::new();
        store
            .upsert(vec![
                doc("one", "", vec![1.0, 0.0]),
                doc("two", "", vec![0.5, 0.5]),
                doc("three", "", vec![0.0, 1.0]),
            ])
            .await
            .unwrap();

        assert_eq!(store.query(&[1.0, 0.0], 2, None).await.unwrap().len(), 2);
        assert_eq!(store.query(&[1.0, 0.0], 10, None).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_ties_follow_insertion_order() {
        let store = InMemoryStore::new();
        store
            .upsert(vec![doc("first", "", vec![2.0, 0.0])])
            .await
            .unwrap();
        store
            .upsert(vec![
                doc("second", "", vec![1.0, 0.0]),
                doc("third", "", vec![5.0, 0.0]),
            ])
            .await
            .unwrap();

        let results = store.query(&[1.0, 0.0], 3, None).await.unwrap();
        let contents: Vec<&str> = results.iter().map(|r| r.content.as_str()).collect();
        assert_eq!(contents, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_empty_store_returns_nothing() {
        let store = InMemoryStore::new();
        assert!(store.query(&[1.0, 0.0, 0.0], 3, None).await.unwrap().is_empty());

        let fixed = InMemoryStore::with_dimension(3);
        assert!(fixed.query(&[1.0, 0.0, 0.0], 3, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_min_score_filters_results() {
        let store = InMemoryStore::new();
        store
            .upsert(vec![
                doc("close", "", vec![1.0, 0.1]),
                doc("far", "", vec![0.0, 1.0]),
            ])
            .await
            .unwrap();

        let results = store.query(&[1.0, 0.0], 5, Some(0.5)).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].content, "close");

        assert!(store.query(&[1.0, 0.0], 5, Some(1.5)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_zero_k_is_invalid() {
        let store = InMemoryStore::new();
        assert!(matches!(
            store.query(&[1.0], 0, None).await,
            Err(StoreError::InvalidArgument(_))
        ));
    }

    #[tokio::test]
    async fn test_dimension_mismatch_rejects_batch() {
        let store = InMemoryStore::with_dimension(3);
        let err = store
            .upsert(vec![
                doc("ok", "", vec![1.0, 0.0, 0.0]),
                doc("bad", "", vec![1.0, 0.0]),
            ])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DimensionMismatch { .. }));
        assert_eq!(store.count().await.unwrap(), 0);

        assert!(matches!(
            store.query(&[1.0, 0.0], 1, None).await,
            Err(StoreError::DimensionMismatch {
                expected: 3,
                actual: 2
            })
        ));
    }

    #[tokio::test]
    async fn test_reset_empties_store() {
        let store = InMemoryStore::new();
        store
            .upsert(vec![doc("gone", "", vec![1.0, 0.0])])
            .await
            .unwrap();
        store.reset().await.unwrap();

        assert_eq!(store.count().await.unwrap(), 0);
        assert_eq!(store.dimension().await, None);
        store
            .upsert(vec![doc("new shape", "", vec![1.0, 0.0, 0.0])])
            .await
            .unwrap();
        assert_eq!(store.dimension().await, Some(3));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_reset_during_upserts_keeps_one_dimension() {
        let store = std::sync::Arc::new(InMemoryStore::new());

        let writer = {
            let store = std::sync::Arc::clone(&store);
            tokio::spawn(async move {
                for _ in 0..200 {
                    let _ = store.upsert(vec![doc("two", "", vec![1.0, 0.0])]).await;
                }
            })
        };
        let resetter = {
            let store = std::sync::Arc::clone(&store);
            tokio::spawn(async move {
                for _ in 0..200 {
                    store.reset().await.unwrap();
                    let _ = store
                        .upsert(vec![doc("three", "", vec![1.0, 0.0, 0.0])])
                        .await;
                    tokio::task::yield_now().await;
                }
            })
        };
        writer.await.unwrap();
        resetter.await.unwrap();

        let dimension = store.dimension().await;
        let documents = store.documents.read().await;
        assert!(!documents.is_empty());
        for document in documents.iter() {
            assert_eq!(Some(document.dimension()), dimension);
        }
    }
}
