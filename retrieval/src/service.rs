//! Retrieval service implementation.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use rag_providers::{CompletionProvider, EmbeddingProvider, EmbeddingRequest};
use rag_similarity_store::{Document, SimilarityStore};

use crate::config::RetrievalConfig;
use crate::error::{Result, RetrievalError};
use crate::types::{Answer, NewDocument, SimilarDocument};

/// Answers questions from stored documents.
///
/// This is the main entry point of the system. It coordinates:
/// - Input validation
/// - Embedding generation for documents and questions
/// - Similarity search over the store
/// - Answer synthesis from the retrieved context
///
/// All collaborators are injected; the service holds no other state and is
/// safe to share between concurrent requests.
pub struct RetrievalService {
    /// Document storage and search.
    store: Arc<dyn SimilarityStore>,

    /// Embedding provider.
    embedder: Arc<dyn EmbeddingProvider>,

    /// Completion provider.
    completer: Arc<dyn CompletionProvider>,

    /// Configuration.
    config: RetrievalConfig,
}

impl RetrievalService {
    /// Create a service with the default configuration.
    pub fn new(
        store: Arc<dyn SimilarityStore>,
        embedder: Arc<dyn EmbeddingProvider>,
        completer: Arc<dyn CompletionProvider>,
    ) -> Self {
        Self {
            store,
            embedder,
            completer,
            config: RetrievalConfig::default(),
        }
    }

    /// Replace the configuration.
    pub fn with_config(mut self, config: RetrievalConfig) -> Self {
        self.config = config;
        self
    }

    /// The active configuration.
    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    /// The underlying store.
    pub fn store(&self) -> &Arc<dyn SimilarityStore> {
        &self.store
    }

    /// Ensure the store's collection exists.
    pub async fn initialize(&self) -> Result<()> {
        let store = &self.store;
        self.with_store_retry("initialize", move || store.initialize())
            .await?;
        info!("Retrieval service ready (store: {})", self.store.name());
        Ok(())
    }

    /// Drop every stored document.
    pub async fn reset(&self) -> Result<()> {
        self.store.reset().await?;
        Ok(())
    }

    /// Embed and store a batch of documents. Returns the number stored.
    ///
    /// The batch is rejected as a whole, before any provider call, when a
    /// document has empty content.
    pub async fn ingest(&self, documents: Vec<NewDocument>) -> Result<usize> {
        if let Some(index) = documents
            .iter()
            .position(|doc| doc.content.trim().is_empty())
        {
            return Err(RetrievalError::Validation(format!(
                "document {index} has empty content"
            )));
        }

        if documents.is_empty() {
            return Ok(0);
        }

        debug!("Embedding {} documents", documents.len());

        let requests: Vec<EmbeddingRequest> = documents
            .iter()
            .map(|doc| EmbeddingRequest::new(doc.content.as_str()))
            .collect();
        let embeddings = self.embedder.embed_batch(requests).await?;

        if embeddings.len() != documents.len() {
            return Err(RetrievalError::EmbeddingCountMismatch {
                expected: documents.len(),
                actual: embeddings.len(),
            });
        }

        let batch: Vec<Document> = documents
            .into_iter()
            .zip(embeddings)
            .map(|(doc, response)| {
                Document::new(doc.content, response.embedding).with_metadata(doc.metadata)
            })
            .collect();

        let store = &self.store;
        let batch = &batch;
        let stored = self
            .with_store_retry("upsert", move || store.upsert(batch.clone()))
            .await?;

        info!("Ingested {stored} documents");
        Ok(stored)
    }

    /// Answer a question using the configured number of documents.
    pub async fn answer(&self, question: &str) -> Result<Answer> {
        self.answer_with(question, self.config.top_k).await
    }

    /// Answer a question using up to `k` retrieved documents.
    pub async fn answer_with(&self, question: &str, k: usize) -> Result<Answer> {
        if question.trim().is_empty() {
            return Err(RetrievalError::Validation(
                "question must not be empty".to_string(),
            ));
        }
        if k == 0 {
            return Err(RetrievalError::Validation(
                "k must be a positive integer".to_string(),
            ));
        }

        let embedding = self
            .embedder
            .embed(EmbeddingRequest::new(question))
            .await?
            .embedding;

        let store = &self.store;
        let embedding = &embedding;
        let min_score = self.config.min_score;
        let hits = self
            .with_store_retry("query", move || store.query(embedding, k, min_score))
            .await?;

        debug!("Retrieved {} documents for question", hits.len());

        let context = hits
            .iter()
            .map(|hit| hit.content.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        let answer = self.completer.complete(question, &context).await?;

        Ok(Answer {
            answer,
            similar_documents: hits.into_iter().map(SimilarDocument::from).collect(),
        })
    }

    /// Run a store operation, retrying transient failures with linear backoff.
    async fn with_store_retry<T, F, Fut>(&self, operation: &str, mut call: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = rag_similarity_store::Result<T>>,
    {
        let mut attempt: u32 = 0;
        loop {
            match call().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && attempt < self.config.store_retries => {
                    attempt += 1;
                    warn!(
                        "Store {operation} failed (attempt {attempt} of {}): {err}",
                        self.config.store_retries + 1
                    );
                    let delay = self.config.retry_backoff_ms * u64::from(attempt);
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                }
                Err(err) => return Err(err.into()),
            }
        }
    }
}
