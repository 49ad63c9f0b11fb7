//! Configuration for the retrieval service.

use serde::{Deserialize, Serialize};

/// Configuration for the retrieval service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Number of documents retrieved per question.
    pub top_k: usize,

    /// Minimum cosine similarity for a document to be used as context.
    pub min_score: Option<f32>,

    /// Extra attempts for store operations failing with a transient error.
    pub store_retries: u32,

    /// Base delay between store retries; attempt `n` waits `n` times this.
    pub retry_backoff_ms: u64,
}

impl RetrievalConfig {
    /// Set the number of documents retrieved per question.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Set the minimum similarity threshold.
    pub fn with_min_score(mut self, min_score: f32) -> Self {
        self.min_score = Some(min_score);
        self
    }

    /// Set the retry policy for transient store failures.
    pub fn with_store_retries(mut self, retries: u32, backoff_ms: u64) -> Self {
        self.store_retries = retries;
        self.retry_backoff_ms = backoff_ms;
        self
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 3,
            min_score: None,
            store_retries: 2,
            retry_backoff_ms: 200,
        }
    }
}
