//! Configuration for similarity stores.

use serde::{Deserialize, Serialize};

/// Default Weaviate class holding the documents.
pub const DEFAULT_CLASS_NAME: &str = "Document";

/// Configuration shared by the store implementations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Base URL of the backing store (Weaviate).
    pub url: String,

    /// Name of the collection/class holding documents.
    pub class_name: String,

    /// Fixed vector dimension. When unset, the first upsert establishes it.
    pub dimension: Option<usize>,

    /// Documents per backend round trip.
    pub batch_size: usize,

    /// Per-request timeout for the backing store.
    pub request_timeout_secs: u64,
}

impl StoreConfig {
    /// Create a configuration pointing at the given store URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Set the class name.
    pub fn with_class_name(mut self, name: impl Into<String>) -> Self {
        self.class_name = name.into();
        self
    }

    /// Fix the vector dimension.
    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = Some(dimension);
        self
    }

    /// Set the batch size. Values below one are clamped to one.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Set the request timeout.
    pub fn with_request_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8080".to_string(),
            class_name: DEFAULT_CLASS_NAME.to_string(),
            dimension: None,
            batch_size: 100,
            request_timeout_secs: 30,
        }
    }
}
