//! Stored documents and query results.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Embedding;

/// A text document together with its embedding.
///
/// Documents are immutable once stored. The id is a UUID v7, so ordering ids
/// lexicographically follows creation order; stores rely on this to break
/// score ties by insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Opaque identifier.
    pub id: String,

    /// Document text.
    pub content: String,

    /// Free-form metadata, empty when absent.
    #[serde(default)]
    pub metadata: String,

    /// Embedding of `content`.
    pub embedding: Embedding,
}

impl Document {
    /// Create a document with a fresh time-ordered id.
    pub fn new(content: impl Into<String>, embedding: Embedding) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            content: content.into(),
            metadata: String::new(),
            embedding,
        }
    }

    /// Set the metadata.
    pub fn with_metadata(mut self, metadata: impl Into<String>) -> Self {
        self.metadata = metadata.into();
        self
    }

    /// Set an explicit id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Length of the embedding.
    pub fn dimension(&self) -> usize {
        self.embedding.len()
    }
}

/// A document returned by a similarity query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredDocument {
    /// Identifier of the stored document.
    pub id: String,

    /// Document text.
    pub content: String,

    /// Document metadata.
    pub metadata: String,

    /// Cosine similarity to the query vector.
    pub score: f32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_ids_follow_creation_order() {
        let first = Document::new("first", vec![1.0]);
        let second = Document::new("second", vec![1.0]);
        assert!(first.id < second.id);
    }

    #[test]
    fn test_metadata_defaults_to_empty() {
        let doc: Document =
            serde_json::from_str(r#"{"id":"a","content":"text","embedding":[0.5]}"#).unwrap();
        assert_eq!(doc.metadata, "");
        assert_eq!(doc.dimension(), 1);
    }
}
