//! Request and response shapes of the retrieval service.

use serde::{Deserialize, Serialize};

use rag_similarity_store::ScoredDocument;

/// A document submitted for ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDocument {
    /// Document text. Must not be empty.
    pub content: String,

    /// Free-form metadata, empty when absent.
    #[serde(default)]
    pub metadata: String,
}

impl NewDocument {
    /// Create a document without metadata.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            metadata: String::new(),
        }
    }

    /// Set the metadata.
    pub fn with_metadata(mut self, metadata: impl Into<String>) -> Self {
        self.metadata = metadata.into();
        self
    }
}

/// A document used as context for an answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimilarDocument {
    pub content: String,
    pub metadata: String,
}

impl From<ScoredDocument> for SimilarDocument {
    fn from(doc: ScoredDocument) -> Self {
        Self {
            content: doc.content,
            metadata: doc.metadata,
        }
    }
}

/// The answer to a question with the documents it was based on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    /// Completion text, verbatim.
    pub answer: String,

    /// Retrieved documents, most similar first.
    pub similar_documents: Vec<SimilarDocument>,
}
