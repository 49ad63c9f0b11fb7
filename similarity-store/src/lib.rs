//! # Similarity Store
//!
//! Document storage and nearest-neighbour retrieval for the retrieval
//! service.
//!
//! ## Features
//!
//! - **Cosine Similarity**: Exact scoring on raw vectors
//! - **Top-k Queries**: Ordered by score, ties in insertion order
//! - **Multiple Backends**: In-process index or a Weaviate instance
//! - **Fixed Dimension**: Configured or established by the first upsert
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Similarity Store                             │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  Document ──► SimilarityStore ──► ScoredDocument               │
//! │                    │                                            │
//! │                    ▼                                            │
//! │          InMemoryStore / WeaviateStore                          │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod document;
pub mod error;
pub mod memory;
pub mod similarity;
pub mod store;
pub mod weaviate;

pub use config::StoreConfig;
pub use document::{Document, ScoredDocument};
pub use error::{DocumentFailure, Result, StoreError};
pub use memory::InMemoryStore;
pub use similarity::cosine_similarity;
pub use store::SimilarityStore;
pub use weaviate::WeaviateStore;

/// A dense vector embedding.
pub type Embedding = Vec<f32>;
