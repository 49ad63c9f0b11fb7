//! # Retrieval Service
//!
//! Retrieval-augmented answering over a similarity store:
//!
//! - **Ingest**: validate documents, embed them, store them in one batch
//! - **Answer**: embed the question, retrieve the top-k documents, and ask
//!   the completion model with the retrieved context
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      Retrieval Service                          │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                                                                  │
//! │   question ──► EmbeddingProvider ──► SimilarityStore.query      │
//! │                                            │                     │
//! │                                            ▼                     │
//! │   Answer  ◄── CompletionProvider ◄── joined context             │
//! │                                                                  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use rag_retrieval::{NewDocument, RetrievalService};
//!
//! let service = RetrievalService::new(store, embedder, completer);
//! service.initialize().await?;
//! service.ingest(vec![NewDocument::new("The cat sat on the mat")]).await?;
//!
//! let answer = service.answer("Where did the cat sit?").await?;
//! ```

pub mod config;
pub mod error;
pub mod service;
pub mod types;

pub use config::RetrievalConfig;
pub use error::{Result, RetrievalError};
pub use service::RetrievalService;
pub use types::{Answer, NewDocument, SimilarDocument};

// Re-export from dependencies for convenience
pub use rag_providers::{CompletionProvider, EmbeddingProvider};
pub use rag_similarity_store::SimilarityStore;
