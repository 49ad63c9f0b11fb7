//! # Providers
//!
//! Clients for the external models used by the retrieval service.
//!
//! ## Features
//!
//! - **Embedding Generation**: Convert text to dense vectors
//! - **Answer Synthesis**: Chat completion over retrieved context
//! - **Pluggable**: Both sit behind traits so callers can inject doubles
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         Providers                               │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  EmbeddingProvider ──► OpenAIProvider            (/embeddings)  │
//! │  CompletionProvider ─► OpenAICompletionProvider  (/chat/...)    │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod completion;
pub mod error;
pub mod provider;

pub use completion::{CompletionProvider, OpenAICompletionProvider};
pub use error::{ProviderError, Result};
pub use provider::{EmbeddingProvider, EmbeddingRequest, EmbeddingResponse, OpenAIProvider};
