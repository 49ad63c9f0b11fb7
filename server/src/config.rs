//! Server configuration.
//!
//! Loaded from an optional TOML file, then overridden from the environment.

use std::num::NonZeroUsize;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use rag_providers::completion::DEFAULT_COMPLETION_MODEL;
use rag_providers::provider::{DEFAULT_BASE_URL, DEFAULT_EMBEDDING_MODEL};
use rag_retrieval::RetrievalConfig;
use rag_similarity_store::StoreConfig;

/// Top-level configuration of the server process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to listen on.
    pub bind: String,

    /// Use the in-process store instead of Weaviate.
    pub in_memory: bool,

    /// Similarity store configuration.
    pub store: StoreConfig,

    /// Retrieval configuration.
    pub retrieval: RetrievalConfig,

    /// Model provider configuration.
    pub openai: OpenAIConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8000".to_string(),
            in_memory: false,
            store: StoreConfig::default(),
            retrieval: RetrievalConfig::default(),
            openai: OpenAIConfig::default(),
        }
    }
}

/// Configuration for the OpenAI-compatible model API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAIConfig {
    /// API base URL.
    pub base_url: String,

    /// API key. Never written back out.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Model used for document and question embeddings.
    pub embedding_model: String,

    /// Model used for answers.
    pub completion_model: String,

    /// Per-request timeout.
    pub request_timeout_secs: u64,
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            completion_model: DEFAULT_COMPLETION_MODEL.to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl ServerConfig {
    /// Load from a TOML file, or defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    /// Parse a TOML document.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the service cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.retrieval.top_k == 0 {
            bail!("retrieval.top_k must be a positive integer");
        }
        if self.store.dimension == Some(0) {
            bail!("store.dimension must be a positive integer");
        }
        Ok(())
    }

    /// Apply environment overrides read through `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(url) = lookup("WEAVIATE_URL") {
            self.store.url = url;
        }
        if let Some(key) = lookup("OPENAI_API_KEY").filter(|k| !k.is_empty()) {
            self.openai.api_key = Some(key);
        }
        if let Some(url) = lookup("OPENAI_BASE_URL") {
            self.openai.base_url = url;
        }
        if let Some(model) = lookup("RAG_EMBEDDING_MODEL") {
            self.openai.embedding_model = model;
        }
        if let Some(model) = lookup("RAG_COMPLETION_MODEL") {
            self.openai.completion_model = model;
        }
        if let Some(bind) = lookup("RAG_BIND") {
            self.bind = bind;
        }
        if let Some(top_k) = lookup("RAG_TOP_K") {
            self.retrieval.top_k = top_k
                .parse::<NonZeroUsize>()
                .map(NonZeroUsize::get)
                .with_context(|| format!("RAG_TOP_K must be a positive integer, got {top_k:?}"))?;
        }
        if let Some(dimension) = lookup("RAG_DIMENSION") {
            let dimension = dimension
                .parse::<NonZeroUsize>()
                .map(NonZeroUsize::get)
                .with_context(|| {
                    format!("RAG_DIMENSION must be a positive integer, got {dimension:?}")
                })?;
            self.store.dimension = Some(dimension);
        }
        Ok(())
    }
}
