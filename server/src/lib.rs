//! HTTP front end for the retrieval service.
//!
//! Wires the configured store and model providers into a
//! [`RetrievalService`] and serves it over axum.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use rag_providers::{EmbeddingProvider, OpenAICompletionProvider, OpenAIProvider};
use rag_retrieval::RetrievalService;
use rag_similarity_store::{InMemoryStore, SimilarityStore, WeaviateStore};

pub mod config;
pub mod routes;

pub use config::{OpenAIConfig, ServerConfig};
pub use routes::router;

/// Construct the store, the providers and the service from configuration.
///
/// Nothing is contacted here; call [`RetrievalService::initialize`] next.
pub fn build_service(config: &ServerConfig) -> Result<RetrievalService> {
    let store: Arc<dyn SimilarityStore> = if config.in_memory {
        match config.store.dimension {
            Some(dimension) => Arc::new(InMemoryStore::with_dimension(dimension)),
            None => Arc::new(InMemoryStore::new()),
        }
    } else {
        Arc::new(WeaviateStore::new(&config.store)?)
    };
    info!("Using {} similarity store", store.name());

    let openai = &config.openai;
    let timeout = Duration::from_secs(openai.request_timeout_secs);

    let mut embedder = OpenAIProvider::new()
        .with_base_url(openai.base_url.as_str())
        .with_model(openai.embedding_model.as_str())
        .with_timeout(timeout)?;
    let mut completer = OpenAICompletionProvider::new()
        .with_base_url(openai.base_url.as_str())
        .with_model(openai.completion_model.as_str())
        .with_timeout(timeout)?;
    if let Some(key) = &openai.api_key {
        embedder = embedder.with_api_key(key.as_str());
        completer = completer.with_api_key(key.as_str());
    }

    if !embedder.is_available() {
        warn!("OPENAI_API_KEY is not set; ingest and query requests will fail");
    }

    Ok(
        RetrievalService::new(store, Arc::new(embedder), Arc::new(completer))
            .with_config(config.retrieval.clone()),
    )
}

/// Serve the API on `listener` until `shutdown` resolves.
pub async fn serve(
    listener: TcpListener,
    service: Arc<RetrievalService>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!("Listening on http://{addr}");
    }

    axum::serve(listener, router(service))
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Resolve once `signal` fires.
///
/// If the signal cannot be installed the error is logged and the returned
/// future never resolves, so the server keeps running.
pub async fn shutdown_signal<E: std::fmt::Display>(
    signal: impl Future<Output = std::result::Result<(), E>>,
) {
    if let Err(err) = signal.await {
        error!("Failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_signal_triggers_shutdown() {
        let signal = async { Ok::<(), std::io::Error>(()) };
        tokio::time::timeout(Duration::from_secs(1), shutdown_signal(signal))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_failed_signal_keeps_serving() {
        let signal = async { Err::<(), _>(std::io::Error::other("no signal handler")) };
        let waited =
            tokio::time::timeout(Duration::from_millis(100), shutdown_signal(signal)).await;
        assert!(waited.is_err());
    }
}
