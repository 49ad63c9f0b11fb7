//! Weaviate-backed similarity store.
//!
//! Talks to the Weaviate REST API for schema and batch operations and to its
//! GraphQL endpoint for `nearVector` search. The class is created with the
//! cosine distance metric, so `score = 1 - distance`.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::config::StoreConfig;
use crate::document::{Document, ScoredDocument};
use crate::error::{DocumentFailure, Result, StoreError};
use crate::similarity::top_k;
use crate::store::{DimensionGuard, SimilarityStore, validate_k};

/// A similarity store backed by a Weaviate instance.
pub struct WeaviateStore {
    /// HTTP client.
    client: reqwest::Client,

    /// Base URL without trailing slash.
    base_url: String,

    /// Weaviate class holding the documents.
    class_name: String,

    /// Documents per batch request.
    batch_size: usize,

    /// Fixed vector dimension.
    dimension: DimensionGuard,
}

impl WeaviateStore {
    /// Create a store from configuration. Does not contact the backend.
    pub fn new(config: &StoreConfig) -> Result<Self> {
        validate_class_name(&config.class_name)?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            class_name: config.class_name.clone(),
            batch_size: config.batch_size.max(1),
            dimension: DimensionGuard::new(config.dimension),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Whether the class already exists.
    async fn class_exists(&self) -> Result<bool> {
        let response = self
            .client
            .get(self.url(&format!("/v1/schema/{}", self.class_name)))
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(false);
        }
        check_status(response, "schema lookup").await?;
        Ok(true)
    }

    async fn create_class(&self) -> Result<()> {
        let schema = json!({
            "class": self.class_name,
            "vectorizer": "none",
            "vectorIndexConfig": { "distance": "cosine" },
            "properties": [
                { "name": "content", "dataType": ["text"] },
                { "name": "metadata", "dataType": ["text"] }
            ]
        });

        let response = self
            .client
            .post(self.url("/v1/schema"))
            .json(&schema)
            .send()
            .await?;

        // Another process may have created the class between lookup and create.
        if response.status() == reqwest::StatusCode::UNPROCESSABLE_ENTITY {
            let body = response.text().await.unwrap_or_default();
            if body.contains("already exists") {
                debug!("Class {} created concurrently", self.class_name);
                return Ok(());
            }
            return Err(StoreError::Backend(format!("schema create: {body}")));
        }

        check_status(response, "schema create").await?;
        info!("Created Weaviate class {} (cosine)", self.class_name);
        Ok(())
    }

    async fn delete_class(&self) -> Result<()> {
        let response = self
            .client
            .delete(self.url(&format!("/v1/schema/{}", self.class_name)))
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            debug!("Class {} not found, nothing to drop", self.class_name);
            return Ok(());
        }
        check_status(response, "schema delete").await?;
        Ok(())
    }

    /// Send one batch; returns the failures, indexed from `offset`.
    async fn send_batch(&self, batch: &[Document], offset: usize) -> Result<Vec<DocumentFailure>> {
        let objects: Vec<serde_json::Value> = batch
            .iter()
            .map(|doc| {
                json!({
                    "class": self.class_name,
                    "id": doc.id,
                    "properties": {
                        "content": doc.content,
                        "metadata": doc.metadata,
                    },
                    "vector": doc.embedding,
                })
            })
            .collect();

        let response = self
            .client
            .post(self.url("/v1/batch/objects"))
            .json(&json!({ "objects": objects }))
            .send()
            .await?;
        let response = check_status(response, "batch upsert").await?;
        let results: Vec<BatchObjectResult> = response.json().await?;

        let failures = results
            .into_iter()
            .enumerate()
            .filter_map(|(position, object)| {
                let errors = object.result?.errors?;
                let message = errors
                    .error
                    .into_iter()
                    .map(|e| e.message)
                    .collect::<Vec<_>>()
                    .join("; ");
                Some(DocumentFailure {
                    index: offset + position,
                    message,
                })
            })
            .collect();

        Ok(failures)
    }

    async fn graphql(&self, query: String) -> Result<serde_json::Value> {
        let response = self
            .client
            .post(self.url("/v1/graphql"))
            .json(&json!({ "query": query }))
            .send()
            .await?;
        let response = check_status(response, "graphql").await?;
        let body: GraphQlResponse = response.json().await?;

        if let Some(errors) = body.errors.filter(|e| !e.is_empty()) {
            let message = errors
                .into_iter()
                .map(|e| e.message)
                .collect::<Vec<_>>()
                .join("; ");
            return Err(StoreError::Backend(format!("graphql: {message}")));
        }

        body.data
            .ok_or_else(|| StoreError::Backend("graphql: response without data".to_string()))
    }
}

#[async_trait]
impl SimilarityStore for WeaviateStore {
    fn name(&self) -> &str {
        "weaviate"
    }

    async fn initialize(&self) -> Result<()> {
        if self.class_exists().await? {
            debug!("Class {} already exists", self.class_name);
            return Ok(());
        }
        self.create_class().await
    }

    async fn upsert(&self, documents: Vec<Document>) -> Result<usize> {
        if documents.is_empty() {
            return Ok(0);
        }

        self.dimension.admit(&documents).await?;

        let mut failures = Vec::new();
        for (chunk_index, batch) in documents.chunks(self.batch_size).enumerate() {
            let offset = chunk_index * self.batch_size;
            match self.send_batch(batch, offset).await {
                Ok(batch_failures) => failures.extend(batch_failures),
                Err(err) => {
                    warn!(
                        "Batch upsert aborted after {offset} of {} documents: {err}",
                        documents.len()
                    );
                    return Err(err);
                }
            }
        }

        let stored = documents.len() - failures.len();
        if !failures.is_empty() {
            warn!("{} documents rejected by Weaviate", failures.len());
            return Err(StoreError::PartialBatch { stored, failures });
        }

        debug!("Stored {stored} documents in class {}", self.class_name);
        Ok(stored)
    }

    async fn query(
        &self,
        vector: &[f32],
        k: usize,
        min_score: Option<f32>,
    ) -> Result<Vec<ScoredDocument>> {
        validate_k(k)?;
        // An unknown dimension only means nothing was stored by this process.
        self.dimension.check_query(vector).await?;

        let mut near_vector = format!("vector: {}", serde_json::to_string(vector)?);
        if let Some(min) = min_score {
            near_vector.push_str(&format!(", distance: {}", 1.0 - min));
        }
        let query = format!(
            "{{ Get {{ {class}(nearVector: {{ {near_vector} }}, limit: {k}) \
             {{ content metadata _additional {{ id distance }} }} }} }}",
            class = self.class_name
        );

        let data = self.graphql(query).await?;
        let hits: Vec<Hit> = match data.get("Get").and_then(|g| g.get(&self.class_name)) {
            Some(serde_json::Value::Null) | None => Vec::new(),
            Some(value) => serde_json::from_value(value.clone())?,
        };

        // Re-sort on the client so ties follow id (creation) order.
        let mut scored: Vec<(f32, Hit)> = hits
            .into_iter()
            .map(|hit| (1.0 - hit.additional.distance.unwrap_or(1.0), hit))
            .collect();
        scored.sort_by(|a, b| a.1.additional.id.cmp(&b.1.additional.id));

        let results: Vec<ScoredDocument> = top_k(scored, k, min_score)
            .into_iter()
            .map(|(score, hit)| ScoredDocument {
                id: hit.additional.id,
                content: hit.content.unwrap_or_default(),
                metadata: hit.metadata.unwrap_or_default(),
                score,
            })
            .collect();

        debug!("Weaviate query returned {} results", results.len());
        Ok(results)
    }

    async fn reset(&self) -> Result<()> {
        self.delete_class().await?;
        self.dimension.reset().await;
        self.create_class().await?;
        info!("Reset Weaviate class {}", self.class_name);
        Ok(())
    }

    async fn count(&self) -> Result<usize> {
        let query = format!(
            "{{ Aggregate {{ {class} {{ meta {{ count }} }} }} }}",
            class = self.class_name
        );
        let data = self.graphql(query).await?;

        let count = data
            .get("Aggregate")
            .and_then(|a| a.get(&self.class_name))
            .and_then(|c| c.get(0))
            .and_then(|c| c.pointer("/meta/count"))
            .and_then(serde_json::Value::as_u64)
            .unwrap_or(0);

        Ok(usize::try_from(count).unwrap_or(usize::MAX))
    }
}

/// Weaviate class names are GraphQL identifiers starting with a capital.
fn validate_class_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = chars.next().is_some_and(|c| c.is_ascii_uppercase())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !valid {
        return Err(StoreError::InvalidArgument(format!(
            "invalid class name: {name:?}"
        )));
    }
    Ok(())
}

/// Map a non-success response to a store error; 5xx is retryable.
async fn check_status(response: reqwest::Response, action: &str) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = format!("{action}: {status} {body}");
    if status.is_server_error() {
        Err(StoreError::Unavailable(message))
    } else {
        Err(StoreError::Backend(message))
    }
}

#[derive(Debug, Deserialize)]
struct BatchObjectResult {
    result: Option<BatchResult>,
}

#[derive(Debug, Deserialize)]
struct BatchResult {
    errors: Option<BatchErrors>,
}

#[derive(Debug, Deserialize)]
struct BatchErrors {
    #[serde(default)]
    error: Vec<ErrorMessage>,
}

#[derive(Debug, Deserialize)]
struct ErrorMessage {
    message: String,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    data: Option<serde_json::Value>,
    errors: Option<Vec<ErrorMessage>>,
}

#[derive(Debug, Deserialize)]
struct Hit {
    content: Option<String>,
    metadata: Option<String>,
    #[serde(rename = "_additional")]
    additional: Additional,
}

#[derive(Debug, Deserialize)]
struct Additional {
    id: String,
    distance: Option<f32>,
}
