//! Context retrieval
//!
//! Queries an external vector-search service for passages relevant to a text
//! query. The service owns ranking; results keep its descending-score order.

use crate::error::ApiError;
use crate::provider::build_provider_http_client;
use crate::types::ContextChunk;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

pub const DEFAULT_K: usize = 10;
pub const DEFAULT_MIN_SCORE: f64 = 0.5;

/// Vector search capability
#[async_trait]
pub trait VectorSearch: Send + Sync {
    async fn search(
        &self,
        query: &str,
        k: usize,
        min_score: f64,
        namespaces: &[String],
    ) -> Result<Vec<ContextChunk>, ApiError>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchRequest<'a> {
    query: &'a str,
    k: usize,
    min_score: f64,
    #[serde(skip_serializing_if = "no_namespaces")]
    namespaces: &'a [String],
}

fn no_namespaces(namespaces: &&[String]) -> bool {
    namespaces.is_empty()
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchHit {
    text: String,
    score: f64,
    #[serde(alias = "source_id", alias = "id")]
    source_id: String,
    #[serde(default, alias = "title")]
    source_title: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    metadata: BTreeMap<String, serde_json::Value>,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(alias = "matches")]
    results: Vec<SearchHit>,
}

/// Vector search over HTTP: `POST {endpoint}/query`.
pub struct HttpVectorSearch {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpVectorSearch {
    pub fn new(endpoint: String, api_key: Option<String>) -> Result<Self, ApiError> {
        let client = build_provider_http_client()?;
        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key,
        })
    }
}

#[async_trait]
impl VectorSearch for HttpVectorSearch {
    async fn search(
        &self,
        query: &str,
        k: usize,
        min_score: f64,
        namespaces: &[String],
    ) -> Result<Vec<ContextChunk>, ApiError> {
        let url = format!("{}/query", self.endpoint);
        let body = SearchRequest {
            query,
            k,
            min_score,
            namespaces,
        };

        let mut request_builder = self
            .client
            .post(&url)
            .header("Content-Type", "application/json");
        if let Some(api_key) = &self.api_key {
            request_builder =
                request_builder.header("Authorization", format!("Bearer {}", api_key));
        }

        let response = request_builder
            .json(&body)
            .send()
            .await
            .map_err(|e| ApiError::RetrievalFailed(format!("Vector search request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ApiError::RetrievalFailed(format!(
                "Vector search returned status {}: {}",
                status, error_text
            )));
        }

        let parsed: SearchResponse = response.json().await.map_err(|e| {
            ApiError::RetrievalFailed(format!("Failed to parse vector search response: {}", e))
        })?;

        Ok(parsed
            .results
            .into_iter()
            .map(|hit| ContextChunk {
                text: hit.text,
                score: hit.score,
                source_id: hit.source_id,
                source_title: hit.source_title,
                url: hit.url,
                metadata: hit.metadata,
            })
            .collect())
    }
}

/// Retrieves grounding chunks with fixed query parameters.
pub struct ContextRetriever {
    search: Arc<dyn VectorSearch>,
    k: usize,
    min_score: f64,
    namespaces: Vec<String>,
}

impl ContextRetriever {
    pub fn new(search: Arc<dyn VectorSearch>) -> Self {
        Self {
            search,
            k: DEFAULT_K,
            min_score: DEFAULT_MIN_SCORE,
            namespaces: Vec::new(),
        }
    }

    pub fn with_namespaces(mut self, namespaces: Vec<String>) -> Self {
        self.namespaces = namespaces;
        self
    }

    pub fn with_limits(mut self, k: usize, min_score: f64) -> Self {
        self.k = k.max(1);
        self.min_score = min_score.clamp(0.0, 1.0);
        self
    }

    pub fn namespaces(&self) -> &[String] {
        &self.namespaces
    }

    /// Fetch up to `k` chunks scoring at least `min_score`, in service order.
    pub async fn retrieve(&self, query: &str) -> Result<Vec<ContextChunk>, ApiError> {
        let hits = self
            .search
            .search(query, self.k, self.min_score, &self.namespaces)
            .await?;
        let total = hits.len();

        let chunks: Vec<ContextChunk> = hits
            .into_iter()
            .map(|mut chunk| {
                chunk.score = if chunk.score.is_nan() {
                    0.0
                } else {
                    chunk.score.clamp(0.0, 1.0)
                };
                chunk
            })
            .filter(|chunk| chunk.score >= self.min_score)
            .take(self.k)
            .collect();

        debug!(
            returned = total,
            kept = chunks.len(),
            k = self.k,
            min_score = self.min_score,
            "Context retrieved"
        );
        Ok(chunks)
    }
}
