// HTTP client for the search service
//
// One client implements both collaborator contracts: hybrid search
// (POST /search) and record lookup (GET /products/{id}). Connection
// handling and the scoring algorithm live on the service side.

use advisor_core::{AdvisorError, ProductStore, Result, SearchEngine, SearchHit, SearchParams};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Per-request timeout on the search service
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    top_k: usize,
    min_score: f64,
    semantic_weight: f64,
    keyword_weight: f64,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

/// Client for the external hybrid-search service
#[derive(Debug, Clone)]
pub struct SearchServiceClient {
    client: Client,
    base_url: String,
}

impl SearchServiceClient {
    /// Create a client for the service at the given base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl SearchEngine for SearchServiceClient {
    async fn search(&self, query: &str, params: &SearchParams) -> Result<Vec<SearchHit>> {
        let request = SearchRequest {
            query,
            top_k: params.top_k,
            min_score: params.min_score,
            semantic_weight: params.semantic_weight,
            keyword_weight: params.keyword_weight,
        };

        let response = self
            .client
            .post(format!("{}/search", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| AdvisorError::search(format!("search request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(AdvisorError::search(format!(
                "search service returned status {}",
                response.status()
            )));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| AdvisorError::search(format!("invalid search response: {e}")))?;
        Ok(body.results)
    }
}

#[async_trait]
impl ProductStore for SearchServiceClient {
    async fn find_by_id(&self, id: &str) -> Result<Option<serde_json::Value>> {
        let response = self
            .client
            .get(format!("{}/products/{}", self.base_url, id))
            .send()
            .await
            .map_err(|e| {
                AdvisorError::Internal(anyhow::anyhow!("product lookup failed for {id}: {e}"))
            })?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(AdvisorError::Internal(anyhow::anyhow!(
                "product lookup for {id} returned status {}",
                response.status()
            )));
        }

        let record = response.json().await.map_err(|e| {
            AdvisorError::Internal(anyhow::anyhow!("invalid product record for {id}: {e}"))
        })?;
        Ok(Some(record))
    }
}
