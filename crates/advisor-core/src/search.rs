// Search and storage collaborator contracts
//
// The hybrid scoring algorithm and the record store live in external
// services; the orchestrator only depends on these traits.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Fixed parameters for a hybrid search call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchParams {
    /// Result cap
    pub top_k: usize,
    /// Minimum combined score floor
    pub min_score: f64,
    /// Weight of the semantic-similarity component
    pub semantic_weight: f64,
    /// Weight of the keyword-match component
    pub keyword_weight: f64,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            top_k: 10,
            min_score: 0.25,
            semantic_weight: 0.7,
            keyword_weight: 0.3,
        }
    }
}

/// One ranked candidate returned by the search collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    /// Record identifier, resolvable via [`ProductStore::find_by_id`]
    #[serde(rename = "_id")]
    pub id: String,
    /// Combined semantic + keyword score in [0, 1]
    pub combined_score: f64,
}

/// Hybrid (semantic + keyword) search over the product catalog
#[async_trait]
pub trait SearchEngine: Send + Sync {
    /// Return ranked candidates for the query, best first
    async fn search(&self, query: &str, params: &SearchParams) -> Result<Vec<SearchHit>>;
}

/// Record lookup by identifier
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Fetch the full record, or `None` when the id resolves to nothing
    async fn find_by_id(&self, id: &str) -> Result<Option<serde_json::Value>>;
}
