// In-memory implementations for examples and testing
//
// These collaborators keep all data in memory: a scripted provider with a
// call counter, fixed-result search engines, and a map-backed product store.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;

use crate::error::{AdvisorError, Result};
use crate::llm::ChatProvider;
use crate::search::{ProductStore, SearchEngine, SearchHit, SearchParams};
use crate::tool_types::{ToolCall, ToolDefinition};
use crate::turn::Turn;

// ============================================================================
// MockChatProvider - scripted provider replies
// ============================================================================

/// One scripted provider reply
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Return this turn
    Turn(Turn),
    /// Fail the call with a provider error
    Error(String),
}

impl MockReply {
    /// Scripted free-text reply
    pub fn text(text: impl Into<String>) -> Self {
        MockReply::Turn(Turn::model_text(text))
    }

    /// Scripted tool-call proposal
    pub fn tool_call(call: ToolCall) -> Self {
        MockReply::Turn(Turn::model_tool_call(call))
    }

    /// Scripted provider failure
    pub fn error(msg: impl Into<String>) -> Self {
        MockReply::Error(msg.into())
    }
}

/// Chat provider that replays scripted replies and counts calls
#[derive(Default)]
pub struct MockChatProvider {
    replies: Mutex<VecDeque<MockReply>>,
    calls: AtomicUsize,
}

impl MockChatProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the scripted replies
    pub async fn set_replies(&self, replies: Vec<MockReply>) {
        *self.replies.lock().await = replies.into();
    }

    /// Number of `generate_turn` calls made so far
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatProvider for MockChatProvider {
    async fn generate_turn(
        &self,
        _system_instruction: &str,
        _tools: &[ToolDefinition],
        _history: &[Turn],
    ) -> Result<Turn> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.replies.lock().await.pop_front() {
            Some(MockReply::Turn(turn)) => Ok(turn),
            Some(MockReply::Error(msg)) => Err(AdvisorError::Provider(msg)),
            None => Err(AdvisorError::provider("no scripted reply left")),
        }
    }
}

// ============================================================================
// Search engines
// ============================================================================

/// Search engine returning a fixed candidate list for every query
#[derive(Debug, Default, Clone)]
pub struct StaticSearchEngine {
    hits: Vec<SearchHit>,
}

impl StaticSearchEngine {
    pub fn new(hits: Vec<SearchHit>) -> Self {
        Self { hits }
    }
}

#[async_trait]
impl SearchEngine for StaticSearchEngine {
    async fn search(&self, _query: &str, _params: &SearchParams) -> Result<Vec<SearchHit>> {
        Ok(self.hits.clone())
    }
}

/// Search engine that is always unreachable
#[derive(Debug, Default, Clone)]
pub struct FailingSearchEngine;

#[async_trait]
impl SearchEngine for FailingSearchEngine {
    async fn search(&self, _query: &str, _params: &SearchParams) -> Result<Vec<SearchHit>> {
        Err(AdvisorError::search("connection refused"))
    }
}

// ============================================================================
// StaticProductStore - map-backed record lookup
// ============================================================================

/// Product store backed by an in-memory record map
#[derive(Debug, Default, Clone)]
pub struct StaticProductStore {
    records: HashMap<String, serde_json::Value>,
    fail_ids: HashSet<String>,
}

impl StaticProductStore {
    pub fn new(records: HashMap<String, serde_json::Value>) -> Self {
        Self {
            records,
            fail_ids: HashSet::new(),
        }
    }

    /// Make lookups for the given id fail with an error
    pub fn with_failing_id(mut self, id: impl Into<String>) -> Self {
        self.fail_ids.insert(id.into());
        self
    }
}

#[async_trait]
impl ProductStore for StaticProductStore {
    async fn find_by_id(&self, id: &str) -> Result<Option<serde_json::Value>> {
        if self.fail_ids.contains(id) {
            return Err(AdvisorError::Internal(anyhow::anyhow!(
                "lookup failed for {id}"
            )));
        }
        Ok(self.records.get(id).cloned())
    }
}
