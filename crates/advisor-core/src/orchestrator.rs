// Conversation orchestrator - the turn state machine
//
// Composes the session store, the chat provider, and the search/storage
// collaborators into the session lifecycle: bootstrap greeting, per-message
// turns, the tool-call protocol with result enrichment, and finalization.
//
// State transitions are strict: Active sessions may call the provider;
// Completed sessions are answered from stored state with zero provider
// calls. Within one turn execution is sequential - the second provider call
// happens only after search and enrichment complete.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use crate::error::{AdvisorError, Result};
use crate::llm::ChatProvider;
use crate::product::{EnrichedProduct, ProductSummary};
use crate::prompts::{FALLBACK_GREETING, FALLBACK_SUMMARY, GREETING_PROMPT, SYSTEM_PROMPT};
use crate::search::{ProductStore, SearchEngine, SearchParams};
use crate::session::{ChatMessage, Session, SessionStatus};
use crate::store::SessionStore;
use crate::tool_types::{search_tool, ToolCall, ToolDefinition, ToolInvocation, SEARCH_TOOL_NAME};
use crate::turn::Turn;

/// Caller-side bound on one provider round-trip
const PROVIDER_TIMEOUT: Duration = Duration::from_secs(60);

/// Caller-side bound on one search call
const SEARCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Outcome of starting a session
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct StartReply {
    pub session_id: Uuid,
    /// The assistant's opening greeting
    pub message: String,
    pub status: SessionStatus,
}

/// Outcome of one user turn
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct TurnReply {
    pub session_id: Uuid,
    /// Assistant reply: a follow-up question while active, the final
    /// recommendation summary once completed
    pub message: String,
    pub status: SessionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_used: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub products: Option<Vec<EnrichedProduct>>,
}

/// Transcript view of a session
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct SessionHistory {
    pub session_id: Uuid,
    pub status: SessionStatus,
    pub messages: Vec<ChatMessage>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub products: Option<Vec<EnrichedProduct>>,
}

/// The conversation orchestrator
///
/// Collaborators are injected at construction; there is no ambient global
/// state. Sessions are owned by the injected [`SessionStore`].
pub struct Advisor {
    provider: Arc<dyn ChatProvider>,
    search: Arc<dyn SearchEngine>,
    products: Arc<dyn ProductStore>,
    store: Arc<SessionStore>,
    search_params: SearchParams,
    tools: Vec<ToolDefinition>,
}

impl Advisor {
    /// Create an advisor over the given collaborators
    pub fn new(
        provider: Arc<dyn ChatProvider>,
        search: Arc<dyn SearchEngine>,
        products: Arc<dyn ProductStore>,
        store: Arc<SessionStore>,
    ) -> Self {
        Self {
            provider,
            search,
            products,
            store,
            search_params: SearchParams::default(),
            tools: vec![search_tool()],
        }
    }

    /// Get reference to the session store
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Start a new conversation and return the assistant's greeting.
    ///
    /// Issues one provider call carrying a fixed greeting prompt; the prompt
    /// and the reply land in the provider history, the transcript receives
    /// only the greeting.
    pub async fn start_session(&self) -> Result<StartReply> {
        self.store.sweep().await;

        let mut session = Session::new();
        let greeting_turn = Turn::user(GREETING_PROMPT);

        let reply = self
            .call_provider(std::slice::from_ref(&greeting_turn))
            .await?;
        let greeting = non_empty_text(&reply).unwrap_or(FALLBACK_GREETING).to_string();

        session.history.push(greeting_turn);
        session.history.push(reply);
        session.messages.push(ChatMessage::assistant(&greeting));

        let session_id = session.id;
        self.store.insert(session).await;
        tracing::info!(%session_id, "started advisor session");

        Ok(StartReply {
            session_id,
            message: greeting,
            status: SessionStatus::Active,
        })
    }

    /// Process one user message.
    ///
    /// Turns for the same session serialize on the per-session lock; turns
    /// for different sessions run concurrently. A provider failure before
    /// any state was appended leaves the session unmodified, so the caller
    /// can retry the message.
    pub async fn send_message(&self, session_id: Uuid, message: &str) -> Result<TurnReply> {
        let handle = self.store.get(session_id).await?;
        let mut session = handle.lock().await;

        if session.status == SessionStatus::Completed {
            return Ok(Self::completed_reply(&session));
        }

        // Call the provider with the prospective history before touching
        // session state: an error here must leave the session retryable.
        let user_turn = Turn::user(message);
        let mut prospective = session.history.clone();
        prospective.push(user_turn.clone());

        let reply = self.call_provider(&prospective).await?;

        session.history.push(user_turn);
        session.history.push(reply.clone());

        if let Some(call) = reply.tool_call() {
            let call = call.clone();
            return self.run_tool_protocol(&mut session, message, call).await;
        }

        // Transcript entries land only when the turn fully succeeds, so an
        // aborted turn followed by a retry never duplicates the user message.
        let text = reply.text().unwrap_or_default().to_string();
        session.messages.push(ChatMessage::user(message));
        session.messages.push(ChatMessage::assistant(&text));

        Ok(TurnReply {
            session_id,
            message: text,
            status: SessionStatus::Active,
            reasoning: None,
            query_used: None,
            products: None,
        })
    }

    /// Return the transcript and current status for a session
    pub async fn history(&self, session_id: Uuid) -> Result<SessionHistory> {
        let handle = self.store.get(session_id).await?;
        let session = handle.lock().await;
        Ok(SessionHistory {
            session_id: session.id,
            status: session.status,
            messages: session.messages.clone(),
            created_at: session.created_at,
            products: session.recommendations.clone(),
        })
    }

    /// Delete a session
    pub async fn delete_session(&self, session_id: Uuid) -> Result<()> {
        self.store.remove(session_id).await
    }

    // ------------------------------------------------------------------
    // internals
    // ------------------------------------------------------------------

    /// Replay for a completed session: stored summary and outcome, no
    /// provider call, idempotent regardless of the incoming text.
    fn completed_reply(session: &Session) -> TurnReply {
        TurnReply {
            session_id: session.id,
            message: session
                .last_assistant_message()
                .unwrap_or_default()
                .to_string(),
            status: SessionStatus::Completed,
            reasoning: session.reasoning.clone(),
            query_used: session.query_used.clone(),
            products: session.recommendations.clone(),
        }
    }

    /// Execute the tool-call protocol and finalize the session.
    ///
    /// The provider history already holds the user turn and the model's
    /// tool-call turn. If the summarizing provider call fails, the turn
    /// aborts with the tool result appended to the provider history, the
    /// transcript untouched, and the session still Active; a retry replays
    /// the full history.
    async fn run_tool_protocol(
        &self,
        session: &mut Session,
        message: &str,
        call: ToolCall,
    ) -> Result<TurnReply> {
        let Some(invocation) = ToolInvocation::from_call(&call) else {
            return Err(AdvisorError::provider(format!(
                "model proposed unknown tool: {}",
                call.name
            )));
        };
        tracing::info!(
            session_id = %session.id,
            query = %invocation.query,
            "executing product search tool call"
        );

        let products = self.execute_search(&invocation.query).await;

        let summaries: Vec<ProductSummary> = products.iter().map(|p| p.summary()).collect();
        let payload = serde_json::json!({
            "products_found": products.len(),
            "products": summaries,
        });
        session.history.push(Turn::tool_result(SEARCH_TOOL_NAME, payload));

        let summary_reply = self.call_provider(&session.history).await?;
        let summary = non_empty_text(&summary_reply)
            .unwrap_or(FALLBACK_SUMMARY)
            .to_string();

        session.history.push(summary_reply);
        session.messages.push(ChatMessage::user(message));
        session.messages.push(ChatMessage::assistant(&summary));
        session.complete(
            products.clone(),
            invocation.query.clone(),
            invocation.reasoning.clone(),
        );

        Ok(TurnReply {
            session_id: session.id,
            message: summary,
            status: SessionStatus::Completed,
            reasoning: Some(invocation.reasoning),
            query_used: Some(invocation.query),
            products: Some(products),
        })
    }

    /// Run the search and enrich every resolvable candidate.
    ///
    /// An unreachable search collaborator degrades to an empty list; a
    /// candidate whose record cannot be fetched is dropped. Neither aborts
    /// the turn.
    async fn execute_search(&self, query: &str) -> Vec<EnrichedProduct> {
        let search = self.search.search(query, &self.search_params);
        let hits = match tokio::time::timeout(SEARCH_TIMEOUT, search).await {
            Ok(Ok(hits)) => hits,
            Ok(Err(err)) => {
                tracing::warn!(%err, "search unavailable, continuing with empty results");
                Vec::new()
            }
            Err(_) => {
                tracing::warn!("search call timed out, continuing with empty results");
                Vec::new()
            }
        };

        let mut products = Vec::with_capacity(hits.len());
        for hit in hits {
            let record = match self.products.find_by_id(&hit.id).await {
                Ok(Some(record)) => record,
                Ok(None) => {
                    tracing::debug!(id = %hit.id, "candidate record missing, skipping");
                    continue;
                }
                Err(err) => {
                    tracing::debug!(id = %hit.id, %err, "candidate lookup failed, skipping");
                    continue;
                }
            };
            match EnrichedProduct::from_record(record, hit.combined_score) {
                Some(product) => products.push(product),
                None => {
                    tracing::debug!(id = %hit.id, "candidate record is not an object, skipping")
                }
            }
        }
        products
    }

    async fn call_provider(&self, history: &[Turn]) -> Result<Turn> {
        let call = self.provider.generate_turn(SYSTEM_PROMPT, &self.tools, history);
        tokio::time::timeout(PROVIDER_TIMEOUT, call)
            .await
            .map_err(|_| AdvisorError::provider("provider call timed out"))?
    }
}

/// Text of a turn, filtered to non-empty
fn non_empty_text(turn: &Turn) -> Option<&str> {
    turn.text().filter(|t| !t.is_empty())
}
