// Session domain types
//
// A Session is one advisory conversation: a user-facing transcript, the
// provider turn history, and - once completed - the recommendation outcome.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use crate::product::EnrichedProduct;
use crate::turn::Turn;

/// Session status. Monotonic: Active -> Completed, never reversed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Active,
    Completed,
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionStatus::Active => write!(f, "active"),
            SessionStatus::Completed => write!(f, "completed"),
        }
    }
}

/// Role in the user-facing transcript
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One entry of the user-facing transcript
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// One advisory conversation
///
/// Invariant: `status == Completed` if and only if `recommendations` is Some
/// and `query_used`/`reasoning` are set. `complete()` is the only place that
/// flips the status.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub status: SessionStatus,
    /// User-facing transcript, append-only
    pub messages: Vec<ChatMessage>,
    /// Provider turn history, append-only, replayed verbatim on every call
    pub history: Vec<Turn>,
    pub recommendations: Option<Vec<EnrichedProduct>>,
    pub query_used: Option<String>,
    pub reasoning: Option<String>,
}

impl Session {
    /// Create a new active session with empty histories
    pub fn new() -> Self {
        Self {
            id: Uuid::now_v7(),
            created_at: Utc::now(),
            status: SessionStatus::Active,
            messages: Vec::new(),
            history: Vec::new(),
            recommendations: None,
            query_used: None,
            reasoning: None,
        }
    }

    /// Whether the session's age exceeds the given time-to-live
    pub fn is_expired(&self, ttl: chrono::Duration) -> bool {
        Utc::now() - self.created_at > ttl
    }

    /// Finalize the session with its recommendation outcome.
    ///
    /// Sets `recommendations`, `query_used` and `reasoning` exactly once; a
    /// completed session is never modified again.
    pub fn complete(
        &mut self,
        recommendations: Vec<EnrichedProduct>,
        query_used: impl Into<String>,
        reasoning: impl Into<String>,
    ) {
        debug_assert_eq!(self.status, SessionStatus::Active);
        self.status = SessionStatus::Completed;
        self.recommendations = Some(recommendations);
        self.query_used = Some(query_used.into());
        self.reasoning = Some(reasoning.into());
    }

    /// Last assistant message of the transcript, if any
    pub fn last_assistant_message(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == ChatRole::Assistant)
            .map(|m| m.content.as_str())
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
