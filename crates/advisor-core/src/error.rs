// Error types for the advisor orchestrator

use thiserror::Error;
use uuid::Uuid;

/// Result type alias for advisor operations
pub type Result<T> = std::result::Result<T, AdvisorError>;

/// Errors that can occur while driving an advisor conversation
#[derive(Debug, Error)]
pub enum AdvisorError {
    /// Orchestrator or provider not wired yet (surfaced as service-unavailable)
    #[error("Advisor not initialized")]
    NotInitialized,

    /// Session absent or expired (indistinguishable to callers)
    #[error("Session not found: {0}")]
    SessionNotFound(Uuid),

    /// LLM provider error (aborts the current turn, session left retryable)
    #[error("Provider error: {0}")]
    Provider(String),

    /// Search collaborator unreachable (non-fatal; the tool protocol degrades
    /// to an empty result set)
    #[error("Search unavailable: {0}")]
    SearchUnavailable(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AdvisorError {
    /// Create a provider error
    pub fn provider(msg: impl Into<String>) -> Self {
        AdvisorError::Provider(msg.into())
    }

    /// Create a search-unavailable error
    pub fn search(msg: impl Into<String>) -> Self {
        AdvisorError::SearchUnavailable(msg.into())
    }
}
