// LLM provider contract
//
// Implementations handle provider-specific API calls and response parsing.
// An adapter never executes a tool itself: a tool call in the returned turn
// is a proposal, and acting on it is the orchestrator's decision.

use async_trait::async_trait;

use crate::error::Result;
use crate::tool_types::ToolDefinition;
use crate::turn::Turn;

/// Trait for conversational LLM providers with structured tool calling
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Generate the model's next turn.
    ///
    /// The full turn history is replayed verbatim on every call together
    /// with the system instruction and the declared tool set. The returned
    /// turn carries free text, a tool-call proposal, or both.
    async fn generate_turn(
        &self,
        system_instruction: &str,
        tools: &[ToolDefinition],
        history: &[Turn],
    ) -> Result<Turn>;
}
