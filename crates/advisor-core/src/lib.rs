// Product Advisor Core
//
// This crate implements the conversational orchestrator that turns free-form
// dialogue into a structured product-search invocation and a synthesized
// recommendation reply.
//
// Key design decisions:
// - Collaborators are traits (ChatProvider, SearchEngine, ProductStore) for
//   pluggable backends; no ambient singletons
// - Provider history is an opaque sequence of tagged turns, replayed verbatim
// - The tool set is closed: dispatch is a match on the tool name
// - Sessions live in an injected in-memory store with pull-based TTL eviction
// - Turns for one session serialize on a per-session lock; sessions are
//   independent of each other

pub mod error;
pub mod llm;
pub mod orchestrator;
pub mod product;
pub mod prompts;
pub mod search;
pub mod session;
pub mod store;
pub mod tool_types;
pub mod turn;

// In-memory implementations for examples and testing
pub mod memory;

// Re-exports for convenience
pub use error::{AdvisorError, Result};
pub use llm::ChatProvider;
pub use orchestrator::{Advisor, SessionHistory, StartReply, TurnReply};
pub use product::{EnrichedProduct, ProductSummary, SUMMARY_DESCRIPTION_LIMIT};
pub use search::{ProductStore, SearchEngine, SearchHit, SearchParams};
pub use session::{ChatMessage, ChatRole, Session, SessionStatus};
pub use store::{SessionStore, SharedSession};
pub use tool_types::{search_tool, ToolCall, ToolDefinition, ToolInvocation, SEARCH_TOOL_NAME};
pub use turn::{Turn, TurnPart, TurnRole};
