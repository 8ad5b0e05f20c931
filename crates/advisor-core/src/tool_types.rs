// Tool declaration and tool-call types
//
// The tool set is closed and known in advance (exactly one tool today), so
// dispatch is an explicit match on the tool name rather than a dynamic
// registry. Extending to more tools means extending the match, not adding
// reflection.

use serde::{Deserialize, Serialize};
use serde_json::json;

/// Name of the single declared tool
pub const SEARCH_TOOL_NAME: &str = "search_and_recommend_products";

/// Tool declaration sent to the provider on every call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool name (used by the model to address the tool)
    pub name: String,
    /// Tool description for the model
    pub description: String,
    /// JSON schema for tool parameters
    pub parameters: serde_json::Value,
}

/// Tool-call proposal from the model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Tool name to execute
    pub name: String,
    /// Arguments as JSON
    pub arguments: serde_json::Value,
}

/// Parsed arguments of a product-search tool call
///
/// Ephemeral: lives for one turn only, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    pub query: String,
    pub reasoning: String,
}

impl ToolInvocation {
    /// Extract an invocation from a tool-call proposal.
    ///
    /// Returns `None` when the call addresses an unknown tool. Missing
    /// arguments default to empty strings, matching the declared schema's
    /// lenient handling.
    pub fn from_call(call: &ToolCall) -> Option<Self> {
        match call.name.as_str() {
            SEARCH_TOOL_NAME => Some(Self {
                query: string_arg(&call.arguments, "query"),
                reasoning: string_arg(&call.arguments, "reasoning"),
            }),
            _ => None,
        }
    }
}

fn string_arg(arguments: &serde_json::Value, key: &str) -> String {
    arguments
        .get(key)
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string()
}

/// Declaration of the product-search tool
pub fn search_tool() -> ToolDefinition {
    ToolDefinition {
        name: SEARCH_TOOL_NAME.to_string(),
        description: "Search the product catalog and return recommended construction \
                      materials. Call this once you have gathered enough context about \
                      the user's requirements."
            .to_string(),
        parameters: json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "A well-constructed search query summarising the user's \
                                    construction material needs. Will be used for semantic \
                                    and keyword search over product titles/descriptions."
                },
                "reasoning": {
                    "type": "string",
                    "description": "Brief explanation of why this query was chosen and how \
                                    it aligns with what the user asked for."
                }
            },
            "required": ["query", "reasoning"]
        }),
    }
}
