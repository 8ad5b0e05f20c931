// Provider turn history
//
// Turn is the provider-opaque history record: a role plus an ordered list of
// tagged parts (text, tool-call proposal, tool result). The orchestrator
// appends and replays turns verbatim; it only ever looks at the part tag.

use serde::{Deserialize, Serialize};

use crate::tool_types::ToolCall;

/// Role of a turn in the provider history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    /// User input (including internal prompts not shown to the user)
    User,
    /// Model output (text and/or tool-call proposals)
    Model,
    /// Tool execution result fed back to the model
    Tool,
}

impl std::fmt::Display for TurnRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TurnRole::User => write!(f, "user"),
            TurnRole::Model => write!(f, "model"),
            TurnRole::Tool => write!(f, "tool"),
        }
    }
}

/// One part of a turn
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TurnPart {
    /// Free text
    Text { text: String },
    /// Tool-call proposal from the model
    ToolCall(ToolCall),
    /// Result of an executed tool call
    ToolResult {
        name: String,
        payload: serde_json::Value,
    },
}

/// A single turn in the provider history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub role: TurnRole,
    pub parts: Vec<TurnPart>,
}

impl Turn {
    /// Create a user turn with text content
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            parts: vec![TurnPart::Text { text: text.into() }],
        }
    }

    /// Create a model turn with text content
    pub fn model_text(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Model,
            parts: vec![TurnPart::Text { text: text.into() }],
        }
    }

    /// Create a model turn proposing a tool call
    pub fn model_tool_call(call: ToolCall) -> Self {
        Self {
            role: TurnRole::Model,
            parts: vec![TurnPart::ToolCall(call)],
        }
    }

    /// Create a tool turn carrying an execution result
    pub fn tool_result(name: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            role: TurnRole::Tool,
            parts: vec![TurnPart::ToolResult {
                name: name.into(),
                payload,
            }],
        }
    }

    /// First text part, if any
    pub fn text(&self) -> Option<&str> {
        self.parts.iter().find_map(|p| match p {
            TurnPart::Text { text } => Some(text.as_str()),
            _ => None,
        })
    }

    /// First tool-call proposal, if any
    ///
    /// The protocol honors at most one call per turn; a provider proposing
    /// more than one is never expected and only the first is returned.
    pub fn tool_call(&self) -> Option<&ToolCall> {
        self.parts.iter().find_map(|p| match p {
            TurnPart::ToolCall(call) => Some(call),
            _ => None,
        })
    }
}
