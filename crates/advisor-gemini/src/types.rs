// Gemini wire types
//
// Request/response shapes for the generateContent endpoint, plus conversions
// between the core turn history and Gemini's content/parts representation.

use advisor_core::{ToolCall, ToolDefinition, Turn, TurnPart, TurnRole};
use serde::{Deserialize, Serialize};

/// generateContent request body
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub system_instruction: Content,
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<GeminiTool>,
}

/// Tool block carrying function declarations
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiTool {
    pub function_declarations: Vec<FunctionDeclaration>,
}

/// One declared function
#[derive(Debug, Clone, Serialize)]
pub struct FunctionDeclaration {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

impl From<&ToolDefinition> for FunctionDeclaration {
    fn from(tool: &ToolDefinition) -> Self {
        Self {
            name: tool.name.clone(),
            description: tool.description.clone(),
            parameters: tool.parameters.clone(),
        }
    }
}

/// Content: a role plus ordered parts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    /// System-instruction content (no role)
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: None,
            parts: vec![Part::text(text)],
        }
    }
}

/// One content part; exactly one field is expected to be set
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_call: Option<FunctionCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_response: Option<FunctionResponse>,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }
}

/// Function-call proposal from the model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    #[serde(default)]
    pub args: serde_json::Value,
}

/// Function result fed back to the model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionResponse {
    pub name: String,
    pub response: serde_json::Value,
}

/// generateContent response body
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Candidate {
    pub content: Option<Content>,
}

// ============================================================================
// Conversions between core turns and Gemini contents
// ============================================================================

fn role_str(role: TurnRole) -> &'static str {
    match role {
        TurnRole::User => "user",
        TurnRole::Model => "model",
        TurnRole::Tool => "tool",
    }
}

impl From<&Turn> for Content {
    fn from(turn: &Turn) -> Self {
        let parts = turn
            .parts
            .iter()
            .map(|part| match part {
                TurnPart::Text { text } => Part::text(text.clone()),
                TurnPart::ToolCall(call) => Part {
                    function_call: Some(FunctionCall {
                        name: call.name.clone(),
                        args: call.arguments.clone(),
                    }),
                    ..Default::default()
                },
                TurnPart::ToolResult { name, payload } => Part {
                    function_response: Some(FunctionResponse {
                        name: name.clone(),
                        response: serde_json::json!({ "result": payload }),
                    }),
                    ..Default::default()
                },
            })
            .collect();

        Content {
            role: Some(role_str(turn.role).to_string()),
            parts,
        }
    }
}

impl Content {
    /// Convert a response candidate's content into a model turn.
    ///
    /// Unknown part shapes are ignored; an empty candidate yields a turn
    /// with no parts (the orchestrator falls back on empty text).
    pub fn into_model_turn(self) -> Turn {
        let parts = self
            .parts
            .into_iter()
            .filter_map(|part| {
                if let Some(text) = part.text {
                    Some(TurnPart::Text { text })
                } else {
                    part.function_call.map(|call| {
                        TurnPart::ToolCall(ToolCall {
                            name: call.name,
                            arguments: call.args,
                        })
                    })
                }
            })
            .collect();

        Turn {
            role: TurnRole::Model,
            parts,
        }
    }
}
