// Gemini provider implementation
//
// Implements the ChatProvider trait from advisor-core against the
// generateContent REST endpoint. The adapter never executes a tool: a
// functionCall part in the reply is returned to the orchestrator as a
// proposal, and the orchestrator decides whether to act on it.

use advisor_core::{AdvisorError, ChatProvider, Result, ToolDefinition, Turn};
use async_trait::async_trait;
use reqwest::Client;

use crate::types::{Content, GeminiTool, GenerateContentRequest, GenerateContentResponse};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default model when GEMINI_MODEL is not set
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Gemini chat provider
pub struct GeminiProvider {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiProvider {
    /// Create a provider from the environment.
    /// Requires GEMINI_API_KEY; GEMINI_MODEL overrides the default model.
    pub fn new() -> anyhow::Result<Self> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| anyhow::anyhow!("GEMINI_API_KEY environment variable not set"))?;
        let model = std::env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        Ok(Self::with_api_key(api_key, model))
    }

    /// Create a provider with an explicit API key and model
    pub fn with_api_key(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: GEMINI_API_BASE.to_string(),
        }
    }

    /// Override the API base URL (used by tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Model this provider calls
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl ChatProvider for GeminiProvider {
    async fn generate_turn(
        &self,
        system_instruction: &str,
        tools: &[ToolDefinition],
        history: &[Turn],
    ) -> Result<Turn> {
        let request = GenerateContentRequest {
            system_instruction: Content::system(system_instruction),
            contents: history.iter().map(Content::from).collect(),
            tools: if tools.is_empty() {
                Vec::new()
            } else {
                vec![GeminiTool {
                    function_declarations: tools.iter().map(Into::into).collect(),
                }]
            },
        };

        let url = format!(
            "{}/models/{}:generateContent",
            self.base_url, self.model
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AdvisorError::provider(format!("failed to send Gemini request: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AdvisorError::provider(format!(
                "Gemini request failed with status {status}: {body}"
            )));
        }

        let response: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| AdvisorError::provider(format!("failed to parse Gemini response: {e}")))?;

        let turn = response
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(Content::into_model_turn)
            .unwrap_or_else(|| Turn {
                role: advisor_core::TurnRole::Model,
                parts: Vec::new(),
            });

        tracing::debug!(
            model = %self.model,
            has_tool_call = turn.tool_call().is_some(),
            "received Gemini turn"
        );

        Ok(turn)
    }
}
