// Gemini Provider Adapter
//
// Implements advisor-core's ChatProvider against the Gemini generateContent
// REST API with structured function calling.

pub mod provider;
pub mod types;

pub use provider::{GeminiProvider, DEFAULT_MODEL};
