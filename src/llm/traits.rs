//! LLM Provider trait for abstracting different backends
//!
//! Enables swapping between OpenAI, Groq and Ollama.

use async_trait::async_trait;

use crate::core::{Message, OutputSchema, Result, ToolCall, ToolDefinition};

/// Response from an LLM provider
#[derive(Debug, Clone)]
pub struct LLMResponse {
    /// Text content of the response
    pub content: String,
    /// Any tool calls the model wants to make
    pub tool_calls: Vec<ToolCall>,
    /// Token usage information
    pub usage: Option<TokenUsage>,
    /// Model that generated the response
    pub model: String,
}

impl LLMResponse {
    /// A plain text response without tool calls
    pub fn text(model: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            tool_calls: Vec::new(),
            usage: None,
            model: model.into(),
        }
    }
}

/// Token usage information
#[derive(Debug, Clone, Default)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Options for LLM generation
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Temperature for sampling (0.0 - 2.0)
    pub temperature: Option<f32>,
    /// Maximum tokens to generate
    pub max_tokens: Option<u32>,
    /// Stop sequences
    pub stop: Option<Vec<String>>,
}

impl GenerateOptions {
    /// Options with only a temperature set
    pub fn with_temperature(temperature: f32) -> Self {
        Self {
            temperature: Some(temperature),
            ..Default::default()
        }
    }
}

/// Trait for LLM providers
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Generate a response from messages
    async fn chat(
        &self,
        model: &str,
        messages: &[Message],
        options: Option<GenerateOptions>,
    ) -> Result<LLMResponse>;

    /// Generate a response with tool definitions
    async fn chat_with_tools(
        &self,
        model: &str,
        messages: &[Message],
        tools: &[ToolDefinition],
        options: Option<GenerateOptions>,
    ) -> Result<LLMResponse>;

    /// Generate a JSON object constrained to `schema`
    ///
    /// Returns the parsed object; validating its contents is up to the caller.
    async fn chat_structured(
        &self,
        model: &str,
        messages: &[Message],
        schema: &OutputSchema,
        options: Option<GenerateOptions>,
    ) -> Result<serde_json::Value>;

    /// List available models
    async fn list_models(&self) -> Result<Vec<String>>;

    /// Get the provider name
    fn name(&self) -> &str;
}
