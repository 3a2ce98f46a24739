//! LLM module - Language Model integrations
//!
//! Provides abstractions for different LLM backends: OpenAI-compatible APIs and Ollama.

pub mod models;
pub mod ollama;
pub mod provider;
pub mod traits;

#[cfg(test)]
pub(crate) mod testing;

pub use models::*;
pub use ollama::OllamaClient;
pub use provider::create_provider;
pub use provider::openai::OpenAiCompatProvider;
pub use traits::{GenerateOptions, LLMProvider, LLMResponse, TokenUsage};
