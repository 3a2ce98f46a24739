//! LLM Provider implementations and factory
//!
//! Submodules implement specific providers; Ollama lives in `llm::ollama`.

pub mod openai;

use std::sync::Arc;

use crate::core::config::{Config, ProviderType};
use crate::core::Result;
use crate::llm::traits::LLMProvider;
use crate::llm::OllamaClient;

use self::openai::OpenAiCompatProvider;

/// Create a new LLM provider of the given type from configuration
pub fn create_provider(config: &Config, provider: ProviderType) -> Result<Arc<dyn LLMProvider>> {
    let provider: Arc<dyn LLMProvider> = match provider {
        ProviderType::OpenAi => Arc::new(OpenAiCompatProvider::openai(config)),
        ProviderType::Groq => Arc::new(OpenAiCompatProvider::groq(config)),
        ProviderType::Ollama => Arc::new(OllamaClient::from_config(config)),
    };
    Ok(provider)
}
