//! Model definitions and presets
//!
//! Contains model configurations and recommended settings per provider.

use serde::{Deserialize, Serialize};

use crate::core::ProviderType;

/// Model preset with recommended settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelPreset {
    /// Model identifier
    pub name: String,
    /// Provider serving the model
    pub provider: ProviderType,
    /// Description of the model
    pub description: String,
    /// Recommended temperature
    pub default_temperature: f32,
    /// Whether the model reliably follows tool calling and structured output
    pub supports_tools: bool,
}

fn preset(
    name: &str,
    provider: ProviderType,
    description: &str,
    default_temperature: f32,
    supports_tools: bool,
) -> ModelPreset {
    ModelPreset {
        name: name.to_string(),
        provider,
        description: description.to_string(),
        default_temperature,
        supports_tools,
    }
}

/// Get predefined model presets
pub fn get_model_presets() -> Vec<ModelPreset> {
    vec![
        preset(
            "gpt-4o-mini",
            ProviderType::OpenAi,
            "Fast and cheap; the most dependable router for this crew",
            0.3,
            true,
        ),
        preset(
            "gpt-4o",
            ProviderType::OpenAi,
            "Higher quality cover letters and research summaries",
            0.3,
            true,
        ),
        preset(
            "gpt-3.5-turbo",
            ProviderType::OpenAi,
            "Legacy model, occasionally misroutes",
            0.3,
            true,
        ),
        preset(
            "llama-3.1-70b-versatile",
            ProviderType::Groq,
            "Free tier friendly; routing may not always be optimal",
            0.3,
            true,
        ),
        preset(
            "llama3-70b-8192",
            ProviderType::Groq,
            "Older Llama 3 with an 8k context",
            0.2,
            true,
        ),
        preset(
            "llama3",
            ProviderType::Ollama,
            "Fully local; expect weaker tool use",
            0.0,
            false,
        ),
    ]
}

/// Find a model preset by name
pub fn find_preset(name: &str) -> Option<ModelPreset> {
    get_model_presets().into_iter().find(|p| p.name == name)
}

/// Presets served by one provider
pub fn presets_for(provider: ProviderType) -> Vec<ModelPreset> {
    get_model_presets()
        .into_iter()
        .filter(|p| p.provider == provider)
        .collect()
}

/// Presets that handle routing and tool calling well
pub fn recommended_models() -> Vec<ModelPreset> {
    get_model_presets()
        .into_iter()
        .filter(|p| p.supports_tools)
        .collect()
}
