//! OpenAI-compatible provider
//!
//! Chat completions client shared by OpenAI and Groq, which expose the same API.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tracing::debug;

use crate::core::{
    CareerError, Config, Message, OutputSchema, Result, Role, ToolCall, ToolDefinition,
};
use crate::llm::traits::{GenerateOptions, LLMProvider, LLMResponse, TokenUsage};

/// Provider speaking the `/chat/completions` protocol
#[derive(Clone)]
pub struct OpenAiCompatProvider {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    name: &'static str,
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<serde_json::Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop: Option<Vec<String>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<WireToolCall>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireToolCall {
    id: String,
    #[serde(rename = "type", default = "function_type")]
    call_type: String,
    function: WireFunction,
}

fn function_type() -> String {
    "function".to_string()
}

#[derive(Debug, Serialize, Deserialize)]
struct WireFunction {
    name: String,
    /// JSON-encoded arguments
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    model: String,
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<WireUsage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: WireMessage,
}

#[derive(Debug, Deserialize)]
struct WireUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ModelList {
    data: Vec<ModelEntry>,
}

#[derive(Debug, Deserialize)]
struct ModelEntry {
    id: String,
}

impl OpenAiCompatProvider {
    /// Create a provider for an arbitrary compatible endpoint
    pub fn new(
        name: &'static str,
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout_secs: u64,
    ) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            name,
        }
    }

    /// OpenAI from configuration
    pub fn openai(config: &Config) -> Self {
        Self::new(
            "openai",
            config.llm.openai_base_url.clone(),
            config.llm.openai_api_key.clone(),
            config.llm.timeout_secs,
        )
    }

    /// Groq from configuration
    pub fn groq(config: &Config) -> Self {
        Self::new(
            "groq",
            config.llm.groq_base_url.clone(),
            config.llm.groq_api_key.clone(),
            config.llm.timeout_secs,
        )
    }

    fn to_wire_message(msg: &Message) -> WireMessage {
        let role = match msg.role {
            Role::User | Role::Worker => "user",
            Role::System => "system",
            Role::Assistant => "assistant",
            Role::Tool => "tool",
        };

        let tool_calls = msg.tool_calls.as_ref().map(|calls| {
            calls
                .iter()
                .map(|tc| WireToolCall {
                    id: tc.id.clone(),
                    call_type: function_type(),
                    function: WireFunction {
                        name: tc.name.clone(),
                        arguments: tc.arguments.to_string(),
                    },
                })
                .collect::<Vec<_>>()
        });

        let content = if msg.content.is_empty() && tool_calls.is_some() {
            None
        } else {
            Some(msg.content.clone())
        };

        WireMessage {
            role: role.to_string(),
            content,
            // tool messages are matched by id, not by name
            name: match msg.role {
                Role::Worker => msg.name.clone(),
                _ => None,
            },
            tool_calls,
            tool_call_id: msg.tool_call_id.clone(),
        }
    }

    fn to_llm_response(response: CompletionResponse) -> Result<LLMResponse> {
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| CareerError::llm("Response contained no choices"))?;

        let tool_calls = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|tc| {
                let arguments = serde_json::from_str(&tc.function.arguments)
                    .unwrap_or(serde_json::Value::String(tc.function.arguments));
                ToolCall::new(tc.id, tc.function.name, arguments)
            })
            .collect();

        Ok(LLMResponse {
            content: choice.message.content.unwrap_or_default(),
            tool_calls,
            usage: response.usage.map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            }),
            model: response.model,
        })
    }

    fn api_key(&self) -> Result<&str> {
        self.api_key.as_deref().ok_or_else(|| {
            CareerError::config(format!(
                "No API key configured for provider '{}'. Set {}_API_KEY",
                self.name,
                self.name.to_uppercase()
            ))
        })
    }

    async fn send(&self, request: &CompletionRequest<'_>) -> Result<LLMResponse> {
        let api_key = self.api_key()?;
        debug!(
            provider = self.name,
            model = request.model,
            messages = request.messages.len(),
            "chat completion request"
        );

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();

            if status.as_u16() == 404 && error_text.contains("model") {
                return Err(CareerError::ModelNotFound(
                    request.model.to_string(),
                    self.name.to_string(),
                ));
            }

            return Err(CareerError::llm(format!(
                "{} API error ({}): {}",
                self.name, status, error_text
            )));
        }

        let response_text = response.text().await?;
        debug!(provider = self.name, body = %response_text, "chat completion response");

        let completion: CompletionResponse = serde_json::from_str(&response_text)
            .map_err(|e| CareerError::llm(format!("Failed to parse response: {}", e)))?;

        Self::to_llm_response(completion)
    }

    fn request<'a>(
        model: &'a str,
        messages: &[Message],
        options: Option<GenerateOptions>,
    ) -> CompletionRequest<'a> {
        let options = options.unwrap_or_default();
        CompletionRequest {
            model,
            messages: messages.iter().map(Self::to_wire_message).collect(),
            tools: None,
            tool_choice: None,
            temperature: options.temperature,
            max_tokens: options.max_tokens,
            stop: options.stop,
        }
    }
}

#[async_trait]
impl LLMProvider for OpenAiCompatProvider {
    async fn chat(
        &self,
        model: &str,
        messages: &[Message],
        options: Option<GenerateOptions>,
    ) -> Result<LLMResponse> {
        let request = Self::request(model, messages, options);
        self.send(&request).await
    }

    async fn chat_with_tools(
        &self,
        model: &str,
        messages: &[Message],
        tools: &[ToolDefinition],
        options: Option<GenerateOptions>,
    ) -> Result<LLMResponse> {
        let mut request = Self::request(model, messages, options);
        if !tools.is_empty() {
            request.tools = Some(
                tools
                    .iter()
                    .map(serde_json::to_value)
                    .collect::<std::result::Result<Vec<_>, _>>()?,
            );
        }
        self.send(&request).await
    }

    /// Structured output through a forced function call, which every
    /// compatible endpoint with tool support honours.
    async fn chat_structured(
        &self,
        model: &str,
        messages: &[Message],
        schema: &OutputSchema,
        options: Option<GenerateOptions>,
    ) -> Result<serde_json::Value> {
        let mut request = Self::request(model, messages, options);
        request.tools = Some(vec![serde_json::to_value(ToolDefinition::function(
            schema.name.clone(),
            schema.description.clone(),
            schema.schema.clone(),
        ))?]);
        request.tool_choice = Some(json!({
            "type": "function",
            "function": { "name": schema.name }
        }));

        let response = self.send(&request).await?;

        if let Some(call) = response
            .tool_calls
            .into_iter()
            .find(|call| call.name == schema.name)
        {
            return Ok(call.arguments);
        }

        serde_json::from_str(response.content.trim()).map_err(|_| {
            CareerError::llm(format!(
                "Model did not return structured output for '{}'",
                schema.name
            ))
        })
    }

    async fn list_models(&self) -> Result<Vec<String>> {
        let api_key = self.api_key()?;
        let response = self
            .client
            .get(format!("{}/models", self.base_url))
            .bearer_auth(api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(CareerError::llm(format!(
                "Failed to list models from {}",
                self.name
            )));
        }

        let list: ModelList = response.json().await?;
        Ok(list.data.into_iter().map(|m| m.id).collect())
    }

    fn name(&self) -> &str {
        self.name
    }
}
