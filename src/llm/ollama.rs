//! Ollama client implementation
//!
//! Async HTTP client for the Ollama API with tool calling and schema-constrained output.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::core::{
    CareerError, Config, Message, OutputSchema, Result, Role, ToolCall, ToolDefinition,
};
use crate::llm::traits::{GenerateOptions, LLMProvider, LLMResponse, TokenUsage};

/// Ollama API client
#[derive(Clone)]
pub struct OllamaClient {
    client: Client,
    base_url: String,
}

/// Ollama chat request
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<OllamaMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<&'a [ToolDefinition]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<&'a serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<OllamaOptions>,
    stream: bool,
}

/// Ollama message format
#[derive(Debug, Serialize, Deserialize)]
struct OllamaMessage {
    role: String,
    #[serde(default)]
    content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<OllamaToolCall>>,
}

/// Ollama tool call format
#[derive(Debug, Clone, Serialize, Deserialize)]
struct OllamaToolCall {
    function: OllamaFunction,
}

/// Ollama function in tool call
#[derive(Debug, Clone, Serialize, Deserialize)]
struct OllamaFunction {
    name: String,
    arguments: serde_json::Value,
}

/// Ollama generation options
#[derive(Debug, Serialize)]
struct OllamaOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop: Option<Vec<String>>,
}

/// Ollama chat response (non-streaming)
#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: OllamaMessage,
    model: String,
    #[serde(default)]
    prompt_eval_count: Option<u32>,
    #[serde(default)]
    eval_count: Option<u32>,
}

/// Ollama models list response
#[derive(Debug, Deserialize)]
struct ModelsResponse {
    models: Vec<ModelInfo>,
}

/// Model information
#[derive(Debug, Deserialize)]
struct ModelInfo {
    name: String,
}

impl OllamaClient {
    /// Create a new Ollama client from configuration
    pub fn from_config(config: &Config) -> Self {
        Self::build(config.ollama_url(), config.ollama.timeout_secs)
    }

    /// Create a client with custom base URL
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self::build(base_url.into(), 120)
    }

    fn build(base_url: String, timeout_secs: u64) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_default();

        Self { client, base_url }
    }

    /// Convert internal Message to Ollama format
    ///
    /// Ollama has no author field, so worker results carry their tag inline.
    fn to_ollama_message(msg: &Message) -> OllamaMessage {
        let (role, content) = match (msg.role, msg.name.as_deref()) {
            (Role::Worker, Some(name)) => ("user", format!("[{}] {}", name, msg.content)),
            (Role::Worker, None) | (Role::User, _) => ("user", msg.content.clone()),
            (Role::System, _) => ("system", msg.content.clone()),
            (Role::Assistant, _) => ("assistant", msg.content.clone()),
            (Role::Tool, _) => ("tool", msg.content.clone()),
        };

        OllamaMessage {
            role: role.to_string(),
            content,
            tool_calls: msg.tool_calls.as_ref().map(|calls| {
                calls
                    .iter()
                    .map(|tc| OllamaToolCall {
                        function: OllamaFunction {
                            name: tc.name.clone(),
                            arguments: tc.arguments.clone(),
                        },
                    })
                    .collect()
            }),
        }
    }

    /// Convert Ollama response to LLMResponse
    fn to_llm_response(response: ChatResponse) -> LLMResponse {
        // Ollama does not assign call ids; the position is unique within a response
        let tool_calls = response
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .map(|(i, tc)| ToolCall::new(format!("call_{}", i), tc.function.name, tc.function.arguments))
            .collect();

        let usage = match (response.prompt_eval_count, response.eval_count) {
            (Some(prompt), Some(completion)) => Some(TokenUsage {
                prompt_tokens: prompt,
                completion_tokens: completion,
                total_tokens: prompt + completion,
            }),
            _ => None,
        };

        LLMResponse {
            content: response.message.content,
            tool_calls,
            usage,
            model: response.model,
        }
    }

    async fn send_chat(&self, request: &ChatRequest<'_>) -> Result<ChatResponse> {
        debug!(
            model = request.model,
            messages = request.messages.len(),
            "ollama chat request"
        );

        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    CareerError::llm(format!(
                        "Cannot connect to Ollama at {}. Is it running?",
                        self.base_url
                    ))
                } else {
                    CareerError::from(e)
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();

            if status.as_u16() == 404 && error_text.contains("not found") {
                return Err(CareerError::ModelNotFound(
                    request.model.to_string(),
                    "ollama".to_string(),
                ));
            }

            return Err(CareerError::llm(format!(
                "Ollama API error ({}): {}",
                status, error_text
            )));
        }

        let response_text = response.text().await?;
        debug!(body = %response_text, "ollama chat response");

        serde_json::from_str(&response_text)
            .map_err(|e| CareerError::llm(format!("Failed to parse response: {}", e)))
    }

    fn options(options: Option<GenerateOptions>) -> Option<OllamaOptions> {
        options.map(|opts| OllamaOptions {
            temperature: opts.temperature,
            num_predict: opts.max_tokens,
            stop: opts.stop,
        })
    }
}

#[async_trait]
impl LLMProvider for OllamaClient {
    async fn chat(
        &self,
        model: &str,
        messages: &[Message],
        options: Option<GenerateOptions>,
    ) -> Result<LLMResponse> {
        let request = ChatRequest {
            model,
            messages: messages.iter().map(Self::to_ollama_message).collect(),
            tools: None,
            format: None,
            options: Self::options(options),
            stream: false,
        };

        Ok(Self::to_llm_response(self.send_chat(&request).await?))
    }

    async fn chat_with_tools(
        &self,
        model: &str,
        messages: &[Message],
        tools: &[ToolDefinition],
        options: Option<GenerateOptions>,
    ) -> Result<LLMResponse> {
        let request = ChatRequest {
            model,
            messages: messages.iter().map(Self::to_ollama_message).collect(),
            tools: if tools.is_empty() { None } else { Some(tools) },
            format: None,
            options: Self::options(options),
            stream: false,
        };

        Ok(Self::to_llm_response(self.send_chat(&request).await?))
    }

    async fn chat_structured(
        &self,
        model: &str,
        messages: &[Message],
        schema: &OutputSchema,
        options: Option<GenerateOptions>,
    ) -> Result<serde_json::Value> {
        let request = ChatRequest {
            model,
            messages: messages.iter().map(Self::to_ollama_message).collect(),
            tools: None,
            format: Some(&schema.schema),
            options: Self::options(options),
            stream: false,
        };

        let response = self.send_chat(&request).await?;
        serde_json::from_str(response.message.content.trim()).map_err(|e| {
            CareerError::llm(format!(
                "Structured output for '{}' is not valid JSON: {}",
                schema.name, e
            ))
        })
    }

    async fn list_models(&self) -> Result<Vec<String>> {
        let response = self
            .client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    CareerError::llm(format!(
                        "Cannot connect to Ollama at {}. Is it running?",
                        self.base_url
                    ))
                } else {
                    CareerError::from(e)
                }
            })?;

        if !response.status().is_success() {
            return Err(CareerError::llm("Failed to list models"));
        }

        let models_response: ModelsResponse = response.json().await?;
        Ok(models_response.models.into_iter().map(|m| m.name).collect())
    }

    fn name(&self) -> &str {
        "ollama"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_worker_message_carries_tag() {
        let msg = Message::worker("ResumeAnalyzer", "Skills: Rust");
        let ollama_msg = OllamaClient::to_ollama_message(&msg);
        assert_eq!(ollama_msg.role, "user");
        assert_eq!(ollama_msg.content, "[ResumeAnalyzer] Skills: Rust");
    }

    #[test]
    fn test_tool_calls_get_positional_ids() {
        let response: ChatResponse = serde_json::from_value(json!({
            "model": "llama3",
            "message": {
                "role": "assistant",
                "content": "",
                "tool_calls": [
                    {"function": {"name": "google_search", "arguments": {"query": "rust jobs"}}},
                    {"function": {"name": "scrape_website", "arguments": {"url": "https://a.b"}}}
                ]
            }
        }))
        .unwrap();

        let llm = OllamaClient::to_llm_response(response);
        assert_eq!(llm.tool_calls.len(), 2);
        assert_eq!(llm.tool_calls[0].id, "call_0");
        assert_eq!(llm.tool_calls[1].name, "scrape_website");
    }

    #[tokio::test]
    async fn test_structured_output_sends_format() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .and(body_partial_json(json!({"format": {"type": "object"}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "model": "llama3",
                "message": {"role": "assistant", "content": "{\"next_action\": \"ChatBot\"}"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = OllamaClient::with_base_url(server.uri());
        let schema = OutputSchema {
            name: "route".to_string(),
            description: "next step".to_string(),
            schema: json!({"type": "object"}),
        };
        let value = client
            .chat_structured("llama3", &[Message::user("hi")], &schema, None)
            .await
            .unwrap();

        assert_eq!(value["next_action"], "ChatBot");
    }

    #[tokio::test]
    async fn test_missing_model_maps_to_model_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(404).set_body_string("model 'nope' not found"))
            .mount(&server)
            .await;

        let client = OllamaClient::with_base_url(server.uri());
        let err = client
            .chat("nope", &[Message::user("hi")], None)
            .await
            .unwrap_err();

        assert!(matches!(err, CareerError::ModelNotFound(ref m, _) if m == "nope"));
    }

    #[tokio::test]
    async fn test_list_models() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "models": [{"name": "llama3:latest"}, {"name": "mistral:7b"}]
            })))
            .mount(&server)
            .await;

        let client = OllamaClient::with_base_url(server.uri());
        let models = client.list_models().await.unwrap();
        assert_eq!(models, vec!["llama3:latest", "mistral:7b"]);
    }
}
