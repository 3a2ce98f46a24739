//! Scripted provider for unit tests

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::core::{CareerError, Message, OutputSchema, Result, ToolCall, ToolDefinition};
use crate::llm::{GenerateOptions, LLMProvider, LLMResponse};

/// Replays queued answers in order and records what it was sent
#[derive(Default)]
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<LLMResponse>>,
    structured: Mutex<VecDeque<Value>>,
    requests: Mutex<Vec<Vec<Message>>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_text(&self, content: &str) {
        self.replies
            .lock()
            .unwrap()
            .push_back(LLMResponse::text("scripted", content));
    }

    pub fn push_tool_calls(&self, calls: Vec<ToolCall>) {
        let mut response = LLMResponse::text("scripted", "");
        response.tool_calls = calls;
        self.replies.lock().unwrap().push_back(response);
    }

    pub fn push_structured(&self, value: Value) {
        self.structured.lock().unwrap().push_back(value);
    }

    /// Number of chat requests received (structured calls excluded)
    pub fn chat_requests(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Messages of the most recent chat request
    pub fn last_request(&self) -> Vec<Message> {
        self.requests.lock().unwrap().last().cloned().unwrap_or_default()
    }

    fn next_reply(&self, messages: &[Message]) -> Result<LLMResponse> {
        self.requests.lock().unwrap().push(messages.to_vec());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| CareerError::llm("scripted replies exhausted"))
    }
}

#[async_trait]
impl LLMProvider for ScriptedProvider {
    async fn chat(
        &self,
        _model: &str,
        messages: &[Message],
        _options: Option<GenerateOptions>,
    ) -> Result<LLMResponse> {
        self.next_reply(messages)
    }

    async fn chat_with_tools(
        &self,
        _model: &str,
        messages: &[Message],
        _tools: &[ToolDefinition],
        _options: Option<GenerateOptions>,
    ) -> Result<LLMResponse> {
        self.next_reply(messages)
    }

    async fn chat_structured(
        &self,
        _model: &str,
        _messages: &[Message],
        _schema: &OutputSchema,
        _options: Option<GenerateOptions>,
    ) -> Result<Value> {
        self.structured
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| CareerError::llm("scripted routing exhausted"))
    }

    async fn list_models(&self) -> Result<Vec<String>> {
        Ok(vec!["scripted".to_string()])
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
