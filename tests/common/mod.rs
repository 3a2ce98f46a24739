//! Shared helpers for integration tests

#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use career_assistant::core::{Message, OutputSchema, ToolCall, ToolDefinition};
use career_assistant::llm::{GenerateOptions, LLMProvider, LLMResponse};
use career_assistant::{CareerError, Config, Result};

/// One request seen by the scripted provider
#[derive(Debug, Clone)]
pub struct Request {
    pub messages: Vec<Message>,
    pub tools: Vec<String>,
}

/// LLM stand-in: routing answers and chat replies are queued up front
#[derive(Default)]
pub struct ScriptedProvider {
    routes: Mutex<VecDeque<Value>>,
    replies: Mutex<VecDeque<LLMResponse>>,
    requests: Mutex<Vec<Request>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a supervisor answer
    pub fn route(&self, label: &str) -> &Self {
        self.routes
            .lock()
            .unwrap()
            .push_back(json!({ "next_action": label }));
        self
    }

    /// Queue a plain text reply
    pub fn say(&self, content: &str) -> &Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(LLMResponse::text("scripted", content));
        self
    }

    /// Queue a reply that calls tools
    pub fn call_tools(&self, calls: Vec<ToolCall>) -> &Self {
        let mut response = LLMResponse::text("scripted", "");
        response.tool_calls = calls;
        self.replies.lock().unwrap().push_back(response);
        self
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }

    fn reply(&self, messages: &[Message], tools: &[ToolDefinition]) -> Result<LLMResponse> {
        self.requests.lock().unwrap().push(Request {
            messages: messages.to_vec(),
            tools: tools.iter().map(|t| t.name().to_string()).collect(),
        });
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| CareerError::llm("no scripted reply left"))
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
        self.reply(messages, &[])
    }

    async fn chat_with_tools(
        &self,
        _model: &str,
        messages: &[Message],
        tools: &[ToolDefinition],
        _options: Option<GenerateOptions>,
    ) -> Result<LLMResponse> {
        self.reply(messages, tools)
    }

    async fn chat_structured(
        &self,
        _model: &str,
        _messages: &[Message],
        _schema: &OutputSchema,
        _options: Option<GenerateOptions>,
    ) -> Result<Value> {
        self.routes
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| CareerError::llm("no scripted route left"))
    }

    async fn list_models(&self) -> Result<Vec<String>> {
        Ok(vec!["scripted".to_string()])
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Configuration rooted in `dir`: resume at `dir/resume.txt`, letters in `dir/out`
pub fn config_in(dir: &Path) -> Config {
    let mut config = Config::default();
    config.resume.path = dir.join("resume.txt");
    config.resume.output_dir = dir.join("out");
    config.job_search.backend = career_assistant::core::config::JobSearchBackendKind::Guest;
    config
}
