//! Tool-calling loop run by each worker
//!
//! Sends the worker's instruction and the conversation to the model together
//! with the worker's tools. Tool calls are executed and fed back as
//! observations until the model answers in plain text.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::agent::prompts::ITERATION_LIMIT_REPLY;
use crate::core::{Message, Result, RunConfig};
use crate::llm::{GenerateOptions, LLMProvider};
use crate::tools::ToolRegistry;

/// Runs one worker's model against its permitted tools
pub struct AgentExecutor {
    llm: Arc<dyn LLMProvider>,
    tools: ToolRegistry,
    max_iterations: usize,
}

impl AgentExecutor {
    pub fn new(llm: Arc<dyn LLMProvider>, tools: ToolRegistry, max_iterations: usize) -> Self {
        Self {
            llm,
            tools,
            max_iterations,
        }
    }

    /// Run the loop and return the model's final text
    ///
    /// A repeated call with the same tool and arguments reuses the first
    /// observation instead of running the tool again.
    pub async fn run(
        &self,
        system_prompt: &str,
        history: &[Message],
        run_config: &RunConfig,
    ) -> Result<String> {
        let definitions = self.tools.definitions();
        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(Message::system(system_prompt));
        messages.extend_from_slice(history);

        let mut observations: HashMap<String, String> = HashMap::new();

        for iteration in 0..self.max_iterations {
            let options = Some(GenerateOptions::with_temperature(run_config.temperature));
            let response = if definitions.is_empty() {
                self.llm.chat(&run_config.model, &messages, options).await?
            } else {
                self.llm
                    .chat_with_tools(&run_config.model, &messages, &definitions, options)
                    .await?
            };

            if response.tool_calls.is_empty() {
                return Ok(response.content);
            }

            debug!(
                iteration,
                calls = response.tool_calls.len(),
                "model requested tools"
            );
            messages.push(Message::assistant_with_tools(
                response.content.clone(),
                response.tool_calls.clone(),
            ));

            for call in &response.tool_calls {
                let signature = call.signature();
                let observation = match observations.get(&signature) {
                    Some(previous) => {
                        debug!(tool = %call.name, "repeated tool call, reusing observation");
                        previous.clone()
                    }
                    None => {
                        let observation = self.tools.execute(call).await.observation();
                        observations.insert(signature, observation.clone());
                        observation
                    }
                };
                messages.push(Message::tool(call, observation));
            }
        }

        warn!(max = self.max_iterations, "tool loop stopped at iteration limit");
        Ok(ITERATION_LIMIT_REPLY.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use serde_json::json;

    use crate::core::{ProviderType, Role, ToolCall, ToolDefinition};
    use crate::llm::testing::ScriptedProvider;
    use crate::tools::Tool;

    struct Counter {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Tool for Counter {
        fn definition(&self) -> ToolDefinition {
            ToolDefinition::function("google_search", "Search", json!({"type": "object"}))
        }

        async fn call(&self, _args: &serde_json::Value) -> Result<String> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(format!("result #{}", n))
        }
    }

    fn run_config() -> RunConfig {
        RunConfig {
            provider: ProviderType::Ollama,
            model: "llama3".to_string(),
            temperature: 0.0,
        }
    }

    fn executor(llm: Arc<ScriptedProvider>, calls: Arc<AtomicUsize>, max: usize) -> AgentExecutor {
        let mut tools = ToolRegistry::new();
        tools.register(Counter { calls });
        AgentExecutor::new(llm, tools, max)
    }

    #[tokio::test]
    async fn test_plain_answer_without_tools() {
        let llm = Arc::new(ScriptedProvider::new());
        llm.push_text("hello there");

        let exec = AgentExecutor::new(llm.clone(), ToolRegistry::new(), 5);
        let reply = exec
            .run("be nice", &[Message::user("hi")], &run_config())
            .await
            .unwrap();

        assert_eq!(reply, "hello there");
        let sent = llm.last_request();
        assert_eq!(sent[0].role, Role::System);
        assert_eq!(sent[1].content, "hi");
    }

    #[tokio::test]
    async fn test_duplicate_calls_run_once() {
        let llm = Arc::new(ScriptedProvider::new());
        let calls = Arc::new(AtomicUsize::new(0));

        llm.push_tool_calls(vec![ToolCall::new("a", "google_search", json!({"query": "rust", "n": 1}))]);
        llm.push_tool_calls(vec![
            ToolCall::new("b", "google_search", json!({"n": 1, "query": "rust"})),
            ToolCall::new("c", "google_search", json!({"query": "rust", "n": 1})),
        ]);
        llm.push_text("done");

        let exec = executor(llm.clone(), calls.clone(), 5);
        let reply = exec
            .run("research", &[Message::user("rust?")], &run_config())
            .await
            .unwrap();

        assert_eq!(reply, "done");
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let observations: Vec<String> = llm
            .last_request()
            .into_iter()
            .filter(|m| m.role == Role::Tool)
            .map(|m| m.content)
            .collect();
        assert_eq!(observations, vec!["result #1"; 3]);
    }

    #[tokio::test]
    async fn test_distinct_arguments_both_run() {
        let llm = Arc::new(ScriptedProvider::new());
        let calls = Arc::new(AtomicUsize::new(0));

        llm.push_tool_calls(vec![
            ToolCall::new("a", "google_search", json!({"query": "rust"})),
            ToolCall::new("b", "google_search", json!({"query": "go"})),
        ]);
        llm.push_text("done");

        executor(llm, calls.clone(), 5)
            .run("research", &[], &run_config())
            .await
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_iteration_limit() {
        let llm = Arc::new(ScriptedProvider::new());
        let calls = Arc::new(AtomicUsize::new(0));
        for i in 0..3 {
            llm.push_tool_calls(vec![ToolCall::new(
                "x",
                "google_search",
                json!({"query": format!("q{}", i)}),
            )]);
        }

        let reply = executor(llm, calls.clone(), 2)
            .run("research", &[], &run_config())
            .await
            .unwrap();

        assert_eq!(reply, ITERATION_LIMIT_REPLY);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_unknown_tool_becomes_observation() {
        let llm = Arc::new(ScriptedProvider::new());
        llm.push_tool_calls(vec![ToolCall::new("a", "rm_rf", json!({}))]);
        llm.push_text("sorry");

        let exec = executor(llm.clone(), Arc::new(AtomicUsize::new(0)), 5);
        let reply = exec.run("x", &[], &run_config()).await.unwrap();

        assert_eq!(reply, "sorry");
        let last = llm.last_request();
        let observation = last.iter().find(|m| m.role == Role::Tool).unwrap();
        assert!(observation.content.starts_with("Error: Unknown tool"));
    }

    #[tokio::test]
    async fn test_llm_failure_propagates() {
        let llm = Arc::new(ScriptedProvider::new());
        let exec = AgentExecutor::new(llm, ToolRegistry::new(), 5);
        assert!(exec.run("x", &[], &run_config()).await.is_err());
    }
}
