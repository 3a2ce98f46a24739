//! Tool registry - manages and dispatches tool calls
//!
//! Central hub for registering tools and routing tool calls to handlers.
//! Workers receive a subset holding only the tools they are permitted to use.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::core::{Config, Result, ToolCall, ToolDefinition, ToolResult};
use crate::tools::jobs::{create_backend, JobSearchTool};
use crate::tools::letter::{GenerateLetterTool, SaveLetterTool};
use crate::tools::resume::{ResumeCache, ResumeExtractor};
use crate::tools::web::{FirecrawlClient, ScrapeTool, SerperClient, WebSearchTool};
use crate::tools::Tool;

/// Registry of available tools
#[derive(Clone, Default)]
pub struct ToolRegistry {
    /// Tools indexed by name
    tools: BTreeMap<String, Arc<dyn Tool>>,
    /// Extractions made by the resume tool, shared with subsets
    resume_cache: Arc<ResumeCache>,
}

impl ToolRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding every tool, wired from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut registry = Self::new();

        registry.register(ResumeExtractor::new(
            config.resume.path.clone(),
            Arc::clone(&registry.resume_cache),
        ));
        registry.register(JobSearchTool::new(create_backend(&config.job_search)?));
        registry.register(GenerateLetterTool);
        registry.register(SaveLetterTool::new(config.resume.output_dir.clone()));
        registry.register(WebSearchTool::new(SerperClient::from_config(&config.web)));
        registry.register(ScrapeTool::new(FirecrawlClient::from_config(&config.web)));

        Ok(registry)
    }

    /// Register a tool under the name in its definition
    pub fn register(&mut self, tool: impl Tool + 'static) {
        self.register_arc(Arc::new(tool));
    }

    /// Register an already shared tool
    pub fn register_arc(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.definition().function.name;
        self.tools.insert(name, tool);
    }

    /// A registry restricted to the named tools
    ///
    /// Names that are not registered are skipped with a warning.
    pub fn subset(&self, names: &[&str]) -> Self {
        let mut tools = BTreeMap::new();
        for name in names {
            match self.tools.get(*name) {
                Some(tool) => {
                    tools.insert(name.to_string(), Arc::clone(tool));
                }
                None => warn!(tool = name, "requested tool is not registered"),
            }
        }
        Self {
            tools,
            resume_cache: Arc::clone(&self.resume_cache),
        }
    }

    /// Resume extractions recorded by this registry's `ResumeExtractor`
    pub fn resume_cache(&self) -> Arc<ResumeCache> {
        Arc::clone(&self.resume_cache)
    }

    /// Get all tool definitions
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|tool| tool.definition()).collect()
    }

    /// Names of the registered tools
    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(String::as_str).collect()
    }

    /// Check whether a tool is registered
    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Number of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Execute a tool call
    ///
    /// Never fails: unknown tools and tool errors come back as failed results
    /// so the model can see them.
    pub async fn execute(&self, tool_call: &ToolCall) -> ToolResult {
        let Some(tool) = self.tools.get(&tool_call.name) else {
            return ToolResult::failure(
                &tool_call.name,
                format!("Unknown tool: {}", tool_call.name),
            );
        };

        debug!(tool = %tool_call.name, args = %tool_call.arguments, "executing tool");

        match tool.call(&tool_call.arguments).await {
            Ok(output) => ToolResult::success(&tool_call.name, output),
            Err(e) => {
                warn!(tool = %tool_call.name, error = %e, "tool failed");
                ToolResult::failure(&tool_call.name, e.to_string())
            }
        }
    }
}
