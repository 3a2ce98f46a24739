//! Shared types used across the career assistant
//!
//! Contains message structures, tool definitions, and common data types.

use serde::{Deserialize, Serialize};

/// Who produced a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The human asking for help
    User,
    /// Result produced by one of the workers
    Worker,
    /// Instructions for the model
    System,
    /// Model turn inside a worker's tool loop (carries tool calls)
    Assistant,
    /// Observation returned by a tool inside a worker's tool loop
    Tool,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Worker => write!(f, "worker"),
            Role::System => write!(f, "system"),
            Role::Assistant => write!(f, "assistant"),
            Role::Tool => write!(f, "tool"),
        }
    }
}

/// A message in a conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Role of the message sender
    pub role: Role,
    /// Content of the message
    pub content: String,
    /// Name of the worker that produced the message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Tool calls requested by the model
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
    /// Id of the tool call this message answers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl Message {
    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            name: None,
            tool_calls: None,
            tool_call_id: None,
        }
    }

    /// Create a new user message
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Create a worker result tagged with the worker's name
    pub fn worker(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::new(Role::Worker, content)
        }
    }

    /// Create a new system message
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    /// Create a model turn that requests tool calls
    pub fn assistant_with_tools(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            tool_calls: Some(tool_calls),
            ..Self::new(Role::Assistant, content)
        }
    }

    /// Create a tool observation answering `call`
    pub fn tool(call: &ToolCall, content: impl Into<String>) -> Self {
        Self {
            name: Some(call.name.clone()),
            tool_call_id: Some(call.id.clone()),
            ..Self::new(Role::Tool, content)
        }
    }

    /// Whether this message was produced by the named worker
    pub fn is_from(&self, worker: &str) -> bool {
        self.role == Role::Worker && self.name.as_deref() == Some(worker)
    }
}

/// A tool call made by the LLM
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Provider-assigned id, echoed back with the observation
    pub id: String,
    /// Name of the tool to invoke
    pub name: String,
    /// JSON arguments for the tool
    pub arguments: serde_json::Value,
}

impl ToolCall {
    /// Create a new tool call
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: serde_json::Value,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }

    /// Get a string argument by key
    pub fn get_string(&self, key: &str) -> Option<String> {
        self.arguments
            .get(key)
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
    }

    /// Identity of the call for de-duplication: name plus canonical arguments
    pub fn signature(&self) -> String {
        let mut out = format!("{}:", self.name);
        write_canonical(&self.arguments, &mut out);
        out
    }
}

/// Serialize a JSON value with object keys sorted at every level
fn write_canonical(value: &serde_json::Value, out: &mut String) {
    match value {
        serde_json::Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&serde_json::Value::String(key.clone()).to_string());
                out.push(':');
                write_canonical(&map[key], out);
            }
            out.push('}');
        }
        serde_json::Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        other => out.push_str(&other.to_string()),
    }
}

/// Definition of a tool that can be called by the LLM
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Type of tool (always "function" for now)
    #[serde(rename = "type")]
    pub tool_type: String,
    /// Function details
    pub function: FunctionDefinition,
}

/// Function definition within a tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionDefinition {
    /// Name of the function
    pub name: String,
    /// Description of what the function does
    pub description: String,
    /// JSON Schema for the parameters
    pub parameters: serde_json::Value,
}

impl ToolDefinition {
    /// Create a new function tool definition
    pub fn function(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: serde_json::Value,
    ) -> Self {
        Self {
            tool_type: "function".to_string(),
            function: FunctionDefinition {
                name: name.into(),
                description: description.into(),
                parameters,
            },
        }
    }

    /// Name of the described function
    pub fn name(&self) -> &str {
        &self.function.name
    }
}

/// Result of executing a tool
#[derive(Debug, Clone)]
pub struct ToolResult {
    /// Name of the tool that was executed
    pub tool_name: String,
    /// Whether the execution was successful
    pub success: bool,
    /// Output from the tool, or the error text on failure
    pub output: String,
}

impl ToolResult {
    /// Create a successful result
    pub fn success(tool_name: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            success: true,
            output: output.into(),
        }
    }

    /// Create a failed result
    pub fn failure(tool_name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            success: false,
            output: error.into(),
        }
    }

    /// Text handed back to the model
    pub fn observation(&self) -> String {
        if self.success {
            self.output.clone()
        } else {
            format!("Error: {}", self.output)
        }
    }
}

/// A JSON schema the model's answer must conform to
#[derive(Debug, Clone)]
pub struct OutputSchema {
    /// Schema name, used as the forced function name where needed
    pub name: String,
    /// Short description for the provider
    pub description: String,
    /// JSON Schema of the expected object
    pub schema: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_worker_message_is_tagged() {
        let msg = Message::worker("JobSearcher", "3 jobs found");
        assert_eq!(msg.role, Role::Worker);
        assert!(msg.is_from("JobSearcher"));
        assert!(!msg.is_from("ChatBot"));
    }

    #[test]
    fn test_signature_ignores_key_order() {
        let a = ToolCall::new("1", "google_search", json!({"query": "rust", "num": 5}));
        let b = ToolCall::new("2", "google_search", json!({"num": 5, "query": "rust"}));
        assert_eq!(a.signature(), b.signature());
    }

    #[test]
    fn test_tool_message_answers_call() {
        let call = ToolCall::new("call_7", "scrape_website", json!({"url": "https://a.b"}));
        let msg = Message::tool(&call, "page");
        assert_eq!(msg.role, Role::Tool);
        assert_eq!(msg.tool_call_id.as_deref(), Some("call_7"));
    }
}
