//! Custom error types for the career assistant
//!
//! Provides a unified error handling system across all modules.

use thiserror::Error;

/// Main error type for career assistant operations
#[derive(Error, Debug)]
pub enum CareerError {
    /// LLM provider connection or API errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// The supervisor answered with a label outside the routing enumeration
    #[error("Invalid routing decision: '{0}'")]
    InvalidRoute(String),

    /// Tool execution errors
    #[error("Tool execution error: {0}")]
    ToolExecution(String),

    /// Resume could not be read or parsed
    #[error("Resume error: {0}")]
    Resume(String),

    /// Cover letter document could not be written
    #[error("Document error: {0}")]
    Document(String),

    /// Job search backend errors
    #[error("Job search error: {0}")]
    JobSearch(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON parsing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Model not available
    #[error("Model '{0}' not available from provider '{1}'")]
    ModelNotFound(String, String),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Generic error for other cases
    #[error("{0}")]
    Other(String),
}

/// Convenience Result type for career assistant operations
pub type Result<T> = std::result::Result<T, CareerError>;

impl CareerError {
    /// Create an LLM error
    pub fn llm(msg: impl Into<String>) -> Self {
        Self::Llm(msg.into())
    }

    /// Create a tool execution error
    pub fn tool(msg: impl Into<String>) -> Self {
        Self::ToolExecution(msg.into())
    }

    /// Create a resume error
    pub fn resume(msg: impl Into<String>) -> Self {
        Self::Resume(msg.into())
    }

    /// Create a document error
    pub fn document(msg: impl Into<String>) -> Self {
        Self::Document(msg.into())
    }

    /// Create a job search error
    pub fn job_search(msg: impl Into<String>) -> Self {
        Self::JobSearch(msg.into())
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Wrap an error with additional context
    pub fn with_context<E>(context: impl Into<String>, error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::WithContext {
            context: context.into(),
            source: Box::new(error),
        }
    }
}
