//! Career Assistant - multi-agent job search helper
//!
//! A supervisor model routes each request between specialist workers that
//! analyze a resume, search job listings, write cover letters and research
//! the web, until it decides the request is answered.
//!
//! # Architecture
//!
//! - **Core**: Shared types, configuration, and error handling
//! - **LLM**: Provider abstraction over OpenAI, Groq and Ollama
//! - **Tools**: Resume extraction, job search, cover letters, web research
//! - **Agent**: Supervisor, workers, routing loop and session
//! - **CLI**: Command-line interface and REPL
//!
//! # Usage
//!
//! ```rust,no_run
//! use career_assistant::{Assistant, Config};
//!
//! #[tokio::main]
//! async fn main() -> career_assistant::Result<()> {
//!     let mut assistant = Assistant::new(Config::load())?;
//!
//!     let reply = assistant.process("Summarize my resume").await;
//!     println!("{}", reply);
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod cli;
pub mod core;
pub mod llm;
pub mod tools;

// Re-export commonly used items
pub use agent::{Assistant, Orchestrator, Route, TurnOutcome, WorkerKind};
pub use cli::Repl;
pub use core::{CareerError, Config, ProviderType, Result};
