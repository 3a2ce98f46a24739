//! Agent module - supervisor routing and worker orchestration
//!
//! A supervisor picks which worker acts next; workers run their tools and
//! report back until the supervisor finishes the turn.

pub mod assistant;
pub mod conversation;
pub mod executor;
pub mod orchestrator;
pub mod prompts;
pub mod state;
pub mod supervisor;
pub mod worker;

pub use assistant::{Assistant, APOLOGY};
pub use conversation::Conversation;
pub use executor::AgentExecutor;
pub use orchestrator::{Orchestrator, StepObserver, Termination, TurnOutcome};
pub use state::ConversationState;
pub use supervisor::{LlmSupervisor, Route, Supervisor, WorkerKind};
pub use worker::{ChatWorker, CoverLetterWorker, Crew, ToolWorker, Worker};
