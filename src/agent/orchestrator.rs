//! Routing loop
//!
//! Alternates between the supervisor and the workers until the supervisor
//! says `Finish` or the step budget runs out. Workers always hand control
//! back to the supervisor.

use std::sync::Arc;

use tracing::{info, warn};

use crate::agent::state::ConversationState;
use crate::agent::supervisor::{LlmSupervisor, Route, Supervisor, WorkerKind};
use crate::agent::worker::Crew;
use crate::core::{Config, Message, Result, RunConfig};
use crate::llm::LLMProvider;
use crate::tools::ToolRegistry;

/// Called with each worker just before it runs
pub type StepObserver = Arc<dyn Fn(WorkerKind) + Send + Sync>;

/// Why a turn stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The supervisor chose `Finish`
    Finished,
    /// The step budget ran out first
    StepCap,
}

/// Result of one user turn
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub state: ConversationState,
    pub termination: Termination,
}

impl TurnOutcome {
    /// Text shown to the user: the last message of the turn
    pub fn reply(&self) -> &str {
        self.state.last_content()
    }
}

/// Drives supervisor decisions and worker runs for one turn at a time
pub struct Orchestrator {
    supervisor: Arc<dyn Supervisor>,
    crew: Crew,
    max_steps: usize,
    observer: Option<StepObserver>,
}

impl Orchestrator {
    pub fn new(supervisor: Arc<dyn Supervisor>, crew: Crew, max_steps: usize) -> Self {
        Self {
            supervisor,
            crew,
            max_steps,
            observer: None,
        }
    }

    /// Standard setup: LLM supervisor and the full crew
    pub fn from_config(llm: Arc<dyn LLMProvider>, tools: &ToolRegistry, config: &Config) -> Self {
        let crew = Crew::new(Arc::clone(&llm), tools, config);
        Self::new(Arc::new(LlmSupervisor::new(llm)), crew, config.agent.max_steps)
    }

    /// Notify `observer` before each worker runs
    pub fn with_observer(mut self, observer: StepObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn set_observer(&mut self, observer: Option<StepObserver>) {
        self.observer = observer;
    }

    /// Run one user turn over the prior conversation
    ///
    /// Hitting the step budget is not an error: the outcome carries whatever
    /// the workers produced so far.
    pub async fn run_turn(
        &self,
        user_input: &str,
        prior: Vec<Message>,
        run_config: RunConfig,
    ) -> Result<TurnOutcome> {
        let mut state = ConversationState::new(prior, user_input, run_config);

        loop {
            if state.step_count >= self.max_steps {
                warn!(steps = state.step_count, "step budget exhausted, stopping turn");
                return Ok(TurnOutcome {
                    state,
                    termination: Termination::StepCap,
                });
            }

            let route = self.supervisor.decide(&state).await?;
            state.step_count += 1;
            state.next_step = Some(route);

            let kind = match route {
                Route::Finish => {
                    info!(steps = state.step_count, "turn finished");
                    return Ok(TurnOutcome {
                        state,
                        termination: Termination::Finished,
                    });
                }
                Route::Worker(kind) => kind,
            };

            info!(worker = kind.name(), step = state.step_count, "dispatching");
            if let Some(observer) = &self.observer {
                observer(kind);
            }

            let output = self.crew.get(kind).run(&state).await?;
            state.push(Message::worker(kind.name(), output));
        }
    }
}
