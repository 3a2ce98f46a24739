//! Assistant session
//!
//! Owns the configuration, the committed conversation and the routing loop.
//! A turn's messages are committed only when the turn succeeds.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::error;

use crate::agent::conversation::Conversation;
use crate::agent::orchestrator::{Orchestrator, StepObserver, TurnOutcome};
use crate::core::{Config, Message, ProviderType, Result};
use crate::llm::{create_provider, LLMProvider};
use crate::tools::ToolRegistry;

/// Reply given when a turn fails for any reason
pub const APOLOGY: &str = ":( Sorry, Some error occurred. Can you please try again?";

/// A conversation with the career assistant
pub struct Assistant {
    /// Configuration
    config: Config,
    /// LLM client shared by the supervisor and the workers
    llm: Arc<dyn LLMProvider>,
    /// Routing loop
    orchestrator: Orchestrator,
    /// Committed history
    conversation: Conversation,
    /// Kept so it survives rebuilds
    observer: Option<StepObserver>,
}

impl Assistant {
    /// Create an assistant with the configured provider
    pub fn new(config: Config) -> Result<Self> {
        let llm = create_provider(&config, config.llm.provider)?;
        Self::with_provider(config, llm)
    }

    /// Create an assistant around an existing provider
    pub fn with_provider(config: Config, llm: Arc<dyn LLMProvider>) -> Result<Self> {
        let tools = ToolRegistry::from_config(&config)?;
        let orchestrator = Orchestrator::from_config(Arc::clone(&llm), &tools, &config);
        let conversation = Conversation::new(config.agent.max_history);

        Ok(Self {
            config,
            llm,
            orchestrator,
            conversation,
            observer: None,
        })
    }

    /// Answer one user message
    ///
    /// Never fails: errors are logged and answered with [`APOLOGY`], leaving
    /// the history as it was before the turn.
    pub async fn process(&mut self, user_input: &str) -> String {
        match self.run_turn(user_input).await {
            Ok(outcome) => outcome.reply().to_string(),
            Err(e) => {
                error!(error = %e, "turn failed");
                APOLOGY.to_string()
            }
        }
    }

    /// Run one turn and commit its messages on success
    pub async fn run_turn(&mut self, user_input: &str) -> Result<TurnOutcome> {
        let outcome = self
            .orchestrator
            .run_turn(
                user_input,
                self.conversation.messages(),
                self.config.run_config(),
            )
            .await?;

        self.conversation
            .replace_with(outcome.state.messages.clone());
        Ok(outcome)
    }

    /// Rebuild provider, tools and loop after a configuration change
    fn rebuild(&mut self, llm: Arc<dyn LLMProvider>) -> Result<()> {
        let tools = ToolRegistry::from_config(&self.config)?;
        let mut orchestrator = Orchestrator::from_config(Arc::clone(&llm), &tools, &self.config);
        orchestrator.set_observer(self.observer.clone());

        self.llm = llm;
        self.orchestrator = orchestrator;
        Ok(())
    }

    /// Notify `observer` with each worker as it starts
    pub fn set_observer(&mut self, observer: StepObserver) {
        self.observer = Some(Arc::clone(&observer));
        self.orchestrator.set_observer(Some(observer));
    }

    /// Clear conversation history
    pub fn clear_history(&mut self) {
        self.conversation.clear();
    }

    /// Committed history
    pub fn history(&self) -> &Conversation {
        &self.conversation
    }

    /// Get current configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Name of the active provider
    pub fn provider_name(&self) -> &str {
        self.llm.name()
    }

    /// Switch provider; the model resets to that provider's default
    pub fn set_provider(&mut self, provider: ProviderType) -> Result<()> {
        let llm = create_provider(&self.config, provider)?;
        self.config.set_provider(provider);
        self.rebuild(llm)
    }

    /// Set the model used for routing and workers
    pub fn set_model(&mut self, model: impl Into<String>) {
        self.config.set_model(model);
    }

    /// Set the sampling temperature
    pub fn set_temperature(&mut self, temperature: f32) -> Result<()> {
        self.config.set_temperature(temperature)
    }

    /// Point the resume tools at another file
    pub fn set_resume_path(&mut self, path: impl Into<PathBuf>) -> Result<()> {
        self.config.resume.path = path.into();
        let llm = Arc::clone(&self.llm);
        self.rebuild(llm)
    }

    /// Enable debug mode
    pub fn set_debug(&mut self, debug: bool) {
        self.config.agent.debug = debug;
    }

    /// List models offered by the active provider
    pub async fn list_models(&self) -> Result<Vec<String>> {
        self.llm.list_models().await
    }

    /// Save current configuration to file
    pub fn save_config(&self) -> Result<PathBuf> {
        self.config.save_and_get_path()
    }

    /// Get conversation length
    pub fn conversation_length(&self) -> usize {
        self.conversation.len()
    }

    /// Last reply committed to the history
    pub fn last_reply(&self) -> Option<&Message> {
        self.conversation.get_history().back()
    }
}
