//! Per-turn conversation state
//!
//! Created from the committed history plus the new user message, threaded
//! through the routing loop by `&mut`, and handed back to the caller when the
//! loop stops.

use crate::agent::supervisor::Route;
use crate::core::{Message, RunConfig};

/// State of one routing turn
#[derive(Debug, Clone)]
pub struct ConversationState {
    /// Ordered history, append-only within the turn
    pub messages: Vec<Message>,
    /// Latest routing decision
    pub next_step: Option<Route>,
    /// Model settings for this turn
    pub run_config: RunConfig,
    /// Routing decisions taken so far
    pub step_count: usize,
}

impl ConversationState {
    /// Start a turn: prior messages followed by the user's input
    pub fn new(prior: Vec<Message>, user_input: &str, run_config: RunConfig) -> Self {
        let mut messages = prior;
        messages.push(Message::user(user_input));

        Self {
            messages,
            next_step: None,
            run_config,
            step_count: 0,
        }
    }

    /// Append a message
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Content of the last message, or "" when empty
    pub fn last_content(&self) -> &str {
        self.messages
            .last()
            .map(|m| m.content.as_str())
            .unwrap_or_default()
    }

    /// Whether the named worker has contributed to this conversation
    pub fn has_output_from(&self, worker: &str) -> bool {
        self.messages.iter().any(|m| m.is_from(worker))
    }
}
