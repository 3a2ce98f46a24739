//! Conversation history management
//!
//! Holds the committed history between turns with a configurable limit.

use std::collections::VecDeque;

use crate::core::{Message, Role};

/// Committed conversation history
#[derive(Debug, Clone)]
pub struct Conversation {
    /// Message history
    messages: VecDeque<Message>,
    /// Maximum history length
    max_length: usize,
}

impl Conversation {
    /// Create a new conversation
    pub fn new(max_length: usize) -> Self {
        Self {
            messages: VecDeque::new(),
            max_length,
        }
    }

    /// Replace the history with the messages of a finished turn
    ///
    /// Oldest messages are dropped once the limit is exceeded.
    pub fn replace_with(&mut self, messages: Vec<Message>) {
        self.messages = messages.into();
        while self.messages.len() > self.max_length {
            self.messages.pop_front();
        }
    }

    /// Copy of the history, oldest first
    pub fn messages(&self) -> Vec<Message> {
        self.messages.iter().cloned().collect()
    }

    /// Get messages without copying
    pub fn get_history(&self) -> &VecDeque<Message> {
        &self.messages
    }

    /// Get the last N messages
    pub fn last_n(&self, n: usize) -> Vec<&Message> {
        self.messages.iter().rev().take(n).rev().collect()
    }

    /// Get the last user message
    pub fn last_user_message(&self) -> Option<&Message> {
        self.messages.iter().rev().find(|m| m.role == Role::User)
    }

    /// Get the last worker message
    pub fn last_worker_message(&self) -> Option<&Message> {
        self.messages.iter().rev().find(|m| m.role == Role::Worker)
    }

    /// Clear all history
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Get message count
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new(1000)
    }
}
