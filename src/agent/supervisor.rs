//! Routing decisions
//!
//! The supervisor reads the whole conversation and names the worker that
//! acts next, or `Finish`. The answer is a structured-output call whose only
//! field must be one of the known labels.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use crate::agent::prompts::{SUPERVISOR_FOLLOW_UP, SUPERVISOR_PROMPT};
use crate::agent::state::ConversationState;
use crate::core::{CareerError, Message, OutputSchema, Result};
use crate::llm::{GenerateOptions, LLMProvider};
use crate::tools::names;

/// The workers the supervisor can dispatch to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkerKind {
    ResumeAnalyzer,
    CoverLetterGenerator,
    JobSearcher,
    WebResearcher,
    ChatBot,
}

impl WorkerKind {
    /// Every worker, in roster order
    pub const ALL: [WorkerKind; 5] = [
        WorkerKind::ResumeAnalyzer,
        WorkerKind::CoverLetterGenerator,
        WorkerKind::JobSearcher,
        WorkerKind::WebResearcher,
        WorkerKind::ChatBot,
    ];

    /// Label used in routing and as the author tag of the worker's messages
    pub fn name(&self) -> &'static str {
        match self {
            WorkerKind::ResumeAnalyzer => "ResumeAnalyzer",
            WorkerKind::CoverLetterGenerator => "CoverLetterGenerator",
            WorkerKind::JobSearcher => "JobSearcher",
            WorkerKind::WebResearcher => "WebResearcher",
            WorkerKind::ChatBot => "ChatBot",
        }
    }

    /// Role description shown to the supervisor
    pub fn description(&self) -> &'static str {
        match self {
            WorkerKind::ResumeAnalyzer => {
                "Responsible for analyzing resumes to extract key information."
            }
            WorkerKind::CoverLetterGenerator => {
                "Specializes in creating and optimizing cover letters tailored to job descriptions. \
                 Highlights the candidate's strengths and ensures the cover letter aligns with the \
                 requirements of the position."
            }
            WorkerKind::JobSearcher => {
                "Conducts job searches based on specified criteria such as industry, location, and job title."
            }
            WorkerKind::WebResearcher => "Conducts online research to gather information from the web.",
            WorkerKind::ChatBot => {
                "If the user is asking to format something or wants information from the messages above."
            }
        }
    }

    /// Tools this worker may call
    pub fn tools(&self) -> &'static [&'static str] {
        match self {
            WorkerKind::ResumeAnalyzer => &[names::RESUME_EXTRACTOR],
            WorkerKind::CoverLetterGenerator => &[
                names::GENERATE_LETTER,
                names::SAVE_LETTER,
                names::RESUME_EXTRACTOR,
            ],
            WorkerKind::JobSearcher => &[names::JOB_SEARCH],
            WorkerKind::WebResearcher => &[names::WEB_SEARCH, names::WEB_SCRAPE],
            WorkerKind::ChatBot => &[],
        }
    }
}

impl fmt::Display for WorkerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A routing decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Worker(WorkerKind),
    Finish,
}

const FINISH_LABEL: &str = "Finish";
const FINISH_DESCRIPTION: &str = "Represents the end of the workflow.";

impl Route {
    /// Label as the model writes it
    pub fn label(&self) -> &'static str {
        match self {
            Route::Worker(kind) => kind.name(),
            Route::Finish => FINISH_LABEL,
        }
    }

    /// Every valid label
    pub fn labels() -> Vec<&'static str> {
        WorkerKind::ALL
            .iter()
            .map(WorkerKind::name)
            .chain(std::iter::once(FINISH_LABEL))
            .collect()
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Route {
    type Err = CareerError;

    /// Exact label match; anything else is an invalid route
    fn from_str(s: &str) -> Result<Self> {
        if s == FINISH_LABEL {
            return Ok(Route::Finish);
        }
        WorkerKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .map(Route::Worker)
            .ok_or_else(|| CareerError::InvalidRoute(s.to_string()))
    }
}

/// Decides which worker acts next
#[async_trait]
pub trait Supervisor: Send + Sync {
    async fn decide(&self, state: &ConversationState) -> Result<Route>;
}

/// Supervisor backed by a structured-output LLM call
pub struct LlmSupervisor {
    llm: Arc<dyn LLMProvider>,
}

impl LlmSupervisor {
    pub fn new(llm: Arc<dyn LLMProvider>) -> Self {
        Self { llm }
    }

    /// Numbered roster of workers plus Finish
    pub fn roster() -> String {
        WorkerKind::ALL
            .iter()
            .map(|kind| (kind.name(), kind.description()))
            .chain(std::iter::once((FINISH_LABEL, FINISH_DESCRIPTION)))
            .enumerate()
            .map(|(i, (name, description))| format!("**{} {}**\nRole: {}", i + 1, name, description))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Schema forcing a single `next_action` label
    pub fn route_schema() -> OutputSchema {
        OutputSchema {
            name: "route".to_string(),
            description: "Select the next role".to_string(),
            schema: json!({
                "type": "object",
                "properties": {
                    "next_action": {
                        "title": "Next",
                        "description": "Select the next role",
                        "type": "string",
                        "enum": Route::labels()
                    }
                },
                "required": ["next_action"]
            }),
        }
    }

    /// Leading instruction, the history, then the trailing instruction
    pub fn build_messages(history: &[Message]) -> Vec<Message> {
        let options = format!(
            "[{}]",
            Route::labels()
                .iter()
                .map(|l| format!("'{}'", l))
                .collect::<Vec<_>>()
                .join(", ")
        );

        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(Message::system(
            SUPERVISOR_PROMPT.replace("{members}", &Self::roster()),
        ));
        messages.extend_from_slice(history);
        messages.push(Message::system(
            SUPERVISOR_FOLLOW_UP.replace("{options}", &options),
        ));
        messages
    }
}

/// Read the label out of a structured answer
pub fn parse_route(value: &Value) -> Result<Route> {
    value
        .get("next_action")
        .and_then(Value::as_str)
        .ok_or_else(|| CareerError::InvalidRoute(value.to_string()))?
        .parse()
}

#[async_trait]
impl Supervisor for LlmSupervisor {
    async fn decide(&self, state: &ConversationState) -> Result<Route> {
        let messages = Self::build_messages(&state.messages);
        let value = self
            .llm
            .chat_structured(
                &state.run_config.model,
                &messages,
                &Self::route_schema(),
                Some(GenerateOptions::with_temperature(state.run_config.temperature)),
            )
            .await?;

        debug!(answer = %value, "supervisor answered");
        parse_route(&value)
    }
}
