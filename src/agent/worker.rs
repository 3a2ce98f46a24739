//! Workers
//!
//! Each worker is an instruction prompt plus a fixed tool subset, run through
//! the tool loop. Workers only return text; the routing loop records it.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::agent::executor::AgentExecutor;
use crate::agent::prompts::{
    COVER_LETTER_NEEDS_RESUME, COVER_LETTER_PROMPT, FINISH_PROMPT, JOB_SEARCHER_PROMPT,
    RESUME_ANALYZER_PROMPT, WEB_RESEARCHER_PROMPT,
};
use crate::agent::state::ConversationState;
use crate::agent::supervisor::WorkerKind;
use crate::core::{Config, Message, Result};
use crate::llm::{GenerateOptions, LLMProvider};
use crate::tools::resume::ResumeCache;
use crate::tools::ToolRegistry;

/// A specialist the supervisor can dispatch to
#[async_trait]
pub trait Worker: Send + Sync {
    /// Which worker this is
    fn kind(&self) -> WorkerKind;

    /// Produce this worker's contribution to the conversation
    async fn run(&self, state: &ConversationState) -> Result<String>;
}

/// Worker driving a tool loop with a fixed instruction
pub struct ToolWorker {
    kind: WorkerKind,
    prompt: &'static str,
    executor: AgentExecutor,
}

impl ToolWorker {
    pub fn new(kind: WorkerKind, prompt: &'static str, executor: AgentExecutor) -> Self {
        Self {
            kind,
            prompt,
            executor,
        }
    }
}

#[async_trait]
impl Worker for ToolWorker {
    fn kind(&self) -> WorkerKind {
        self.kind
    }

    async fn run(&self, state: &ConversationState) -> Result<String> {
        self.executor
            .run(self.prompt, &state.messages, &state.run_config)
            .await
    }
}

/// Cover letter writer; refuses up front when there is no resume to work from
pub struct CoverLetterWorker {
    executor: AgentExecutor,
    resume_path: PathBuf,
    resume: Arc<ResumeCache>,
}

impl CoverLetterWorker {
    pub fn new(
        executor: AgentExecutor,
        resume_path: impl Into<PathBuf>,
        resume: Arc<ResumeCache>,
    ) -> Self {
        Self {
            executor,
            resume_path: resume_path.into(),
            resume,
        }
    }

    /// Resume text is readable on disk, or the analyzer worked from an
    /// extraction that succeeded
    async fn resume_available(&self, state: &ConversationState) -> bool {
        if self.resume.load(&self.resume_path).await.is_ok() {
            return true;
        }
        state.has_output_from(WorkerKind::ResumeAnalyzer.name()) && self.resume.has_text()
    }
}

#[async_trait]
impl Worker for CoverLetterWorker {
    fn kind(&self) -> WorkerKind {
        WorkerKind::CoverLetterGenerator
    }

    async fn run(&self, state: &ConversationState) -> Result<String> {
        if !self.resume_available(state).await {
            info!(path = %self.resume_path.display(), "no resume available for cover letter");
            return Ok(COVER_LETTER_NEEDS_RESUME.to_string());
        }

        self.executor
            .run(COVER_LETTER_PROMPT, &state.messages, &state.run_config)
            .await
    }
}

/// Answers directly from the conversation, no tools
pub struct ChatWorker {
    llm: Arc<dyn LLMProvider>,
}

impl ChatWorker {
    pub fn new(llm: Arc<dyn LLMProvider>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl Worker for ChatWorker {
    fn kind(&self) -> WorkerKind {
        WorkerKind::ChatBot
    }

    async fn run(&self, state: &ConversationState) -> Result<String> {
        let mut messages = state.messages.clone();
        messages.push(Message::system(FINISH_PROMPT));

        let response = self
            .llm
            .chat(
                &state.run_config.model,
                &messages,
                Some(GenerateOptions::with_temperature(state.run_config.temperature)),
            )
            .await?;
        Ok(response.content)
    }
}

/// One worker per kind
pub struct Crew {
    resume_analyzer: Arc<dyn Worker>,
    cover_letter_generator: Arc<dyn Worker>,
    job_searcher: Arc<dyn Worker>,
    web_researcher: Arc<dyn Worker>,
    chat_bot: Arc<dyn Worker>,
}

impl Crew {
    /// Assemble a crew from explicit workers
    pub fn with_workers(
        resume_analyzer: Arc<dyn Worker>,
        cover_letter_generator: Arc<dyn Worker>,
        job_searcher: Arc<dyn Worker>,
        web_researcher: Arc<dyn Worker>,
        chat_bot: Arc<dyn Worker>,
    ) -> Self {
        Self {
            resume_analyzer,
            cover_letter_generator,
            job_searcher,
            web_researcher,
            chat_bot,
        }
    }

    /// Build the standard crew, each worker restricted to its own tools
    pub fn new(llm: Arc<dyn LLMProvider>, tools: &ToolRegistry, config: &Config) -> Self {
        let executor = |kind: WorkerKind| {
            AgentExecutor::new(
                Arc::clone(&llm),
                tools.subset(kind.tools()),
                config.agent.max_tool_iterations,
            )
        };

        Self::with_workers(
            Arc::new(ToolWorker::new(
                WorkerKind::ResumeAnalyzer,
                RESUME_ANALYZER_PROMPT,
                executor(WorkerKind::ResumeAnalyzer),
            )),
            Arc::new(CoverLetterWorker::new(
                executor(WorkerKind::CoverLetterGenerator),
                config.resume.path.clone(),
                tools.resume_cache(),
            )),
            Arc::new(ToolWorker::new(
                WorkerKind::JobSearcher,
                JOB_SEARCHER_PROMPT,
                executor(WorkerKind::JobSearcher),
            )),
            Arc::new(ToolWorker::new(
                WorkerKind::WebResearcher,
                WEB_RESEARCHER_PROMPT,
                executor(WorkerKind::WebResearcher),
            )),
            Arc::new(ChatWorker::new(Arc::clone(&llm))),
        )
    }

    /// The worker for `kind`
    pub fn get(&self, kind: WorkerKind) -> &dyn Worker {
        match kind {
            WorkerKind::ResumeAnalyzer => self.resume_analyzer.as_ref(),
            WorkerKind::CoverLetterGenerator => self.cover_letter_generator.as_ref(),
            WorkerKind::JobSearcher => self.job_searcher.as_ref(),
            WorkerKind::WebResearcher => self.web_researcher.as_ref(),
            WorkerKind::ChatBot => self.chat_bot.as_ref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::JobSearchBackendKind;
    use crate::core::{ProviderType, Role, RunConfig, ToolCall};
    use crate::tools::names;
    use crate::llm::testing::ScriptedProvider;

    fn state(prior: Vec<Message>, input: &str) -> ConversationState {
        ConversationState::new(
            prior,
            input,
            RunConfig {
                provider: ProviderType::Ollama,
                model: "llama3".to_string(),
                temperature: 0.0,
            },
        )
    }

    fn config_with_resume(path: PathBuf) -> Config {
        let mut config = Config::default();
        config.resume.path = path;
        config.job_search.backend = JobSearchBackendKind::Guest;
        config
    }

    #[tokio::test]
    async fn test_cover_letter_without_resume_skips_model() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_with_resume(dir.path().join("resume.pdf"));
        let llm = Arc::new(ScriptedProvider::new());
        let tools = ToolRegistry::from_config(&config).unwrap();

        let crew = Crew::new(llm.clone(), &tools, &config);
        let reply = crew
            .get(WorkerKind::CoverLetterGenerator)
            .run(&state(Vec::new(), "write me a cover letter"))
            .await
            .unwrap();

        assert_eq!(reply, COVER_LETTER_NEEDS_RESUME);
        assert_eq!(llm.chat_requests(), 0);
    }

    #[tokio::test]
    async fn test_cover_letter_with_resume_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resume.txt");
        std::fs::write(&path, "Jane Doe, Rust engineer").unwrap();
        let config = config_with_resume(path);
        let llm = Arc::new(ScriptedProvider::new());
        llm.push_text("Dear Hiring Manager, ...");
        let tools = ToolRegistry::from_config(&config).unwrap();

        let crew = Crew::new(llm.clone(), &tools, &config);
        let reply = crew
            .get(WorkerKind::CoverLetterGenerator)
            .run(&state(Vec::new(), "a cover letter for Acme"))
            .await
            .unwrap();

        assert_eq!(reply, "Dear Hiring Manager, ...");
        assert_eq!(llm.chat_requests(), 1);
        assert!(tools.resume_cache().has_text());
    }

    #[tokio::test]
    async fn test_cover_letter_after_failed_analysis() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_with_resume(dir.path().join("resume.pdf"));
        let llm = Arc::new(ScriptedProvider::new());
        let tools = ToolRegistry::from_config(&config).unwrap();

        let crew = Crew::new(llm.clone(), &tools, &config);
        let prior = vec![
            Message::user("analyze my resume"),
            Message::worker(
                "ResumeAnalyzer",
                "I could not find a resume: no resume found at temp/resume.pdf",
            ),
        ];
        let reply = crew
            .get(WorkerKind::CoverLetterGenerator)
            .run(&state(prior, "now a cover letter for Acme"))
            .await
            .unwrap();

        assert_eq!(reply, COVER_LETTER_NEEDS_RESUME);
        assert_eq!(llm.chat_requests(), 0);
    }

    #[tokio::test]
    async fn test_cover_letter_trusts_successful_analysis() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resume.txt");
        std::fs::write(&path, "Jane Doe, Rust engineer").unwrap();
        let config = config_with_resume(path.clone());
        let llm = Arc::new(ScriptedProvider::new());
        let tools = ToolRegistry::from_config(&config).unwrap();
        let crew = Crew::new(llm.clone(), &tools, &config);

        // the analyzer extracts the resume through its tool
        llm.push_tool_calls(vec![ToolCall::new(
            "1",
            names::RESUME_EXTRACTOR,
            serde_json::json!({}),
        )]);
        llm.push_text("Skills: Rust");
        let mut turn = state(Vec::new(), "analyze my resume");
        let summary = crew.get(WorkerKind::ResumeAnalyzer).run(&turn).await.unwrap();
        turn.push(Message::worker("ResumeAnalyzer", summary));

        // the file is gone, but the analysis came from real resume text
        std::fs::remove_file(&path).unwrap();
        llm.push_text("Dear Hiring Manager, ...");
        let reply = crew
            .get(WorkerKind::CoverLetterGenerator)
            .run(&turn)
            .await
            .unwrap();

        assert_eq!(reply, "Dear Hiring Manager, ...");
    }

    #[tokio::test]
    async fn test_chat_worker_appends_finish_prompt() {
        let llm = Arc::new(ScriptedProvider::new());
        llm.push_text("Here is the table in bullet points.");

        let worker = ChatWorker::new(llm.clone());
        let reply = worker
            .run(&state(Vec::new(), "format that as bullets"))
            .await
            .unwrap();

        assert_eq!(reply, "Here is the table in bullet points.");
        let sent = llm.last_request();
        assert_eq!(sent.last().unwrap().role, Role::System);
        assert_eq!(sent.last().unwrap().content, FINISH_PROMPT);
    }

    #[test]
    fn test_crew_maps_every_kind() {
        let dir = std::env::temp_dir().join("career-assistant-crew-tests");
        let config = config_with_resume(dir.join("resume.pdf"));
        let tools = ToolRegistry::from_config(&config).unwrap();
        let crew = Crew::new(Arc::new(ScriptedProvider::new()), &tools, &config);

        for kind in WorkerKind::ALL {
            assert_eq!(crew.get(kind).kind(), kind);
        }
    }
}
