//! Configuration management for the career assistant
//!
//! Supports environment variables, config files, and runtime overrides.
//! Providers and models are interchangeable via settings.
//!
//! Config file location: ~/.config/career-assistant/config.toml

use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

use crate::core::error::{CareerError, Result};

/// Main configuration for the career assistant
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Hosted LLM configuration
    pub llm: LlmConfig,
    /// Ollama configuration
    pub ollama: OllamaConfig,
    /// Supervisor and worker limits
    pub agent: AgentConfig,
    /// Resume input and cover letter output locations
    pub resume: ResumeConfig,
    /// Job search backend configuration
    pub job_search: JobSearchConfig,
    /// Web search and scrape configuration
    pub web: WebConfig,
}

/// Which LLM service answers requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    /// OpenAI chat completions
    #[serde(rename = "openai")]
    OpenAi,
    /// Groq (OpenAI-compatible API)
    Groq,
    /// Local Ollama server
    Ollama,
}

impl ProviderType {
    /// Model used when none is configured for this provider
    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderType::OpenAi => "gpt-4o-mini",
            ProviderType::Groq => "llama-3.1-70b-versatile",
            ProviderType::Ollama => "llama3",
        }
    }
}

impl fmt::Display for ProviderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderType::OpenAi => write!(f, "openai"),
            ProviderType::Groq => write!(f, "groq"),
            ProviderType::Ollama => write!(f, "ollama"),
        }
    }
}

impl FromStr for ProviderType {
    type Err = CareerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(ProviderType::OpenAi),
            "groq" => Ok(ProviderType::Groq),
            "ollama" | "llama3" => Ok(ProviderType::Ollama),
            other => Err(CareerError::config(format!(
                "Unknown provider '{}'. Available: openai, groq, ollama",
                other
            ))),
        }
    }
}

/// Hosted LLM configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider used for routing and workers
    pub provider: ProviderType,
    /// Model identifier understood by the provider
    pub model: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// OpenAI API base URL
    pub openai_base_url: String,
    /// Groq API base URL
    pub groq_base_url: String,
    /// OpenAI API key (never written to disk)
    #[serde(skip_serializing)]
    pub openai_api_key: Option<String>,
    /// Groq API key (never written to disk)
    #[serde(skip_serializing)]
    pub groq_api_key: Option<String>,
}

/// Ollama server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    /// Host address (default: localhost)
    pub host: String,
    /// Port number (default: 11434)
    pub port: u16,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

/// Supervisor and worker limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Routing decisions allowed per turn before the loop is forced to stop
    /// Default: 30
    pub max_steps: usize,
    /// Tool-calling rounds allowed inside one worker run
    /// Default: 15
    pub max_tool_iterations: usize,
    /// Maximum conversation history length kept between turns
    /// Default: 1000
    pub max_history: usize,
    /// Whether to show debug output
    pub debug: bool,
}

/// Resume input and cover letter output locations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResumeConfig {
    /// Resume read by the extractor (PDF, or plain text/markdown)
    pub path: PathBuf,
    /// Directory cover letters are written to
    pub output_dir: PathBuf,
}

/// Which job search strategy to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobSearchBackendKind {
    /// Public guest pages, scraped as HTML
    Guest,
    /// Authenticated LinkedIn voyager API
    Api,
}

impl fmt::Display for JobSearchBackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobSearchBackendKind::Guest => write!(f, "guest"),
            JobSearchBackendKind::Api => write!(f, "api"),
        }
    }
}

impl FromStr for JobSearchBackendKind {
    type Err = CareerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "guest" | "scrape" | "" => Ok(JobSearchBackendKind::Guest),
            "api" | "linkedin_api" => Ok(JobSearchBackendKind::Api),
            other => Err(CareerError::config(format!(
                "Unknown job search backend '{}'. Available: guest, api",
                other
            ))),
        }
    }
}

/// Job search backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JobSearchConfig {
    /// Selected backend
    pub backend: JobSearchBackendKind,
    /// Base URL of the job site
    pub base_url: String,
    /// Timeout for the id search request in seconds
    pub request_timeout_secs: u64,
    /// Timeout for each job detail request in seconds
    pub detail_timeout_secs: u64,
    /// User agent sent to the job site
    pub user_agent: String,
    /// Account email for the API backend (never written to disk)
    #[serde(skip_serializing)]
    pub email: Option<String>,
    /// Account password for the API backend (never written to disk)
    #[serde(skip_serializing)]
    pub password: Option<String>,
}

/// Web search and scrape configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    /// Serper API base URL
    pub serper_base_url: String,
    /// Serper API key (never written to disk)
    #[serde(skip_serializing)]
    pub serper_api_key: Option<String>,
    /// Firecrawl API base URL
    pub firecrawl_base_url: String,
    /// Firecrawl API key (never written to disk)
    #[serde(skip_serializing)]
    pub firecrawl_api_key: Option<String>,
    /// Number of search results requested
    pub num_results: usize,
    /// Maximum characters kept from a scraped page
    pub scrape_char_limit: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

/// Per-turn model settings threaded through the conversation state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Provider answering this turn
    pub provider: ProviderType,
    /// Model identifier
    pub model: String,
    /// Sampling temperature
    pub temperature: f32,
}

fn env_flag(name: &str) -> Option<bool> {
    env::var(name).ok().map(|v| v == "true" || v == "1")
}

fn env_nonempty(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl Default for LlmConfig {
    fn default() -> Self {
        let provider = env_nonempty("CAREER_PROVIDER")
            .and_then(|p| p.parse().ok())
            .unwrap_or(ProviderType::Groq);

        Self {
            provider,
            model: env_nonempty("CAREER_MODEL")
                .unwrap_or_else(|| provider.default_model().to_string()),
            temperature: 0.3,
            timeout_secs: 120,
            openai_base_url: "https://api.openai.com/v1".to_string(),
            groq_base_url: "https://api.groq.com/openai/v1".to_string(),
            openai_api_key: env_nonempty("OPENAI_API_KEY"),
            groq_api_key: env_nonempty("GROQ_API_KEY"),
        }
    }
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: env::var("OLLAMA_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: env::var("OLLAMA_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(11434),
            timeout_secs: 120,
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_steps: 30,
            max_tool_iterations: 15,
            max_history: 1000,
            debug: env_flag("CAREER_DEBUG").unwrap_or(false),
        }
    }
}

impl Default for ResumeConfig {
    fn default() -> Self {
        Self {
            path: env_nonempty("CAREER_RESUME_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("temp").join("resume.pdf")),
            output_dir: env_nonempty("CAREER_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("temp")),
        }
    }
}

impl Default for JobSearchConfig {
    fn default() -> Self {
        Self {
            backend: env_nonempty("CAREER_JOB_BACKEND")
                .and_then(|b| b.parse().ok())
                .unwrap_or(JobSearchBackendKind::Guest),
            base_url: "https://www.linkedin.com".to_string(),
            request_timeout_secs: 30,
            detail_timeout_secs: 15,
            user_agent: "Mozilla/5.0".to_string(),
            email: env_nonempty("LINKEDIN_EMAIL"),
            password: env_nonempty("LINKEDIN_PASS"),
        }
    }
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            serper_base_url: "https://google.serper.dev".to_string(),
            serper_api_key: env_nonempty("SERPER_API_KEY"),
            firecrawl_base_url: "https://api.firecrawl.dev".to_string(),
            firecrawl_api_key: env_nonempty("FIRECRAWL_API_KEY"),
            num_results: 5,
            scrape_char_limit: 10_000,
            timeout_secs: 60,
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("career-assistant")
    }

    /// Get the config file path
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Load configuration from file, environment, and defaults
    /// Priority: CLI args > config file > env vars > defaults
    pub fn load() -> Self {
        // Try to load .env file if it exists
        let _ = dotenvy::dotenv();

        match Self::load_from_file() {
            Ok(config) => config,
            Err(e) => {
                tracing::debug!("using default configuration: {}", e);
                Self::default()
            }
        }
    }

    /// Load configuration from file only
    ///
    /// Secrets are never stored in the file; they are filled from the
    /// environment-backed defaults.
    pub fn load_from_file() -> Result<Self> {
        let config_path = Self::config_file();

        if !config_path.exists() {
            return Err(CareerError::config("Config file not found"));
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|e| CareerError::config(format!("Failed to read config: {}", e)))?;

        Self::from_toml(&content)
    }

    /// Parse a TOML document, filling missing fields from defaults
    pub fn from_toml(content: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(content)
            .map_err(|e| CareerError::config(format!("Failed to parse config: {}", e)))?;

        let max_steps = config.agent.max_steps;
        config.set_max_steps(max_steps)?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let config_dir = Self::config_dir();
        let config_path = Self::config_file();

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .map_err(|e| CareerError::config(format!("Failed to create config dir: {}", e)))?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| CareerError::config(format!("Failed to serialize config: {}", e)))?;

        fs::write(&config_path, content)
            .map_err(|e| CareerError::config(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    /// Save configuration and return the path
    pub fn save_and_get_path(&self) -> Result<PathBuf> {
        self.save()?;
        Ok(Self::config_file())
    }

    /// Get the full Ollama API URL
    pub fn ollama_url(&self) -> String {
        format!("http://{}:{}", self.ollama.host, self.ollama.port)
    }

    /// Model settings for the next turn
    pub fn run_config(&self) -> RunConfig {
        RunConfig {
            provider: self.llm.provider,
            model: self.llm.model.clone(),
            temperature: self.llm.temperature,
        }
    }

    /// Switch provider, resetting the model to that provider's default
    pub fn set_provider(&mut self, provider: ProviderType) {
        self.llm.provider = provider;
        self.llm.model = provider.default_model().to_string();
    }

    /// Update the model
    pub fn set_model(&mut self, model: impl Into<String>) {
        self.llm.model = model.into();
    }

    /// Update the sampling temperature
    pub fn set_temperature(&mut self, temperature: f32) -> Result<()> {
        if !(0.0..=2.0).contains(&temperature) {
            return Err(CareerError::config(format!(
                "Temperature {} out of range 0.0 - 2.0",
                temperature
            )));
        }
        self.llm.temperature = temperature;
        Ok(())
    }

    /// Update the routing step budget; a turn needs at least one decision
    pub fn set_max_steps(&mut self, max_steps: usize) -> Result<()> {
        if max_steps == 0 {
            return Err(CareerError::config("max_steps must be at least 1"));
        }
        self.agent.max_steps = max_steps;
        Ok(())
    }

    /// Generate a default config file content for display
    pub fn default_config_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config)
            .unwrap_or_else(|_| String::from("# Error generating config"))
    }
}
