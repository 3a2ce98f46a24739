//! Tools module - Tool implementations for the workers
//!
//! Contains resume extraction, cover letter tools, job search, web research,
//! and the tool registry.

pub mod jobs;
pub mod letter;
pub mod registry;
pub mod resume;
pub mod web;

use async_trait::async_trait;

use crate::core::{Result, ToolDefinition};

pub use registry::ToolRegistry;

/// Tool names as the model sees them
pub mod names {
    pub const RESUME_EXTRACTOR: &str = "ResumeExtractor";
    pub const JOB_SEARCH: &str = "JobSearchTool";
    pub const GENERATE_LETTER: &str = "generate_letter_for_specific_job";
    pub const SAVE_LETTER: &str = "save_cover_letter_for_specific_job";
    pub const WEB_SEARCH: &str = "google_search";
    pub const WEB_SCRAPE: &str = "scrape_website";
}

/// A capability a worker's model may invoke
#[async_trait]
pub trait Tool: Send + Sync {
    /// Schema advertised to the model
    fn definition(&self) -> ToolDefinition;

    /// Run the tool with the model-supplied arguments
    async fn call(&self, args: &serde_json::Value) -> Result<String>;
}

/// Read a required string argument
pub(crate) fn required_str<'a>(args: &'a serde_json::Value, key: &str) -> Result<&'a str> {
    args.get(key).and_then(|v| v.as_str()).ok_or_else(|| {
        crate::core::CareerError::tool(format!("missing required string argument '{}'", key))
    })
}
