//! Cover letter tools
//!
//! `generate_letter_for_specific_job` bundles the job and resume details the
//! model drafts from; `save_cover_letter_for_specific_job` writes the final
//! text as a `.docx` and returns its location.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use docx_rs::{Docx, Paragraph, Run};
use serde_json::json;
use tracing::info;

use crate::core::{CareerError, Result, ToolDefinition};
use crate::tools::{names, required_str, Tool};

/// Reduce a company name to characters safe for a file name
///
/// Anything outside `[A-Za-z0-9_-]` becomes `_`, so the result can never
/// escape the output directory.
pub fn sanitize_company_name(company: &str) -> String {
    let cleaned: String = company
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.trim_matches('_').is_empty() {
        "company".to_string()
    } else {
        cleaned
    }
}

/// Write `content` to `<dir>/<company>_cover_letter.docx`
///
/// Creates `dir` when missing and returns the absolute path of the document.
pub fn write_cover_letter(dir: &Path, content: &str, company: &str) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .map_err(|e| CareerError::with_context(format!("creating {}", dir.display()), e))?;

    let path = dir.join(format!("{}_cover_letter.docx", sanitize_company_name(company)));

    let docx = content.lines().fold(Docx::new(), |doc, line| {
        doc.add_paragraph(Paragraph::new().add_run(Run::new().add_text(line)))
    });

    let file = File::create(&path)
        .map_err(|e| CareerError::with_context(format!("creating {}", path.display()), e))?;
    docx.build()
        .pack(file)
        .map_err(|e| CareerError::document(format!("failed to write {}: {}", path.display(), e)))?;

    let absolute = fs::canonicalize(&path).unwrap_or(path);
    info!(path = %absolute.display(), "cover letter saved");
    Ok(absolute)
}

/// Echoes back the job and resume details a letter should be drafted from
pub struct GenerateLetterTool;

#[async_trait]
impl Tool for GenerateLetterTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::function(
            names::GENERATE_LETTER,
            "Generate a cover letter for a specific job. Takes the job details and the \
             resume details and returns them for drafting the letter.",
            json!({
                "type": "object",
                "properties": {
                    "job_details": {
                        "type": "string",
                        "description": "Title, company and description of the job"
                    },
                    "resume_details": {
                        "type": "string",
                        "description": "Relevant skills and experience from the resume"
                    }
                },
                "required": ["job_details", "resume_details"]
            }),
        )
    }

    async fn call(&self, args: &serde_json::Value) -> Result<String> {
        let job_details = required_str(args, "job_details")?;
        let resume_details = required_str(args, "resume_details")?;

        Ok(json!({
            "job_details": job_details,
            "resume_details": resume_details,
        })
        .to_string())
    }
}

/// Saves a finished cover letter as a Word document
pub struct SaveLetterTool {
    output_dir: PathBuf,
}

impl SaveLetterTool {
    /// Create the tool writing into `output_dir`
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }
}

#[async_trait]
impl Tool for SaveLetterTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::function(
            names::SAVE_LETTER,
            "Save the finished cover letter as a .docx document and return the download link.",
            json!({
                "type": "object",
                "properties": {
                    "cover_letter_content": {
                        "type": "string",
                        "description": "Full text of the cover letter"
                    },
                    "company_name": {
                        "type": "string",
                        "description": "Name of the company the letter is addressed to"
                    }
                },
                "required": ["cover_letter_content", "company_name"]
            }),
        )
    }

    async fn call(&self, args: &serde_json::Value) -> Result<String> {
        let content = required_str(args, "cover_letter_content")?;
        let company = required_str(args, "company_name")?;

        let dir = self.output_dir.clone();
        let content = content.to_string();
        let company = company.to_string();
        // docx packing and file writes are blocking
        let path = tokio::task::spawn_blocking(move || write_cover_letter(&dir, &content, &company))
            .await
            .map_err(|e| CareerError::document(format!("cover letter writer crashed: {}", e)))??;

        Ok(format!("Here is the download link: {}", path.display()))
    }
}
