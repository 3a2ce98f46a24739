//! Resume extraction
//!
//! Reads the uploaded resume from its fixed location. PDFs go through
//! `pdf-extract`; plain text and markdown resumes are read as-is.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::SystemTime;

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use crate::core::{CareerError, Result, ToolDefinition};
use crate::tools::{names, Tool};

/// Load the text of a resume
///
/// A missing, unreadable or empty resume is an error, never an empty string.
pub async fn load_resume(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(CareerError::resume(format!(
            "no resume found at {}",
            path.display()
        )));
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    let text = match extension.as_str() {
        "pdf" => {
            let owned = path.to_path_buf();
            // pdf-extract is synchronous and may panic on malformed input
            tokio::task::spawn_blocking(move || pdf_extract::extract_text(&owned))
                .await
                .map_err(|e| {
                    CareerError::resume(format!("PDF parser crashed on {}: {}", path.display(), e))
                })?
                .map_err(|e| {
                    CareerError::resume(format!("failed to parse {}: {}", path.display(), e))
                })?
        }
        "txt" | "md" | "markdown" => tokio::fs::read_to_string(path)
            .await
            .map_err(|e| CareerError::with_context(format!("reading {}", path.display()), e))?,
        other => {
            return Err(CareerError::resume(format!(
                "unsupported resume format '{}' ({}); use PDF, .txt or .md",
                other,
                path.display()
            )))
        }
    };

    if text.trim().is_empty() {
        return Err(CareerError::resume(format!(
            "{} contains no extractable text",
            path.display()
        )));
    }

    debug!(path = %path.display(), chars = text.len(), "resume loaded");
    Ok(text)
}

/// Identity of a file version: path, modification time and size
#[derive(Debug, Clone, PartialEq, Eq)]
struct FileStamp {
    path: PathBuf,
    modified: SystemTime,
    len: u64,
}

impl FileStamp {
    async fn read(path: &Path) -> Option<Self> {
        let metadata = tokio::fs::metadata(path).await.ok()?;
        Some(Self {
            path: path.to_path_buf(),
            modified: metadata.modified().ok()?,
            len: metadata.len(),
        })
    }
}

/// Last successful extraction, reused while the file is unchanged
///
/// Shared by the extractor tool and the cover letter worker, so a resume is
/// parsed once per version of the file.
#[derive(Debug, Default)]
pub struct ResumeCache {
    last: Mutex<Option<(FileStamp, String)>>,
}

impl ResumeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text of the resume at `path`; extracts again only when the file changed
    pub async fn load(&self, path: &Path) -> Result<String> {
        let stamp = FileStamp::read(path).await;

        let cached = stamp.as_ref().and_then(|stamp| self.cached_text(stamp));
        if let Some(text) = cached {
            debug!(path = %path.display(), "resume unchanged, reusing extraction");
            return Ok(text);
        }

        let text = load_resume(path).await?;
        if let Some(stamp) = stamp {
            *self.lock() = Some((stamp, text.clone()));
        }
        Ok(text)
    }

    /// Whether any extraction has succeeded through this cache
    pub fn has_text(&self) -> bool {
        self.lock().is_some()
    }

    fn cached_text(&self, stamp: &FileStamp) -> Option<String> {
        self.lock()
            .as_ref()
            .filter(|(cached, _)| cached == stamp)
            .map(|(_, text)| text.clone())
    }

    fn lock(&self) -> MutexGuard<'_, Option<(FileStamp, String)>> {
        self.last.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Tool exposing the uploaded resume to workers
pub struct ResumeExtractor {
    path: PathBuf,
    cache: Arc<ResumeCache>,
}

impl ResumeExtractor {
    /// Create an extractor for the resume at `path`, recording into `cache`
    pub fn new(path: impl Into<PathBuf>, cache: Arc<ResumeCache>) -> Self {
        Self {
            path: path.into(),
            cache,
        }
    }
}

#[async_trait]
impl Tool for ResumeExtractor {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::function(
            names::RESUME_EXTRACTOR,
            "Extract the content of the uploaded resume. Returns the skills, experience \
             and qualifications text of the candidate's CV.",
            json!({ "type": "object", "properties": {} }),
        )
    }

    async fn call(&self, _args: &serde_json::Value) -> Result<String> {
        self.cache.load(&self.path).await
    }
}
