//! Job search
//!
//! Two interchangeable backends find job ids and fetch their details:
//! `GuestSearch` scrapes the public guest pages, `LinkedInApi` talks to the
//! authenticated voyager API. Detail fetches fan out one task per id.

pub mod api;
pub mod filters;
pub mod guest;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::json;
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::core::config::{JobSearchBackendKind, JobSearchConfig};
use crate::core::{CareerError, Result, ToolDefinition};
use crate::tools::{names, Tool};

pub use api::LinkedInApi;
pub use guest::GuestSearch;

/// A job posting as handed to the model
///
/// Every field falls back to an empty string when it cannot be extracted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobPosting {
    #[serde(default)]
    pub job_title: String,
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub job_location: String,
    #[serde(default)]
    pub job_desc_text: String,
    #[serde(default)]
    pub apply_link: String,
    #[serde(default)]
    pub time_posted: String,
    #[serde(default)]
    pub num_applicants: String,
    /// Only filled by the API backend
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub company_url: String,
    /// Only filled by the API backend
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub work_remote_allowed: String,
}

/// Search parameters as supplied by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSearchQuery {
    pub keywords: String,
    #[serde(default)]
    pub location_name: Option<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub employment_type: Vec<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub job_type: Vec<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub experience: Vec<String>,
    #[serde(default = "default_limit", deserialize_with = "limit_value")]
    pub limit: usize,
    /// Maximum posting age in seconds
    #[serde(default = "default_listed_at", deserialize_with = "listed_at_value")]
    pub listed_at: u64,
    /// Search radius in miles
    #[serde(default = "default_distance", deserialize_with = "distance_value")]
    pub distance: u32,
}

fn default_limit() -> usize {
    5
}

fn default_listed_at() -> u64 {
    86_400
}

fn default_distance() -> u32 {
    25
}

impl JobSearchQuery {
    /// Query with only keywords set
    pub fn new(keywords: impl Into<String>) -> Self {
        Self {
            keywords: keywords.into(),
            location_name: None,
            employment_type: Vec::new(),
            job_type: Vec::new(),
            experience: Vec::new(),
            limit: default_limit(),
            listed_at: default_listed_at(),
            distance: default_distance(),
        }
    }

    /// Location, if a non-blank one was given
    pub fn location(&self) -> Option<&str> {
        self.location_name
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
    }
}

/// Accept `"remote"`, `["remote", "hybrid"]` or `null`
fn one_or_many<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        Some(OneOrMany::One(value)) => vec![value],
        Some(OneOrMany::Many(values)) => values,
        None => Vec::new(),
    })
}

/// Accept `25`, `"25"` or `null`
fn lenient_number<'de, D>(deserializer: D) -> std::result::Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(u64),
        Text(String),
    }

    match Option::<NumberOrString>::deserialize(deserializer)? {
        Some(NumberOrString::Number(n)) => Ok(Some(n)),
        Some(NumberOrString::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(NumberOrString::Text(text)) => text
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("expected a number, got '{}'", text))),
        None => Ok(None),
    }
}

fn limit_value<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<usize, D::Error> {
    Ok(lenient_number(d)?
        .filter(|n| *n > 0)
        .map(|n| n as usize)
        .unwrap_or_else(default_limit))
}

fn listed_at_value<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<u64, D::Error> {
    Ok(lenient_number(d)?
        .filter(|n| *n > 0)
        .unwrap_or_else(default_listed_at))
}

/// Zero or missing distance means the default radius
fn distance_value<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<u32, D::Error> {
    Ok(lenient_number(d)?
        .filter(|n| *n > 0)
        .map(|n| u32::try_from(n).unwrap_or(u32::MAX))
        .unwrap_or_else(default_distance))
}

/// A source of job postings
#[async_trait]
pub trait JobSearchBackend: Send + Sync {
    /// Ids of jobs matching the query, at most `query.limit`
    async fn search_job_ids(&self, query: &JobSearchQuery) -> Result<Vec<String>>;

    /// Details for each id, in the same order
    ///
    /// Never fails as a whole: an id that cannot be fetched yields an empty
    /// posting in its slot.
    async fn fetch_job_details(&self, job_ids: &[String]) -> Vec<JobPosting>;

    /// Backend name for logs
    fn name(&self) -> &str;
}

/// Build the backend selected in configuration
pub fn create_backend(config: &JobSearchConfig) -> Result<Arc<dyn JobSearchBackend>> {
    match config.backend {
        JobSearchBackendKind::Guest => Ok(Arc::new(GuestSearch::from_config(config))),
        JobSearchBackendKind::Api => Ok(Arc::new(LinkedInApi::from_config(config)?)),
    }
}

/// Run `fetch` for every id concurrently, each under `timeout`
///
/// Results land in the slot of their id; failures and timeouts leave the
/// default posting there.
pub(crate) async fn fetch_all<F, Fut>(
    job_ids: &[String],
    timeout: Duration,
    fetch: F,
) -> Vec<JobPosting>
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = Result<JobPosting>> + Send + 'static,
{
    let mut slots = vec![JobPosting::default(); job_ids.len()];
    let mut tasks = JoinSet::new();

    for (index, job_id) in job_ids.iter().enumerate() {
        let request = fetch(job_id.clone());
        let job_id = job_id.clone();
        tasks.spawn(async move { (index, job_id, tokio::time::timeout(timeout, request).await) });
    }

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, _, Ok(Ok(posting)))) => slots[index] = posting,
            Ok((_, job_id, Ok(Err(e)))) => {
                warn!(%job_id, error = %e, "failed to fetch job details")
            }
            Ok((_, job_id, Err(_))) => warn!(%job_id, "job details request timed out"),
            Err(e) => warn!(error = %e, "job detail task aborted"),
        }
    }

    slots
}

/// `JobSearchTool`: find jobs and return their details as JSON
pub struct JobSearchTool {
    backend: Arc<dyn JobSearchBackend>,
}

impl JobSearchTool {
    pub fn new(backend: Arc<dyn JobSearchBackend>) -> Self {
        Self { backend }
    }

    /// Search and fetch; a failed search is logged and yields no postings
    pub async fn search(&self, query: &JobSearchQuery) -> Vec<JobPosting> {
        let job_ids = match self.backend.search_job_ids(query).await {
            Ok(ids) => ids,
            Err(e) => {
                warn!(backend = self.backend.name(), error = %e, "job search failed");
                return Vec::new();
            }
        };

        info!(
            backend = self.backend.name(),
            keywords = %query.keywords,
            found = job_ids.len(),
            "job ids found"
        );

        if job_ids.is_empty() {
            return Vec::new();
        }
        self.backend.fetch_job_details(&job_ids).await
    }
}

#[async_trait]
impl Tool for JobSearchTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::function(
            names::JOB_SEARCH,
            "Search LinkedIn for job postings. Returns title, company, location, \
             description and apply link for each job.",
            json!({
                "type": "object",
                "properties": {
                    "keywords": {
                        "type": "string",
                        "description": "Job title or skills to search for"
                    },
                    "location_name": {
                        "type": "string",
                        "description": "City, region or country"
                    },
                    "employment_type": {
                        "type": "array",
                        "items": {
                            "type": "string",
                            "enum": ["full-time", "contract", "part-time", "temporary",
                                     "internship", "volunteer", "other"]
                        }
                    },
                    "job_type": {
                        "type": "array",
                        "items": { "type": "string", "enum": ["onsite", "remote", "hybrid"] }
                    },
                    "experience": {
                        "type": "array",
                        "items": {
                            "type": "string",
                            "enum": ["internship", "entry-level", "associate",
                                     "mid-senior-level", "director", "executive"]
                        }
                    },
                    "limit": { "type": "integer", "description": "Maximum number of jobs (default 5)" },
                    "listed_at": { "type": "integer", "description": "Maximum age in seconds (default 86400)" },
                    "distance": { "type": "integer", "description": "Search radius in miles (default 25)" }
                },
                "required": ["keywords"]
            }),
        )
    }

    async fn call(&self, args: &serde_json::Value) -> Result<String> {
        let query: JobSearchQuery = serde_json::from_value(args.clone())
            .map_err(|e| CareerError::tool(format!("invalid job search arguments: {}", e)))?;

        let postings = self.search(&query).await;
        Ok(serde_json::to_string_pretty(&postings)?)
    }
}
