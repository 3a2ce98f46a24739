//! Web research tools
//!
//! Search goes through the Serper API, page retrieval through Firecrawl.
//! Both keys come from the environment; a missing key is reported when the
//! tool is called, not at startup.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};

use crate::core::config::WebConfig;
use crate::core::{CareerError, Result, ToolDefinition};
use crate::tools::{names, required_str, Tool};

/// One organic search hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub snippet: String,
}

#[derive(Debug, Deserialize)]
struct SerperResponse {
    #[serde(default)]
    organic: Vec<SearchResult>,
}

/// Client for the Serper Google search API
#[derive(Clone)]
pub struct SerperClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    num_results: usize,
}

impl SerperClient {
    /// Create a client
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        num_results: usize,
        timeout_secs: u64,
    ) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            num_results,
        }
    }

    /// Create a client from configuration
    pub fn from_config(config: &WebConfig) -> Self {
        Self::new(
            config.serper_base_url.clone(),
            config.serper_api_key.clone(),
            config.num_results,
            config.timeout_secs,
        )
    }

    /// Run a search and return the organic results
    pub async fn search(&self, query: &str) -> Result<Vec<SearchResult>> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| CareerError::config("SERPER_API_KEY is not set"))?;

        let url = format!("{}/search", self.base_url);
        debug!(%url, query, "web search");

        let response = self
            .client
            .post(&url)
            .header("X-API-KEY", api_key)
            .json(&json!({ "q": query, "num": self.num_results }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CareerError::tool(format!(
                "search failed ({}): {}",
                status, body
            )));
        }

        let parsed: SerperResponse = response.json().await?;
        Ok(parsed.organic)
    }
}

/// Render search results the way the research worker reads them
///
/// Hits missing a title, link or snippet are skipped.
pub fn format_results(results: &[SearchResult]) -> String {
    let complete: Vec<&SearchResult> = results
        .iter()
        .filter(|r| !r.title.is_empty() && !r.link.is_empty() && !r.snippet.is_empty())
        .collect();

    if complete.is_empty() {
        return "No results found.".to_string();
    }

    complete
        .iter()
        .map(|r| {
            format!(
                "Title: {}\nLink: {}\nSnippet: {}\n---",
                r.title, r.link, r.snippet
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Deserialize)]
struct FirecrawlResponse {
    #[serde(default)]
    success: bool,
    data: Option<FirecrawlData>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FirecrawlData {
    markdown: Option<String>,
}

/// Client for the Firecrawl scrape API
#[derive(Clone)]
pub struct FirecrawlClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    char_limit: usize,
}

impl FirecrawlClient {
    /// Create a client
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        char_limit: usize,
        timeout_secs: u64,
    ) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            char_limit,
        }
    }

    /// Create a client from configuration
    pub fn from_config(config: &WebConfig) -> Self {
        Self::new(
            config.firecrawl_base_url.clone(),
            config.firecrawl_api_key.clone(),
            config.scrape_char_limit,
            config.timeout_secs,
        )
    }

    /// Fetch a page as markdown, truncated to the configured limit
    pub async fn scrape(&self, url: &str) -> Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| CareerError::config("FIRECRAWL_API_KEY is not set"))?;

        let endpoint = format!("{}/v1/scrape", self.base_url);
        debug!(%url, "scraping page");

        let response = self
            .client
            .post(&endpoint)
            .bearer_auth(api_key)
            .json(&json!({ "url": url, "formats": ["markdown"] }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CareerError::tool(format!("scrape returned {}", status)));
        }

        let parsed: FirecrawlResponse = response.json().await?;
        if !parsed.success {
            return Err(CareerError::tool(
                parsed.error.unwrap_or_else(|| "scrape unsuccessful".to_string()),
            ));
        }

        let markdown = parsed
            .data
            .and_then(|d| d.markdown)
            .ok_or_else(|| CareerError::tool("scrape returned no content"))?;

        Ok(truncate_chars(&markdown, self.char_limit))
    }
}

/// Keep at most `limit` characters, never splitting a code point
pub fn truncate_chars(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

/// `google_search`: web search for the research worker
pub struct WebSearchTool {
    client: SerperClient,
}

impl WebSearchTool {
    pub fn new(client: SerperClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for WebSearchTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::function(
            names::WEB_SEARCH,
            "Search Google for recent results. Returns title, link and snippet of each hit.",
            json!({
                "type": "object",
                "properties": {
                    "query": { "type": "string", "description": "Search query" }
                },
                "required": ["query"]
            }),
        )
    }

    async fn call(&self, args: &serde_json::Value) -> Result<String> {
        let query = required_str(args, "query")?;
        let results = self.client.search(query).await?;
        Ok(format_results(&results))
    }
}

/// `scrape_website`: fetch one page for the research worker
pub struct ScrapeTool {
    client: FirecrawlClient,
}

impl ScrapeTool {
    pub fn new(client: FirecrawlClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for ScrapeTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::function(
            names::WEB_SCRAPE,
            "Scrape a web page and return its main content as markdown.",
            json!({
                "type": "object",
                "properties": {
                    "url": { "type": "string", "description": "URL of the page to scrape" }
                },
                "required": ["url"]
            }),
        )
    }

    async fn call(&self, args: &serde_json::Value) -> Result<String> {
        let url = required_str(args, "url")?;
        match self.client.scrape(url).await {
            Ok(content) => Ok(content),
            Err(e) => {
                warn!(%url, error = %e, "scrape failed");
                Ok(format!("Failed to scrape {}", url))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("hello", 10), "hello");
        assert_eq!(truncate_chars("hello", 2), "he");
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("", 3), "");
    }

    #[test]
    fn test_format_results() {
        let results = vec![SearchResult {
            title: "Rust".to_string(),
            link: "https://rust-lang.org".to_string(),
            snippet: "A language".to_string(),
        }];
        assert_eq!(
            format_results(&results),
            "Title: Rust\nLink: https://rust-lang.org\nSnippet: A language\n---"
        );
        assert_eq!(format_results(&[]), "No results found.");

        let partial = vec![SearchResult {
            title: "Only title".to_string(),
            link: String::new(),
            snippet: String::new(),
        }];
        assert_eq!(format_results(&partial), "No results found.");
    }

    #[tokio::test]
    async fn test_serper_search() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .and(header("X-API-KEY", "key"))
            .and(body_partial_json(json!({"q": "rust jobs"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "organic": [
                    {"title": "Rust Jobs", "link": "https://example.com", "snippet": "Many"},
                    {"title": "No snippet", "link": "https://example.org"}
                ]
            })))
            .mount(&server)
            .await;

        let client = SerperClient::new(server.uri(), Some("key".to_string()), 5, 5);
        let results = client.search("rust jobs").await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "Rust Jobs");
        assert_eq!(results[1].snippet, "");
    }

    #[tokio::test]
    async fn test_search_without_key() {
        let client = SerperClient::new("http://127.0.0.1:9", None, 5, 5);
        let err = client.search("anything").await.unwrap_err();
        assert!(err.to_string().contains("SERPER_API_KEY"));
    }

    #[tokio::test]
    async fn test_scrape_truncates() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/scrape"))
            .and(header("Authorization", "Bearer fc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": {"markdown": "a".repeat(50)}
            })))
            .mount(&server)
            .await;

        let client = FirecrawlClient::new(server.uri(), Some("fc".to_string()), 20, 5);
        let page = client.scrape("https://example.com").await.unwrap();
        assert_eq!(page.chars().count(), 20);
    }

    #[tokio::test]
    async fn test_scrape_tool_reports_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/scrape"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let tool = ScrapeTool::new(FirecrawlClient::new(
            server.uri(),
            Some("fc".to_string()),
            100,
            5,
        ));
        let reply = tool
            .call(&json!({"url": "https://example.com/about"}))
            .await
            .unwrap();
        assert_eq!(reply, "Failed to scrape https://example.com/about");
    }
}
