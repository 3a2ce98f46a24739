//! Job search against a mocked job board
//!
//! The guest backend is pointed at a local wiremock server serving a search
//! page and one detail page per job.

use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use career_assistant::core::config::{JobSearchBackendKind, JobSearchConfig};
use career_assistant::tools::jobs::{create_backend, JobSearchQuery, JobSearchTool};
use career_assistant::tools::Tool;

const SEARCH_PATH: &str = "/jobs-guest/jobs/api/seeMoreJobPostings/search/";

fn search_page(ids: &[&str]) -> String {
    let cards: String = ids
        .iter()
        .map(|id| {
            format!(
                r#"<li><div class="base-card" data-entity-urn="urn:li:jobPosting:{}"></div></li>"#,
                id
            )
        })
        .collect();
    format!("<html><body><ul>{}</ul></body></html>", cards)
}

fn detail_page(title: &str, company: Option<&str>) -> String {
    let company = company
        .map(|c| format!(r#"<a class="topcard__org-name-link" href="/company">{}</a>"#, c))
        .unwrap_or_default();
    format!(
        r#"<html><body>
            <h2 class="top-card-layout__title">{title}</h2>
            {company}
            <span class="topcard__flavor topcard__flavor--bullet">Berlin, Germany</span>
            <span class="posted-time-ago__text">2 days ago</span>
            <div class="decorated-job-posting__details">Build things in Rust</div>
            <a class="topcard__link" href="https://jobs.example.com/{title}">Apply</a>
        </body></html>"#
    )
}

async fn mount_detail(server: &MockServer, id: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(format!("/jobs-guest/jobs/api/jobPosting/{}", id)))
        .respond_with(response)
        .mount(server)
        .await;
}

fn tool_for(server: &MockServer) -> JobSearchTool {
    let config = JobSearchConfig {
        backend: JobSearchBackendKind::Guest,
        base_url: server.uri(),
        request_timeout_secs: 5,
        detail_timeout_secs: 5,
        ..JobSearchConfig::default()
    };
    JobSearchTool::new(create_backend(&config).unwrap())
}

/// A failing detail page leaves an empty posting in its slot; the rest fill in.
#[tokio::test]
async fn test_search_survives_failed_detail() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("keywords", "rust developer"))
        .and(query_param("f_WT", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(search_page(&["101", "202", "303"])))
        .mount(&server)
        .await;

    mount_detail(
        &server,
        "101",
        ResponseTemplate::new(200).set_body_string(detail_page("Rust Engineer", Some("Ferrous"))),
    )
    .await;
    mount_detail(&server, "202", ResponseTemplate::new(500)).await;
    mount_detail(
        &server,
        "303",
        ResponseTemplate::new(200).set_body_string(detail_page("Backend Developer", None)),
    )
    .await;

    let tool = tool_for(&server);
    let output = tool
        .call(&json!({
            "keywords": "rust developer",
            "job_type": "remote",
            "limit": "3"
        }))
        .await
        .unwrap();

    let postings: Vec<Value> = serde_json::from_str(&output).unwrap();
    assert_eq!(postings.len(), 3);

    assert_eq!(postings[0]["job_title"], "Rust Engineer");
    assert_eq!(postings[0]["company_name"], "Ferrous");
    assert_eq!(postings[0]["job_location"], "Berlin, Germany");
    assert_eq!(postings[0]["apply_link"], "https://jobs.example.com/Rust Engineer");

    assert_eq!(postings[1]["job_title"], "");
    assert_eq!(postings[1]["company_name"], "");

    assert_eq!(postings[2]["job_title"], "Backend Developer");
    assert_eq!(postings[2]["company_name"], "");
}

/// The search page is cut to the requested limit before any detail fetch.
#[tokio::test]
async fn test_limit_caps_detail_requests() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(search_page(&["1", "2", "3", "4"])))
        .mount(&server)
        .await;
    for id in ["1", "2"] {
        Mock::given(method("GET"))
            .and(path(format!("/jobs-guest/jobs/api/jobPosting/{}", id)))
            .respond_with(ResponseTemplate::new(200).set_body_string(detail_page("Job", Some("Co"))))
            .expect(1)
            .mount(&server)
            .await;
    }

    let tool = tool_for(&server);
    let mut query = JobSearchQuery::new("rust");
    query.limit = 2;

    let postings = tool.search(&query).await;
    assert_eq!(postings.len(), 2);
    assert!(postings.iter().all(|p| p.company_name == "Co"));
}

/// A failing search page yields an empty JSON list, not an error.
#[tokio::test]
async fn test_failed_search_returns_empty_list() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let tool = tool_for(&server);
    let output = tool.call(&json!({"keywords": "rust"})).await.unwrap();

    let postings: Vec<Value> = serde_json::from_str(&output).unwrap();
    assert!(postings.is_empty());
}
