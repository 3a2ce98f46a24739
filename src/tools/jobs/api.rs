//! Authenticated job search over the LinkedIn voyager API
//!
//! Logs in once per backend with the configured account, then reuses the
//! session cookie and its CSRF token for every request.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, ACCEPT, SET_COOKIE, USER_AGENT};
use reqwest::Client;
use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use super::filters::{employment_code, experience_code, job_type_code, map_codes};
use super::{fetch_all, JobPosting, JobSearchBackend, JobSearchQuery};
use crate::core::config::JobSearchConfig;
use crate::core::{CareerError, Result};

const SEARCH_DECORATION: &str =
    "com.linkedin.voyager.dash.deco.jobs.search.JobSearchCardsCollection-174";
const JOB_DECORATION: &str = "com.linkedin.voyager.deco.jobs.web.shared.WebFullJobPosting-65";
const COMPANY_KEY: &str = "com.linkedin.voyager.deco.jobs.web.shared.WebCompactJobPostingCompany";
const OFFSITE_APPLY_KEY: &str = "com.linkedin.voyager.jobs.OffsiteApply";

/// Job search through the logged-in API
pub struct LinkedInApi {
    client: Client,
    base_url: String,
    user_agent: String,
    email: String,
    password: String,
    request_timeout: Duration,
    detail_timeout: Duration,
    csrf_token: OnceCell<String>,
}

impl LinkedInApi {
    /// Create a backend from configuration
    ///
    /// Fails when the account credentials are not configured.
    pub fn from_config(config: &JobSearchConfig) -> Result<Self> {
        let (Some(email), Some(password)) = (config.email.clone(), config.password.clone()) else {
            return Err(CareerError::config(
                "LINKEDIN_EMAIL and LINKEDIN_PASS must be set for the api job backend",
            ));
        };

        let client = Client::builder()
            .cookie_store(true)
            .build()
            .map_err(|e| CareerError::config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            user_agent: config.user_agent.clone(),
            email,
            password,
            request_timeout: Duration::from_secs(config.request_timeout_secs),
            detail_timeout: Duration::from_secs(config.detail_timeout_secs),
            csrf_token: OnceCell::new(),
        })
    }

    /// CSRF token of the logged-in session, logging in on first use
    async fn session(&self) -> Result<&str> {
        self.csrf_token
            .get_or_try_init(|| self.login())
            .await
            .map(String::as_str)
    }

    async fn login(&self) -> Result<String> {
        let auth_url = format!("{}/uas/authenticate", self.base_url);

        let response = self
            .client
            .get(&auth_url)
            .header(USER_AGENT, &self.user_agent)
            .timeout(self.request_timeout)
            .send()
            .await?;
        let session_id = session_cookie(response.headers())
            .ok_or_else(|| CareerError::job_search("login page did not set a session cookie"))?;

        let response = self
            .client
            .post(&auth_url)
            .header(USER_AGENT, &self.user_agent)
            .header("X-User-Language", "en")
            .header("X-User-Locale", "en_US")
            .form(&[
                ("session_key", self.email.as_str()),
                ("session_password", self.password.as_str()),
                ("JSESSIONID", session_id.as_str()),
            ])
            .timeout(self.request_timeout)
            .send()
            .await?;

        let status = response.status();
        let body: Value = response.json().await.unwrap_or(Value::Null);
        let result = body
            .get("login_result")
            .and_then(Value::as_str)
            .unwrap_or("UNKNOWN");

        if !status.is_success() || result != "PASS" {
            return Err(CareerError::job_search(format!(
                "login rejected ({}): {}",
                status, result
            )));
        }

        info!("logged in to job search API");
        Ok(session_id)
    }

    /// Search URL with filters in the voyager query syntax
    pub fn build_search_url(&self, query: &JobSearchQuery) -> String {
        let mut filters = vec![format!("distance:List({})", query.distance)];

        let lists = [
            ("jobType", map_codes(&query.employment_type, employment_code)),
            ("experience", map_codes(&query.experience, experience_code)),
            ("workplaceType", map_codes(&query.job_type, job_type_code)),
        ];
        for (key, codes) in lists {
            if !codes.is_empty() {
                filters.push(format!("{}:List({})", key, codes.join(",")));
            }
        }
        filters.push(format!("timePostedRange:List(r{})", query.listed_at));

        let mut search = format!(
            "origin:JOB_SEARCH_PAGE_QUERY_EXPANSION,keywords:{}",
            encode(&query.keywords)
        );
        if let Some(location) = query.location() {
            search.push_str(&format!(",locationFallback:{}", encode(location)));
        }
        search.push_str(&format!(
            ",selectedFilters:({}),spellCorrectionEnabled:true",
            filters.join(",")
        ));

        format!(
            "{}/voyager/api/voyagerJobsDashJobCards?decorationId={}&count={}&q=jobSearch&query=({})&start=0",
            self.base_url, SEARCH_DECORATION, query.limit, search
        )
    }
}

fn encode(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

/// Value of the `JSESSIONID` cookie set by a response, quotes stripped
fn session_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(|cookie| {
            let pair = cookie.split(';').next()?.trim();
            let value = pair.strip_prefix("JSESSIONID=")?;
            Some(value.trim_matches('"').to_string())
        })
}

async fn get_voyager(client: &Client, url: &str, csrf_token: &str, timeout: Duration) -> Result<Value> {
    let response = client
        .get(url)
        .header("csrf-token", csrf_token)
        .header("x-restli-protocol-version", "2.0.0")
        .header(ACCEPT, "application/vnd.linkedin.normalized+json+2.1")
        .timeout(timeout)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(CareerError::job_search(format!("{} returned {}", url, status)));
    }
    Ok(response.json().await?)
}

/// Job ids from a search response, at most `limit`
pub fn parse_search_ids(data: &Value, limit: usize) -> Vec<String> {
    data.get("included")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.get("trackingUrn").and_then(Value::as_str))
                .filter_map(|urn| urn.split("jobPosting:").nth(1))
                .map(str::to_string)
                .take(limit)
                .collect()
        })
        .unwrap_or_default()
}

fn string_at(value: &Value, pointer: &[&str]) -> String {
    let mut current = value;
    for key in pointer {
        match current.get(*key) {
            Some(next) => current = next,
            None => return String::new(),
        }
    }
    match current {
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

/// Map a job document to a posting, missing fields becoming ""
pub fn parse_job_data(data: &Value) -> JobPosting {
    JobPosting {
        job_title: string_at(data, &["title"]),
        company_name: string_at(data, &["companyDetails", COMPANY_KEY, "companyResolutionResult", "name"]),
        company_url: string_at(data, &["companyDetails", COMPANY_KEY, "companyResolutionResult", "url"]),
        job_location: string_at(data, &["formattedLocation"]),
        job_desc_text: string_at(data, &["description", "text"]),
        apply_link: string_at(data, &["applyMethod", OFFSITE_APPLY_KEY, "companyApplyUrl"]),
        work_remote_allowed: string_at(data, &["workRemoteAllowed"]),
        ..Default::default()
    }
}

#[async_trait]
impl JobSearchBackend for LinkedInApi {
    async fn search_job_ids(&self, query: &JobSearchQuery) -> Result<Vec<String>> {
        let csrf_token = self.session().await?;
        let url = self.build_search_url(query);
        debug!(%url, "searching job API");

        let data = get_voyager(&self.client, &url, csrf_token, self.request_timeout).await?;
        Ok(parse_search_ids(&data, query.limit))
    }

    async fn fetch_job_details(&self, job_ids: &[String]) -> Vec<JobPosting> {
        let csrf_token = match self.session().await {
            Ok(token) => token.to_string(),
            Err(e) => {
                tracing::warn!(error = %e, "cannot fetch job details without a session");
                return vec![JobPosting::default(); job_ids.len()];
            }
        };

        fetch_all(job_ids, self.detail_timeout, |job_id| {
            let client = self.client.clone();
            let csrf_token = csrf_token.clone();
            let timeout = self.detail_timeout;
            let url = format!(
                "{}/voyager/api/jobs/jobPostings/{}?decorationId={}",
                self.base_url, job_id, JOB_DECORATION
            );
            async move {
                let data = get_voyager(&client, &url, &csrf_token, timeout).await?;
                Ok(parse_job_data(&data))
            }
        })
        .await
    }

    fn name(&self) -> &str {
        "api"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;
    use serde_json::json;

    fn backend() -> LinkedInApi {
        let config = JobSearchConfig {
            email: Some("me@example.com".to_string()),
            password: Some("secret".to_string()),
            ..Default::default()
        };
        LinkedInApi::from_config(&config).unwrap()
    }

    #[test]
    fn test_requires_credentials() {
        let config = JobSearchConfig {
            email: None,
            password: None,
            ..Default::default()
        };
        assert!(LinkedInApi::from_config(&config).is_err());
    }

    #[test]
    fn test_session_cookie() {
        let mut headers = HeaderMap::new();
        headers.append(SET_COOKIE, HeaderValue::from_static("lang=v=2&lang=en-us; Path=/"));
        headers.append(
            SET_COOKIE,
            HeaderValue::from_static("JSESSIONID=\"ajax:12345\"; Path=/; Secure"),
        );
        assert_eq!(session_cookie(&headers).as_deref(), Some("ajax:12345"));
        assert_eq!(session_cookie(&HeaderMap::new()), None);
    }

    #[test]
    fn test_search_url_filters() {
        let mut query = JobSearchQuery::new("data engineer");
        query.location_name = Some("New York".to_string());
        query.job_type = vec!["remote".to_string(), "spaceship".to_string()];
        query.employment_type = vec!["contract".to_string()];

        let url = backend().build_search_url(&query);
        assert!(url.contains("keywords:data%20engineer"));
        assert!(url.contains("locationFallback:New%20York"));
        assert!(url.contains("workplaceType:List(2)"));
        assert!(url.contains("jobType:List(C)"));
        assert!(url.contains("timePostedRange:List(r86400)"));
        assert!(url.contains("distance:List(25)"));
        assert!(!url.contains("experience:List"));
        assert!(url.contains("count=5"));
    }

    #[test]
    fn test_parse_search_ids() {
        let data = json!({
            "included": [
                {"trackingUrn": "urn:li:jobPosting:900"},
                {"$type": "company"},
                {"trackingUrn": "urn:li:jobPosting:901"}
            ]
        });
        assert_eq!(parse_search_ids(&data, 5), vec!["900", "901"]);
        assert_eq!(parse_search_ids(&data, 1), vec!["900"]);
        assert!(parse_search_ids(&json!({}), 5).is_empty());
    }

    #[test]
    fn test_parse_job_data() {
        let data = json!({
            "title": "Platform Engineer",
            "formattedLocation": "Remote",
            "workRemoteAllowed": true,
            "description": {"text": "Own the platform."},
            "companyDetails": {
                COMPANY_KEY: {
                    "companyResolutionResult": {
                        "name": "Initech",
                        "url": "https://www.linkedin.com/company/initech"
                    }
                }
            },
            "applyMethod": {
                OFFSITE_APPLY_KEY: {"companyApplyUrl": "https://initech.example/jobs/1"}
            }
        });

        let posting = parse_job_data(&data);
        assert_eq!(posting.job_title, "Platform Engineer");
        assert_eq!(posting.company_name, "Initech");
        assert_eq!(posting.work_remote_allowed, "true");
        assert_eq!(posting.apply_link, "https://initech.example/jobs/1");
        assert_eq!(posting.time_posted, "");
    }

    #[test]
    fn test_parse_job_data_missing_company() {
        let posting = parse_job_data(&json!({"title": "Analyst"}));
        assert_eq!(posting.company_name, "");
        assert_eq!(posting.company_url, "");
        assert_eq!(posting.job_title, "Analyst");
    }
}
