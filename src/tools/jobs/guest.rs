//! Guest job search
//!
//! Scrapes the public job listing pages, no account needed. Ids come from
//! the search result cards, details from one page per job.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::USER_AGENT;
use reqwest::Client;
use scraper::{Html, Selector};
use tracing::debug;
use url::Url;

use super::filters::{employment_code, experience_code, job_type_code, map_codes};
use super::{fetch_all, JobPosting, JobSearchBackend, JobSearchQuery};
use crate::core::config::JobSearchConfig;
use crate::core::{CareerError, Result};

/// Job search over the public guest endpoints
pub struct GuestSearch {
    client: Client,
    base_url: String,
    user_agent: String,
    request_timeout: Duration,
    detail_timeout: Duration,
}

impl GuestSearch {
    /// Create a backend from configuration
    pub fn from_config(config: &JobSearchConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            user_agent: config.user_agent.clone(),
            request_timeout: Duration::from_secs(config.request_timeout_secs),
            detail_timeout: Duration::from_secs(config.detail_timeout_secs),
        }
    }

    /// Search page URL for a query, with unknown filter values dropped
    pub fn build_job_url(&self, query: &JobSearchQuery) -> Result<Url> {
        let mut url = Url::parse(&format!(
            "{}/jobs-guest/jobs/api/seeMoreJobPostings/search/",
            self.base_url
        ))
        .map_err(|e| CareerError::config(format!("invalid job site URL: {}", e)))?;

        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("keywords", &query.keywords);

            if let Some(location) = query.location() {
                pairs.append_pair("location", location);
            }

            let filters = [
                ("f_JT", map_codes(&query.employment_type, employment_code)),
                ("f_E", map_codes(&query.experience, experience_code)),
                ("f_WT", map_codes(&query.job_type, job_type_code)),
            ];
            for (key, codes) in filters {
                if !codes.is_empty() {
                    pairs.append_pair(key, &codes.join(","));
                }
            }

            pairs.append_pair("f_TPR", &format!("r{}", query.listed_at));
            pairs.append_pair("distance", &query.distance.to_string());
            pairs.append_pair("sortBy", "R");
        }

        Ok(url)
    }

    fn detail_url(&self, job_id: &str) -> String {
        format!("{}/jobs-guest/jobs/api/jobPosting/{}", self.base_url, job_id)
    }
}

fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

/// Job ids from a search result page, at most `limit`
pub fn parse_job_ids(html: &str, limit: usize) -> Vec<String> {
    let Some(cards) = selector("li div.base-card") else {
        return Vec::new();
    };

    let document = Html::parse_document(html);
    document
        .select(&cards)
        .filter_map(|card| card.value().attr("data-entity-urn"))
        .filter_map(|urn| urn.split(':').nth(3))
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .take(limit)
        .collect()
}

/// Trimmed text of the first element matching `css`, or ""
fn text_of(document: &Html, css: &str) -> String {
    selector(css)
        .and_then(|s| {
            document
                .select(&s)
                .next()
                .map(|el| el.text().collect::<String>().trim().to_string())
        })
        .unwrap_or_default()
}

fn attr_of(document: &Html, css: &str, attr: &str) -> String {
    selector(css)
        .and_then(|s| {
            document
                .select(&s)
                .next()
                .and_then(|el| el.value().attr(attr).map(str::to_string))
        })
        .unwrap_or_default()
}

/// Extract a posting from its detail page, each field independently
pub fn parse_job_posting(html: &str) -> JobPosting {
    let document = Html::parse_document(html);

    JobPosting {
        job_title: text_of(&document, "h2.top-card-layout__title"),
        job_location: text_of(&document, "span.topcard__flavor.topcard__flavor--bullet"),
        company_name: text_of(&document, "a.topcard__org-name-link"),
        time_posted: text_of(&document, "span.posted-time-ago__text"),
        num_applicants: text_of(&document, ".num-applicants__caption"),
        job_desc_text: text_of(&document, "div.decorated-job-posting__details"),
        apply_link: attr_of(&document, "a.topcard__link", "href"),
        ..Default::default()
    }
}

async fn fetch_page(client: &Client, url: &str, user_agent: &str, timeout: Duration) -> Result<String> {
    let response = client
        .get(url)
        .header(USER_AGENT, user_agent)
        .timeout(timeout)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(CareerError::job_search(format!("{} returned {}", url, status)));
    }
    Ok(response.text().await?)
}

#[async_trait]
impl JobSearchBackend for GuestSearch {
    async fn search_job_ids(&self, query: &JobSearchQuery) -> Result<Vec<String>> {
        let url = self.build_job_url(query)?;
        debug!(%url, "searching guest job listings");

        let html = fetch_page(&self.client, url.as_str(), &self.user_agent, self.request_timeout).await?;
        Ok(parse_job_ids(&html, query.limit))
    }

    async fn fetch_job_details(&self, job_ids: &[String]) -> Vec<JobPosting> {
        fetch_all(job_ids, self.detail_timeout, |job_id| {
            let client = self.client.clone();
            let url = self.detail_url(&job_id);
            let user_agent = self.user_agent.clone();
            let timeout = self.detail_timeout;
            async move {
                let html = fetch_page(&client, &url, &user_agent, timeout).await?;
                Ok(parse_job_posting(&html))
            }
        })
        .await
    }

    fn name(&self) -> &str {
        "guest"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> GuestSearch {
        GuestSearch::from_config(&JobSearchConfig::default())
    }

    #[test]
    fn test_build_url_maps_filters() {
        let mut query = JobSearchQuery::new("rust developer");
        query.location_name = Some("Berlin".to_string());
        query.employment_type = vec!["full-time".to_string(), "gig".to_string()];
        query.job_type = vec!["remote".to_string()];
        query.experience = vec!["entry level".to_string()];

        let url = backend().build_job_url(&query).unwrap();
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        let get = |key: &str| {
            pairs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
        };

        assert_eq!(url.path(), "/jobs-guest/jobs/api/seeMoreJobPostings/search/");
        assert_eq!(get("keywords").as_deref(), Some("rust developer"));
        assert_eq!(get("location").as_deref(), Some("Berlin"));
        assert_eq!(get("f_JT").as_deref(), Some("F"));
        assert_eq!(get("f_WT").as_deref(), Some("2"));
        assert_eq!(get("f_E").as_deref(), Some("2"));
        assert_eq!(get("f_TPR").as_deref(), Some("r86400"));
        assert_eq!(get("distance").as_deref(), Some("25"));
        assert_eq!(get("sortBy").as_deref(), Some("R"));
    }

    #[test]
    fn test_unknown_employment_type_omits_param() {
        let mut query = JobSearchQuery::new("rust");
        query.employment_type = vec!["freelance".to_string()];

        let url = backend().build_job_url(&query).unwrap();
        assert!(!url.query_pairs().any(|(k, _)| k == "f_JT"));
    }

    #[test]
    fn test_parse_job_ids() {
        let html = r#"
            <li><div class="base-card relative" data-entity-urn="urn:li:jobPosting:111"></div></li>
            <li><div class="base-card" data-entity-urn="urn:li:jobPosting:222"></div></li>
            <li><div class="base-card"></div></li>
            <li><div class="base-card" data-entity-urn="urn:li:jobPosting:333"></div></li>
        "#;

        assert_eq!(parse_job_ids(html, 5), vec!["111", "222", "333"]);
        assert_eq!(parse_job_ids(html, 2), vec!["111", "222"]);
        assert!(parse_job_ids("<ul></ul>", 5).is_empty());
    }

    #[test]
    fn test_parse_posting_missing_company() {
        let html = r#"
            <section>
              <h2 class="top-card-layout__title font-sans topcard__title"> Rust Engineer </h2>
              <span class="topcard__flavor topcard__flavor--bullet"> Berlin, Germany </span>
              <span class="posted-time-ago__text topcard__flavor--metadata"> 2 days ago </span>
              <span class="num-applicants__caption topcard__flavor--metadata"> 40 applicants </span>
              <a class="topcard__link" href="https://example.com/apply">Apply</a>
              <div class="decorated-job-posting__details"><p>Build things.</p></div>
            </section>
        "#;

        let posting = parse_job_posting(html);
        assert_eq!(posting.company_name, "");
        assert_eq!(posting.job_title, "Rust Engineer");
        assert_eq!(posting.job_location, "Berlin, Germany");
        assert_eq!(posting.time_posted, "2 days ago");
        assert_eq!(posting.num_applicants, "40 applicants");
        assert_eq!(posting.apply_link, "https://example.com/apply");
        assert_eq!(posting.job_desc_text, "Build things.");
    }
}
