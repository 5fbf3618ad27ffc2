//! Google Jobs search through SerpAPI
//!
//! Search results carry no structured date, only a relative phrase such as
//! "3 hours ago" in `detected_extensions.posted_at`. A result without that
//! phrase is treated as just posted.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};

use super::traits::{FetchContext, JobSource};
use crate::errors::SourceResult;
use crate::models::{JobRecord, SourceTag};
use crate::utils::RelativeTimeParser;

const SEARCH_ENGINE: &str = "google_jobs";

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub jobs_results: Option<Vec<SearchResult>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResult {
    pub title: Option<String>,
    pub company_name: Option<String>,
    pub location: Option<String>,
    #[serde(default)]
    pub apply_options: Option<Vec<ApplyOption>>,
    pub job_google_link: Option<String>,
    pub link: Option<String>,
    pub detected_extensions: Option<DetectedExtensions>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApplyOption {
    pub link: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DetectedExtensions {
    pub posted_at: Option<String>,
}

impl SearchResult {
    /// First apply option, then the Google Jobs link, then the plain link
    fn url(&self) -> String {
        self.apply_options
            .as_ref()
            .and_then(|options| options.first())
            .and_then(|option| option.link.clone())
            .filter(|link| !link.is_empty())
            .or_else(|| self.job_google_link.clone().filter(|link| !link.is_empty()))
            .or_else(|| self.link.clone())
            .unwrap_or_default()
    }

    fn posted_phrase(&self) -> Option<&str> {
        self.detected_extensions
            .as_ref()
            .and_then(|ext| ext.posted_at.as_deref())
            .filter(|phrase| !phrase.trim().is_empty())
    }
}

/// One search query against one location
pub struct SearchSource {
    endpoint: String,
    api_key: String,
    query: String,
    location: String,
    language: String,
    timeout: Duration,
}

impl SearchSource {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        query: impl Into<String>,
        location: impl Into<String>,
        language: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            query: query.into(),
            location: location.into(),
            language: language.into(),
            timeout,
        }
    }

    fn query_params(&self) -> [(&str, &str); 5] {
        [
            ("engine", SEARCH_ENGINE),
            ("q", self.query.as_str()),
            ("location", self.location.as_str()),
            ("hl", self.language.as_str()),
            ("api_key", self.api_key.as_str()),
        ]
    }
}

#[async_trait]
impl JobSource for SearchSource {
    fn name(&self) -> String {
        format!("search:{}", self.location)
    }

    async fn fetch(&self, ctx: &FetchContext<'_>) -> SourceResult<Vec<JobRecord>> {
        let payload: SearchResponse = ctx
            .http
            .fetch_json_with_query(&self.endpoint, &self.query_params(), Some(self.timeout))
            .await?;
        let records = parse_search(&self.location, payload, ctx.relative);
        info!("Fetched {} search results for {}", records.len(), self.location);
        Ok(records)
    }
}

/// Convert search results; the searched location stands in for a missing one
pub fn parse_search(
    searched_location: &str,
    payload: SearchResponse,
    relative: &RelativeTimeParser,
) -> Vec<JobRecord> {
    payload
        .jobs_results
        .unwrap_or_default()
        .into_iter()
        .map(|result| {
            let url = result.url();
            let posted_at = match result.posted_phrase() {
                Some(phrase) => relative.parse(phrase).at,
                None => {
                    debug!("No posted phrase for '{}', treating as just posted", url);
                    relative.clock().now()
                }
            };
            let location = result
                .location
                .filter(|location| !location.is_empty())
                .unwrap_or_else(|| searched_location.to_string());

            JobRecord::new(
                result.title.unwrap_or_default(),
                result.company_name.unwrap_or_default(),
                location,
                url,
                posted_at,
                SourceTag::Search {
                    location: searched_location.to_string(),
                },
            )
        })
        .collect()
}
