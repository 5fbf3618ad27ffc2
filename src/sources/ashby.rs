//! Ashby job board handler

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use super::traits::{FetchContext, JobSource};
use crate::errors::SourceResult;
use crate::models::{JobRecord, SourceTag};
use crate::utils::{RawTimestamp, TimeNormalizer};

#[derive(Debug, Clone, Deserialize)]
pub struct AshbyBoard {
    #[serde(default)]
    pub jobs: Vec<AshbyJob>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AshbyJob {
    pub title: Option<String>,
    #[serde(default)]
    pub locations: Vec<AshbyLocation>,
    pub job_url: Option<String>,
    pub published_at: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AshbyLocation {
    pub location_name: Option<String>,
}

pub struct AshbySource {
    base_url: String,
    company: String,
}

impl AshbySource {
    pub fn new(base_url: impl Into<String>, company: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            company: company.into(),
        }
    }

    fn url(&self) -> String {
        format!("{}/{}.json", self.base_url.trim_end_matches('/'), self.company)
    }
}

#[async_trait]
impl JobSource for AshbySource {
    fn name(&self) -> String {
        format!("ashby:{}", self.company)
    }

    async fn fetch(&self, ctx: &FetchContext<'_>) -> SourceResult<Vec<JobRecord>> {
        let payload: AshbyBoard = ctx.http.fetch_json(&self.url()).await?;
        let records = parse_ashby(&self.company, payload, ctx.normalizer);
        info!("Fetched {} jobs from ashby company {}", records.len(), self.company);
        Ok(records)
    }
}

pub fn parse_ashby(company: &str, payload: AshbyBoard, normalizer: &TimeNormalizer) -> Vec<JobRecord> {
    payload
        .jobs
        .into_iter()
        .map(|job| {
            let location = job
                .locations
                .into_iter()
                .map(|l| l.location_name.unwrap_or_default())
                .collect::<Vec<_>>()
                .join(", ");
            JobRecord::new(
                job.title.unwrap_or_default(),
                company,
                location,
                job.job_url.unwrap_or_default(),
                normalizer
                    .normalize(RawTimestamp::from(job.published_at.as_ref()))
                    .at,
                SourceTag::Ashby,
            )
        })
        .collect()
}
