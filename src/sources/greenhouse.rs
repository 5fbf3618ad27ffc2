//! Greenhouse job board handler

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use super::traits::{FetchContext, JobSource};
use crate::errors::SourceResult;
use crate::models::{JobRecord, SourceTag};
use crate::utils::{RawTimestamp, TimeNormalizer};

#[derive(Debug, Clone, Deserialize)]
pub struct GreenhouseBoard {
    #[serde(default)]
    pub jobs: Vec<GreenhouseJob>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GreenhouseJob {
    pub title: Option<String>,
    pub location: Option<GreenhouseLocation>,
    pub absolute_url: Option<String>,
    pub updated_at: Option<Value>,
    pub created_at: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GreenhouseLocation {
    pub name: Option<String>,
}

/// Jobs published on one Greenhouse board; the board token doubles as company name
pub struct GreenhouseSource {
    base_url: String,
    board: String,
}

impl GreenhouseSource {
    pub fn new(base_url: impl Into<String>, board: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            board: board.into(),
        }
    }

    fn url(&self) -> String {
        format!("{}/{}/jobs", self.base_url.trim_end_matches('/'), self.board)
    }
}

#[async_trait]
impl JobSource for GreenhouseSource {
    fn name(&self) -> String {
        format!("greenhouse:{}", self.board)
    }

    async fn fetch(&self, ctx: &FetchContext<'_>) -> SourceResult<Vec<JobRecord>> {
        let payload: GreenhouseBoard = ctx.http.fetch_json(&self.url()).await?;
        let records = parse_greenhouse(&self.board, payload, ctx.normalizer);
        info!("Fetched {} jobs from greenhouse board {}", records.len(), self.board);
        Ok(records)
    }
}

/// Convert a board payload; posted date is `updated_at`, else `created_at`
pub fn parse_greenhouse(
    board: &str,
    payload: GreenhouseBoard,
    normalizer: &TimeNormalizer,
) -> Vec<JobRecord> {
    payload
        .jobs
        .into_iter()
        .map(|job| {
            let posted = RawTimestamp::from(job.updated_at.as_ref())
                .or(RawTimestamp::from(job.created_at.as_ref()));
            JobRecord::new(
                job.title.unwrap_or_default(),
                board,
                job.location.and_then(|l| l.name).unwrap_or_default(),
                job.absolute_url.unwrap_or_default(),
                normalizer.normalize(posted).at,
                SourceTag::Greenhouse,
            )
        })
        .collect()
}
