//! Lever postings handler

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::info;

use super::traits::{FetchContext, JobSource};
use crate::errors::SourceResult;
use crate::models::{JobRecord, SourceTag};
use crate::utils::{RawTimestamp, TimeNormalizer};

const CATEGORY_SEPARATOR: &str = " / ";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeverPosting {
    pub text: Option<String>,
    pub categories: Option<Map<String, Value>>,
    pub hosted_url: Option<String>,
    pub created_at: Option<Value>,
    pub updated_at: Option<Value>,
}

impl LeverPosting {
    /// Non-empty string categories (team, location, commitment...) in payload order
    fn location(&self) -> String {
        self.categories
            .iter()
            .flat_map(Map::values)
            .filter_map(Value::as_str)
            .filter(|value| !value.is_empty())
            .collect::<Vec<_>>()
            .join(CATEGORY_SEPARATOR)
    }
}

pub struct LeverSource {
    base_url: String,
    company: String,
}

impl LeverSource {
    pub fn new(base_url: impl Into<String>, company: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            company: company.into(),
        }
    }

    fn url(&self) -> String {
        format!(
            "{}/{}?mode=json",
            self.base_url.trim_end_matches('/'),
            self.company
        )
    }
}

#[async_trait]
impl JobSource for LeverSource {
    fn name(&self) -> String {
        format!("lever:{}", self.company)
    }

    async fn fetch(&self, ctx: &FetchContext<'_>) -> SourceResult<Vec<JobRecord>> {
        let payload: Vec<LeverPosting> = ctx.http.fetch_json(&self.url()).await?;
        let records = parse_lever(&self.company, payload, ctx.normalizer);
        info!("Fetched {} jobs from lever company {}", records.len(), self.company);
        Ok(records)
    }
}

/// Convert postings; posted date is `createdAt`, else `updatedAt` (epoch millis)
pub fn parse_lever(
    company: &str,
    payload: Vec<LeverPosting>,
    normalizer: &TimeNormalizer,
) -> Vec<JobRecord> {
    payload
        .into_iter()
        .map(|posting| {
            let location = posting.location();
            let posted = RawTimestamp::from(posting.created_at.as_ref())
                .or(RawTimestamp::from(posting.updated_at.as_ref()));
            JobRecord::new(
                posting.text.unwrap_or_default(),
                company,
                location,
                posting.hosted_url.unwrap_or_default(),
                normalizer.normalize(posted).at,
                SourceTag::Lever,
            )
        })
        .collect()
}
