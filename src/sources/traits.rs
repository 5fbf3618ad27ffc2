//! Job source trait definitions
//!
//! Every board API is wrapped in a [`JobSource`]. Handlers own their request
//! details (board token, company slug, search location) while the run-wide
//! collaborators arrive through a [`FetchContext`], so all sources of a run
//! share one HTTP client and one reference instant.

use async_trait::async_trait;

use crate::errors::SourceResult;
use crate::models::JobRecord;
use crate::utils::{RelativeTimeParser, StandardHttpClient, TimeNormalizer};

/// Run-wide collaborators handed to each fetch
#[derive(Clone, Copy)]
pub struct FetchContext<'a> {
    pub http: &'a StandardHttpClient,
    pub normalizer: &'a TimeNormalizer,
    pub relative: &'a RelativeTimeParser,
}

impl<'a> FetchContext<'a> {
    pub fn new(
        http: &'a StandardHttpClient,
        normalizer: &'a TimeNormalizer,
        relative: &'a RelativeTimeParser,
    ) -> Self {
        Self {
            http,
            normalizer,
            relative,
        }
    }
}

/// A single upstream feed of job postings
///
/// `fetch` returns an error on network or payload failure; the caller decides
/// whether that aborts anything. Records are returned already normalized.
#[async_trait]
pub trait JobSource: Send + Sync {
    /// Human readable identifier used in logs, e.g. `greenhouse:acme`
    fn name(&self) -> String;

    async fn fetch(&self, ctx: &FetchContext<'_>) -> SourceResult<Vec<JobRecord>>;
}
