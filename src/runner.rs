//! One digest run: fetch every source, then filter, dedupe and render

use tracing::{info, warn};

use crate::config::{Config, Credentials};
use crate::digest::{Digest, DigestRenderer};
use crate::errors::AppResult;
use crate::models::JobRecord;
use crate::pipeline::{dedupe, RecordFilter};
use crate::sources::{FetchContext, JobSource, SourceFactory};
use crate::utils::{RelativeTimeParser, RunClock, StandardHttpClient, TimeNormalizer};

/// Counts and output of a single run
#[derive(Debug, Clone)]
pub struct RunReport {
    pub fetched: usize,
    pub recent_matching: usize,
    pub failed_sources: Vec<String>,
    pub records: Vec<JobRecord>,
    pub digest: Digest,
}

pub struct DigestRunner {
    config: Config,
    http: StandardHttpClient,
    renderer: DigestRenderer,
}

impl DigestRunner {
    pub fn new(config: Config) -> AppResult<Self> {
        let http = StandardHttpClient::new(config.http.timeout, &config.http.user_agent)?;
        let renderer = DigestRenderer::from_config(&config.digest);
        Ok(Self {
            config,
            http,
            renderer,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run against the sources described by configuration
    pub async fn run(&self, credentials: &Credentials, clock: RunClock) -> RunReport {
        let sources = SourceFactory::from_config(&self.config, credentials);
        self.run_with_sources(&sources, clock).await
    }

    /// Sources are fetched one after another; a failing source contributes nothing
    pub async fn run_with_sources(
        &self,
        sources: &[Box<dyn JobSource>],
        clock: RunClock,
    ) -> RunReport {
        let normalizer = TimeNormalizer::new(clock);
        let relative = RelativeTimeParser::new(clock);
        let ctx = FetchContext::new(&self.http, &normalizer, &relative);

        let mut fetched = Vec::new();
        let mut failed_sources = Vec::new();
        for source in sources {
            match source.fetch(&ctx).await {
                Ok(records) => fetched.extend(records),
                Err(e) => {
                    warn!("Skipping source {}: {}", source.name(), e);
                    failed_sources.push(source.name());
                }
            }
        }

        let fetched_count = fetched.len();
        info!(
            "Fetched {} records from {} sources ({} failed)",
            fetched_count,
            sources.len(),
            failed_sources.len()
        );

        let filter = RecordFilter::new(
            &clock,
            self.config.keyword_terms(),
            self.config.location_terms(),
        );
        let recent = filter.apply(fetched);
        let recent_matching = recent.len();
        let records = dedupe(recent);

        let digest = self.renderer.render(&records, &clock);
        info!(
            "Digest ready: {} unique records, subject '{}'",
            digest.total, digest.subject
        );

        RunReport {
            fetched: fetched_count,
            recent_matching,
            failed_sources,
            records,
            digest,
        }
    }
}
