//! Source handler factory
//!
//! Builds the run's source list from configuration. Order is fixed:
//! Greenhouse boards, Lever companies, Ashby companies, then one search per
//! configured search location.

use tracing::info;

use super::ashby::AshbySource;
use super::greenhouse::GreenhouseSource;
use super::lever::LeverSource;
use super::search::SearchSource;
use super::traits::JobSource;
use crate::config::{Config, Credentials};

pub struct SourceFactory;

impl SourceFactory {
    pub fn from_config(config: &Config, credentials: &Credentials) -> Vec<Box<dyn JobSource>> {
        let endpoints = &config.endpoints;
        let mut sources: Vec<Box<dyn JobSource>> = Vec::new();

        for board in &config.greenhouse_boards {
            sources.push(Box::new(GreenhouseSource::new(&endpoints.greenhouse, board)));
        }
        for company in &config.lever_companies {
            sources.push(Box::new(LeverSource::new(&endpoints.lever, company)));
        }
        for company in &config.ashby_companies {
            sources.push(Box::new(AshbySource::new(&endpoints.ashby, company)));
        }

        if !config.search.enabled {
            info!("Job search disabled in configuration");
        } else if let Some(api_key) = credentials.search_api_key.as_deref() {
            for location in &config.search.locations {
                sources.push(Box::new(SearchSource::new(
                    &endpoints.search,
                    api_key,
                    &config.search.query,
                    location,
                    &config.search.language,
                    config.http.search_timeout,
                )));
            }
        } else {
            info!("SERPAPI_KEY not set, skipping job search");
        }

        info!("Configured {} job sources", sources.len());
        sources
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        let mut config = Config::default();
        config.greenhouse_boards = vec!["acme".to_string()];
        config.lever_companies = vec!["beta".to_string(), "delta".to_string()];
        config.ashby_companies = vec!["gamma".to_string()];
        config.search.locations = vec!["India".to_string(), "Remote".to_string()];
        config
    }

    fn names(sources: &[Box<dyn JobSource>]) -> Vec<String> {
        sources.iter().map(|s| s.name()).collect()
    }

    #[test]
    fn test_sources_in_fixed_order() {
        let credentials = Credentials {
            search_api_key: Some("key".to_string()),
            ..Default::default()
        };

        let sources = SourceFactory::from_config(&config(), &credentials);

        assert_eq!(
            names(&sources),
            vec![
                "greenhouse:acme",
                "lever:beta",
                "lever:delta",
                "ashby:gamma",
                "search:India",
                "search:Remote",
            ]
        );
    }

    #[test]
    fn test_search_skipped_without_api_key() {
        let sources = SourceFactory::from_config(&config(), &Credentials::default());
        assert_eq!(sources.len(), 4);
    }

    #[test]
    fn test_search_skipped_when_disabled() {
        let mut config = config();
        config.search.enabled = false;
        let credentials = Credentials {
            search_api_key: Some("key".to_string()),
            ..Default::default()
        };

        let sources = SourceFactory::from_config(&config, &credentials);

        assert!(names(&sources).iter().all(|name| !name.starts_with("search:")));
    }
}
