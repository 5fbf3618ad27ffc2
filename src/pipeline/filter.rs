//! Recency and keyword/location filtering

use chrono::{DateTime, FixedOffset, TimeDelta};
use tracing::{debug, info};

use crate::models::JobRecord;
use crate::utils::RunClock;

/// Width of the trailing window a posting must fall into
pub const RECENCY_WINDOW_HOURS: i64 = 24;

/// Outcome of checking one record against the filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Keep,
    Stale,
    NoKeywordMatch,
    NoLocationMatch,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterStats {
    pub kept: usize,
    pub stale: usize,
    pub no_keyword_match: usize,
    pub no_location_match: usize,
}

impl FilterStats {
    fn record(&mut self, verdict: Verdict) {
        match verdict {
            Verdict::Keep => self.kept += 1,
            Verdict::Stale => self.stale += 1,
            Verdict::NoKeywordMatch => self.no_keyword_match += 1,
            Verdict::NoLocationMatch => self.no_location_match += 1,
        }
    }
}

/// Keeps records posted within the recency window that match the configured
/// keywords and locations
///
/// The cutoff is fixed when the filter is built, so one batch is always
/// judged against a single window. An absent or empty keyword (or location)
/// list disables that check.
#[derive(Debug, Clone)]
pub struct RecordFilter {
    cutoff: DateTime<FixedOffset>,
    keywords: Vec<String>,
    locations: Vec<String>,
}

impl RecordFilter {
    pub fn new(
        clock: &RunClock,
        keywords: Option<&[String]>,
        locations: Option<&[String]>,
    ) -> Self {
        Self {
            cutoff: clock.now() - TimeDelta::hours(RECENCY_WINDOW_HOURS),
            keywords: lowercase_all(keywords),
            locations: lowercase_all(locations),
        }
    }

    pub fn cutoff(&self) -> DateTime<FixedOffset> {
        self.cutoff
    }

    pub fn verdict(&self, record: &JobRecord) -> Verdict {
        if record.posted_at < self.cutoff {
            return Verdict::Stale;
        }

        let haystack = record.haystack();

        if !matches_any(&self.keywords, &haystack) {
            return Verdict::NoKeywordMatch;
        }

        if !matches_any(&self.locations, &haystack) {
            return Verdict::NoLocationMatch;
        }

        Verdict::Keep
    }

    /// Filter a batch, preserving input order
    pub fn apply(&self, records: impl IntoIterator<Item = JobRecord>) -> Vec<JobRecord> {
        let (kept, stats) = self.apply_with_stats(records);
        info!(
            "Filter kept {} records (stale: {}, no keyword match: {}, no location match: {})",
            stats.kept, stats.stale, stats.no_keyword_match, stats.no_location_match
        );
        kept
    }

    pub fn apply_with_stats(
        &self,
        records: impl IntoIterator<Item = JobRecord>,
    ) -> (Vec<JobRecord>, FilterStats) {
        let mut stats = FilterStats::default();
        let kept = records
            .into_iter()
            .filter(|record| {
                let verdict = self.verdict(record);
                stats.record(verdict);
                if verdict != Verdict::Keep {
                    debug!(
                        "Dropping '{}' at {} ({}): {:?}",
                        record.title, record.company, record.source, verdict
                    );
                }
                verdict == Verdict::Keep
            })
            .collect();
        (kept, stats)
    }
}

/// Filter `records` against the window ending at the clock's reference instant
pub fn filter(
    records: impl IntoIterator<Item = JobRecord>,
    keywords: Option<&[String]>,
    locations: Option<&[String]>,
    clock: &RunClock,
) -> Vec<JobRecord> {
    RecordFilter::new(clock, keywords, locations).apply(records)
}

fn lowercase_all(terms: Option<&[String]>) -> Vec<String> {
    terms
        .unwrap_or_default()
        .iter()
        .map(|term| term.to_lowercase())
        .collect()
}

fn matches_any(terms: &[String], haystack: &str) -> bool {
    terms.is_empty() || terms.iter().any(|term| haystack.contains(term.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SourceTag;
    use chrono::TimeZone;

    fn clock() -> RunClock {
        let ist = FixedOffset::east_opt(19800).unwrap();
        RunClock::fixed(ist.with_ymd_and_hms(2024, 10, 1, 18, 0, 0).unwrap())
    }

    fn record(title: &str, location: &str, company: &str, age: TimeDelta) -> JobRecord {
        JobRecord::new(
            title,
            company,
            location,
            format!("https://jobs.example.com/{}", title.replace(' ', "-")),
            clock().now() - age,
            SourceTag::Greenhouse,
        )
    }

    fn terms(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_cutoff_boundary_is_inclusive() {
        let filter = RecordFilter::new(&clock(), None, None);
        let at_cutoff = record("At Cutoff", "Remote", "Acme", TimeDelta::hours(24));
        let past_cutoff = record(
            "Past Cutoff",
            "Remote",
            "Acme",
            TimeDelta::hours(24) + TimeDelta::seconds(1),
        );

        assert_eq!(filter.cutoff(), clock().now() - TimeDelta::hours(24));
        assert_eq!(filter.verdict(&at_cutoff), Verdict::Keep);
        assert_eq!(filter.verdict(&past_cutoff), Verdict::Stale);
    }

    #[test]
    fn test_future_postings_are_kept() {
        let filter = RecordFilter::new(&clock(), None, None);
        let future = record("Future", "Remote", "Acme", TimeDelta::hours(-2));
        assert_eq!(filter.verdict(&future), Verdict::Keep);
    }

    #[test]
    fn test_empty_lists_only_apply_recency() {
        let records = vec![
            record("Software Engineer", "Berlin", "Acme", TimeDelta::hours(1)),
            record("CRM Lead", "Dubai", "Beta", TimeDelta::hours(30)),
            record("Designer", "Pune", "Gamma", TimeDelta::hours(23)),
        ];

        let none: Vec<String> = Vec::new();
        let kept = filter(records, Some(none.as_slice()), Some(none.as_slice()), &clock());
        let titles: Vec<_> = kept.iter().map(|r| r.title.as_str()).collect();

        assert_eq!(titles, vec!["Software Engineer", "Designer"]);
    }

    #[test]
    fn test_keyword_filter_is_case_insensitive_and_ignores_location() {
        let records = vec![
            record("CRM Manager", "Mumbai", "Acme", TimeDelta::hours(1)),
            record("Lifecycle Lead", "Remote", "crm-tools inc", TimeDelta::hours(2)),
            record("Backend Engineer", "Mumbai", "Acme", TimeDelta::hours(1)),
        ];
        let keywords = terms(&["CRM"]);

        let kept = filter(records, Some(keywords.as_slice()), None, &clock());
        let titles: Vec<_> = kept.iter().map(|r| r.title.as_str()).collect();

        assert_eq!(titles, vec!["CRM Manager", "Lifecycle Lead"]);
    }

    #[test]
    fn test_keyword_and_location_must_both_match() {
        let filter = RecordFilter::new(
            &clock(),
            Some(terms(&["retention"]).as_slice()),
            Some(terms(&["India", "Dubai"]).as_slice()),
        );

        let both = record("Retention Manager", "Bengaluru, India", "Acme", TimeDelta::hours(1));
        let keyword_only = record("Retention Manager", "London", "Acme", TimeDelta::hours(1));
        let location_only = record("Data Engineer", "Dubai", "Acme", TimeDelta::hours(1));

        assert_eq!(filter.verdict(&both), Verdict::Keep);
        assert_eq!(filter.verdict(&keyword_only), Verdict::NoLocationMatch);
        assert_eq!(filter.verdict(&location_only), Verdict::NoKeywordMatch);
    }

    #[test]
    fn test_location_terms_match_against_whole_haystack() {
        let filter = RecordFilter::new(&clock(), None, Some(terms(&["remote"]).as_slice()));
        let in_title = record("CRM Manager (Remote)", "Anywhere", "Acme", TimeDelta::hours(1));
        assert_eq!(filter.verdict(&in_title), Verdict::Keep);
    }

    #[test]
    fn test_stats_count_each_verdict() {
        let filter = RecordFilter::new(
            &clock(),
            Some(terms(&["crm"]).as_slice()),
            Some(terms(&["india"]).as_slice()),
        );
        let records = vec![
            record("CRM Manager", "India", "Acme", TimeDelta::hours(1)),
            record("CRM Manager", "India", "Acme", TimeDelta::hours(48)),
            record("Engineer", "India", "Acme", TimeDelta::hours(1)),
            record("CRM Analyst", "Spain", "Acme", TimeDelta::hours(1)),
        ];

        let (kept, stats) = filter.apply_with_stats(records);

        assert_eq!(kept.len(), 1);
        assert_eq!(
            stats,
            FilterStats {
                kept: 1,
                stale: 1,
                no_keyword_match: 1,
                no_location_match: 1,
            }
        );
    }
}
