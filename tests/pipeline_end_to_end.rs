use chrono::{DateTime, FixedOffset, SecondsFormat, TimeDelta, TimeZone};
use serde_json::json;

use job_digest::config::DigestConfig;
use job_digest::digest::DigestRenderer;
use job_digest::models::{JobRecord, SourceTag};
use job_digest::pipeline::{dedupe, filter, Fingerprint};
use job_digest::sources::{parse_greenhouse, parse_lever, parse_search};
use job_digest::utils::{RelativeTimeParser, RunClock, TimeNormalizer};

fn clock() -> RunClock {
    let ist = FixedOffset::east_opt(5 * 3600 + 30 * 60).unwrap();
    RunClock::fixed(ist.with_ymd_and_hms(2024, 10, 1, 18, 0, 0).unwrap())
}

fn ago(hours: i64) -> DateTime<FixedOffset> {
    clock().now() - TimeDelta::hours(hours)
}

/// Five postings from three sources: one stale, one off-topic, and the same
/// Greenhouse posting resurfacing an hour later through job search.
fn fetch_fixtures(clock: RunClock) -> Vec<JobRecord> {
    let normalizer = TimeNormalizer::new(clock);
    let relative = RelativeTimeParser::new(clock);

    let greenhouse = serde_json::from_value(json!({
        "jobs": [
            {
                "title": "CRM Manager",
                "location": {"name": "Bengaluru, India"},
                "absolute_url": "https://boards.greenhouse.io/acme/jobs/1",
                "updated_at": ago(2).to_utc().to_rfc3339_opts(SecondsFormat::Secs, true)
            },
            {
                "title": "CRM Analyst",
                "location": {"name": "Mumbai, India"},
                "absolute_url": "https://boards.greenhouse.io/acme/jobs/2",
                "created_at": ago(30).to_rfc3339()
            }
        ]
    }))
    .unwrap();

    let lever = serde_json::from_value(json!([
        {
            "text": "Retention Lead",
            "categories": {"location": "Dubai"},
            "hostedUrl": "https://jobs.lever.co/beta/1",
            "createdAt": ago(3).timestamp_millis()
        },
        {
            "text": "Software Engineer",
            "categories": {"location": "Dubai"},
            "hostedUrl": "https://jobs.lever.co/beta/2",
            "createdAt": ago(1).timestamp_millis()
        }
    ]))
    .unwrap();

    let search = serde_json::from_value(json!({
        "jobs_results": [
            {
                "title": "CRM Manager",
                "company_name": "acme",
                "location": "Bengaluru, India",
                "apply_options": [{"link": "https://boards.greenhouse.io/acme/jobs/1"}],
                "detected_extensions": {"posted_at": "1 hour ago"}
            }
        ]
    }))
    .unwrap();

    let mut records = parse_greenhouse("acme", greenhouse, &normalizer);
    records.extend(parse_lever("beta", lever, &normalizer));
    records.extend(parse_search("India", search, &relative));
    records
}

fn keywords() -> Vec<String> {
    vec!["crm".to_string(), "retention".to_string()]
}

#[test]
fn fixtures_normalize_into_canonical_offset() {
    let records = fetch_fixtures(clock());

    assert_eq!(records.len(), 5);
    assert!(records
        .iter()
        .all(|r| r.posted_at.offset() == &clock().offset()));
    assert_eq!(records[0].posted_at, ago(2));
    assert_eq!(records[2].posted_at, ago(3));
    assert_eq!(records[4].posted_at, ago(1));
}

#[test]
fn duplicate_across_sources_shares_fingerprint() {
    let records = fetch_fixtures(clock());

    assert_eq!(records[0].source, SourceTag::Greenhouse);
    assert_eq!(records[4].source.to_string(), "search:India");
    assert_ne!(records[0].posted_at, records[4].posted_at);
    assert_eq!(Fingerprint::of(&records[0]), Fingerprint::of(&records[4]));
}

#[test]
fn full_pipeline_keeps_recent_unique_matches_in_order() {
    let clock = clock();
    let keywords = keywords();

    let filtered = filter(fetch_fixtures(clock), Some(keywords.as_slice()), None, &clock);
    let unique = dedupe(filtered);

    let titles: Vec<_> = unique.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["CRM Manager", "Retention Lead"]);
    assert_eq!(unique[0].source, SourceTag::Greenhouse);
    assert_eq!(unique[1].source, SourceTag::Lever);
}

#[test]
fn digest_groups_survivors_by_region() {
    let clock = clock();
    let keywords = keywords();
    let unique = dedupe(filter(
        fetch_fixtures(clock),
        Some(keywords.as_slice()),
        None,
        &clock,
    ));

    let renderer = DigestRenderer::from_config(&DigestConfig::default());
    let sections = renderer.group(&unique);
    let digest = renderer.render(&unique, &clock);

    let names: Vec<_> = sections.iter().map(|s| s.name).collect();
    assert_eq!(names, vec!["India", "UAE"]);
    assert_eq!(digest.total, 2);
    assert!(digest.subject.ends_with("Tue, Oct 01"));
}
