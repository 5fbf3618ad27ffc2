//! HTML digest rendering
//!
//! Records are grouped into configured regions by location markers, each
//! section sorted newest first. All record text is escaped before it lands in
//! the markup.

use quick_xml::escape::escape;
use tracing::debug;

use crate::config::{DigestConfig, RegionConfig};
use crate::models::JobRecord;
use crate::utils::RunClock;

const POSTED_FORMAT: &str = "%d %b %Y, %H:%M";
const GENERATED_FORMAT: &str = "%Y-%m-%d %H:%M";
const SUBJECT_DATE_FORMAT: &str = "%a, %b %d";

/// Rendered digest ready for delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Digest {
    pub subject: String,
    pub html: String,
    pub total: usize,
}

impl Digest {
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

/// One non-empty digest section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section<'a> {
    pub name: &'a str,
    pub records: Vec<&'a JobRecord>,
}

#[derive(Debug, Clone)]
pub struct DigestRenderer {
    heading: String,
    subject_prefix: String,
    timezone_label: String,
    regions: Vec<RegionConfig>,
    fallback_region: String,
}

impl DigestRenderer {
    pub fn from_config(config: &DigestConfig) -> Self {
        Self {
            heading: config.heading.clone(),
            subject_prefix: config.subject_prefix.clone(),
            timezone_label: config.timezone_label.clone(),
            regions: config
                .regions
                .iter()
                .map(|region| RegionConfig {
                    name: region.name.clone(),
                    markers: region.markers.iter().map(|m| m.to_lowercase()).collect(),
                })
                .collect(),
            fallback_region: config.fallback_region.clone(),
        }
    }

    pub fn render(&self, records: &[JobRecord], clock: &RunClock) -> Digest {
        let html = if records.is_empty() {
            self.render_empty(clock)
        } else {
            self.render_sections(records, clock)
        };

        Digest {
            subject: self.subject(clock),
            html,
            total: records.len(),
        }
    }

    pub fn subject(&self, clock: &RunClock) -> String {
        format!(
            "{} — last 24h — {}",
            self.subject_prefix,
            clock.now().format(SUBJECT_DATE_FORMAT)
        )
    }

    /// Region name for a location; the first region with a matching marker wins
    pub fn region_for(&self, location: &str) -> &str {
        let location = location.to_lowercase();
        self.regions
            .iter()
            .find(|region| {
                region
                    .markers
                    .iter()
                    .any(|marker| location.contains(marker.as_str()))
            })
            .map(|region| region.name.as_str())
            .unwrap_or(&self.fallback_region)
    }

    /// Sections in configured order with the fallback last, empty ones omitted
    pub fn group<'a>(&'a self, records: &'a [JobRecord]) -> Vec<Section<'a>> {
        let mut sections: Vec<Section<'a>> = self
            .regions
            .iter()
            .map(|region| region.name.as_str())
            .chain(std::iter::once(self.fallback_region.as_str()))
            .map(|name| Section {
                name,
                records: Vec::new(),
            })
            .collect();

        for record in records {
            let region = self.region_for(&record.location);
            if let Some(section) = sections.iter_mut().find(|s| s.name == region) {
                section.records.push(record);
            }
        }

        sections.retain(|section| !section.records.is_empty());
        for section in &mut sections {
            section
                .records
                .sort_by(|a, b| b.posted_at.cmp(&a.posted_at));
            debug!("Digest section {} has {} records", section.name, section.records.len());
        }
        sections
    }

    fn render_empty(&self, clock: &RunClock) -> String {
        format!(
            concat!(
                r#"<div style="font-family:Arial,sans-serif;padding:20px;color:#333;">"#,
                r#"<h2 style="color:#222;">No new openings in the last 24 hours</h2>"#,
                "<p>We'll keep checking and send the next update tomorrow.</p>",
                r#"<hr style="border:none;border-top:1px solid #eee;margin:20px 0;">"#,
                r#"<p style="font-size:12px;color:#888;">Automated daily digest · Generated at {} {}</p>"#,
                "</div>"
            ),
            clock.now().format(GENERATED_FORMAT),
            escape(self.timezone_label.as_str()),
        )
    }

    fn render_sections(&self, records: &[JobRecord], clock: &RunClock) -> String {
        let now = clock.now();

        let mut html = format!(
            r#"<div style="font-family:Arial,sans-serif;padding:20px;color:#222;"><h2 style="margin-top:0;">{} — {}</h2>"#,
            escape(self.heading.as_str()),
            now.format(SUBJECT_DATE_FORMAT)
        );
        html.push_str(&format!(
            "<p>{} new openings posted in the last 24 hours.</p>",
            records.len()
        ));

        for section in self.group(records) {
            html.push_str(&self.render_section(&section));
        }

        html.push_str(&format!(
            concat!(
                r#"<hr style="border:none;border-top:1px solid #eee;margin:20px 0;">"#,
                r#"<p style="font-size:12px;color:#888;">Automated daily digest · Generated at {} {}</p></div>"#
            ),
            now.format(GENERATED_FORMAT),
            escape(self.timezone_label.as_str())
        ));
        html
    }

    fn render_section(&self, section: &Section<'_>) -> String {
        let mut html = format!(
            r#"<h3 style="background:#f5f5f5;padding:8px 12px;border-radius:6px;">{} ({})</h3><table width="100%" cellpadding="0" cellspacing="0" style="border-collapse:collapse;">"#,
            escape(section.name),
            section.records.len()
        );
        for record in &section.records {
            html.push_str(&self.render_row(record));
        }
        html.push_str("</table>");
        html
    }

    fn render_row(&self, record: &JobRecord) -> String {
        format!(
            concat!(
                r#"<tr><td style="padding:6px 10px;">"#,
                r#"<b style="color:#333;">{title}</b><br>"#,
                r#"<span style="color:#555;">{company}</span> — <i>{location}</i><br>"#,
                r#"<span style="color:#888;font-size:12px;">{posted} {label} · <a href="{url}">Apply</a></span>"#,
                "</td></tr>"
            ),
            title = escape(record.title.as_str()),
            company = escape(record.company.as_str()),
            location = escape(record.location.as_str()),
            posted = record.posted_at.format(POSTED_FORMAT),
            label = escape(self.timezone_label.as_str()),
            url = escape(record.url.as_str()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SourceTag;
    use chrono::{FixedOffset, TimeDelta, TimeZone};

    fn clock() -> RunClock {
        let ist = FixedOffset::east_opt(19800).unwrap();
        RunClock::fixed(ist.with_ymd_and_hms(2024, 10, 1, 18, 0, 0).unwrap())
    }

    fn renderer() -> DigestRenderer {
        DigestRenderer::from_config(&DigestConfig::default())
    }

    fn record(title: &str, location: &str, hours_ago: i64) -> JobRecord {
        JobRecord::new(
            title,
            "Acme",
            location,
            "https://jobs.example.com/1",
            clock().now() - TimeDelta::hours(hours_ago),
            SourceTag::Greenhouse,
        )
    }

    #[test]
    fn test_subject_line() {
        assert_eq!(
            renderer().subject(&clock()),
            "CRM/Retention Jobs — last 24h — Tue, Oct 01"
        );
    }

    #[test]
    fn test_empty_digest_is_friendly_page() {
        let digest = renderer().render(&[], &clock());

        assert!(digest.is_empty());
        assert!(digest.html.contains("No new openings"));
        assert!(digest.html.contains("Generated at 2024-10-01 18:00 IST"));
    }

    #[test]
    fn test_region_for_first_match_wins() {
        let renderer = renderer();
        assert_eq!(renderer.region_for("Bengaluru, Karnataka"), "India");
        assert_eq!(renderer.region_for("Dubai - UAE"), "UAE");
        assert_eq!(renderer.region_for("Remote - India / Dubai"), "India");
        assert_eq!(renderer.region_for("Berlin"), "Others");
        assert_eq!(renderer.region_for(""), "Others");
    }

    #[test]
    fn test_group_orders_sections_and_sorts_newest_first() {
        let records = vec![
            record("Old India", "Mumbai", 10),
            record("Elsewhere", "London", 2),
            record("New India", "Pune", 1),
        ];
        let renderer = renderer();

        let sections = renderer.group(&records);

        let names: Vec<_> = sections.iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["India", "Others"]);
        let india: Vec<_> = sections[0].records.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(india, vec!["New India", "Old India"]);
    }

    #[test]
    fn test_render_escapes_record_text() {
        let records = vec![record("CRM <Lead> & Ops", "Dubai", 1)];

        let digest = renderer().render(&records, &clock());

        assert_eq!(digest.total, 1);
        assert!(digest.html.contains("CRM &lt;Lead&gt; &amp; Ops"));
        assert!(digest.html.contains("UAE (1)"));
        assert!(digest.html.contains("01 Oct 2024, 17:00 IST"));
        assert!(!digest.html.contains("Others ("));
    }

    #[test]
    fn test_render_emits_one_table_per_section_in_order() {
        let records = vec![
            record("CRM Lead", "London", 3),
            record("CRM Manager", "Pune", 2),
            record("Retention Lead", "Mumbai", 1),
        ];

        let html = renderer().render(&records, &clock()).html;

        assert!(html.starts_with("<div"));
        assert!(html.ends_with("</div>"));
        assert_eq!(html.matches("<table").count(), 2);
        assert_eq!(html.matches("</table>").count(), 2);
        assert_eq!(html.matches("<tr>").count(), 3);
        let india = html.find("India (2)").unwrap();
        let others = html.find("Others (1)").unwrap();
        assert!(india < others);
        assert!(html.find("Retention Lead").unwrap() < html.find("CRM Manager").unwrap());
        assert!(html.contains("Generated at 2024-10-01 18:00 IST"));
    }
}
