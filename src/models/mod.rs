use std::fmt;

use chrono::{DateTime, FixedOffset};
use serde::Serialize;

/// Where a posting was fetched from
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub enum SourceTag {
    Greenhouse,
    Lever,
    Ashby,
    /// Search aggregator, tagged with the location that was searched
    Search { location: String },
}

impl fmt::Display for SourceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Greenhouse => f.write_str("greenhouse"),
            Self::Lever => f.write_str("lever"),
            Self::Ashby => f.write_str("ashby"),
            Self::Search { location } => write!(f, "search:{location}"),
        }
    }
}

impl From<SourceTag> for String {
    fn from(tag: SourceTag) -> Self {
        tag.to_string()
    }
}

/// A normalized job posting
///
/// `posted_at` is always present and always in the run's canonical offset;
/// sources substitute the run time when upstream data is missing or unusable.
/// Records are never mutated once built: filtering and deduplication produce
/// new sequences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobRecord {
    pub title: String,
    pub company: String,
    pub location: String,
    pub url: String,
    pub posted_at: DateTime<FixedOffset>,
    pub source: SourceTag,
}

impl JobRecord {
    pub fn new(
        title: impl Into<String>,
        company: impl Into<String>,
        location: impl Into<String>,
        url: impl Into<String>,
        posted_at: DateTime<FixedOffset>,
        source: SourceTag,
    ) -> Self {
        Self {
            title: title.into(),
            company: company.into(),
            location: location.into(),
            url: url.into(),
            posted_at,
            source,
        }
    }

    /// Lowercased text that keyword and location filters match against
    pub fn haystack(&self) -> String {
        format!("{} {} {}", self.title, self.location, self.company).to_lowercase()
    }
}
