//! Relative posted-date parsing ("3 hours ago", "yesterday")
//!
//! Search aggregators report recency as free text. Unknown phrasing maps to a
//! far-past sentinel so that it can never pass the recency window.

use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, FixedOffset, TimeDelta};
use regex::Regex;
use tracing::debug;

use super::time::RunClock;

/// "N months ago" is approximated with fixed-length months
pub const MONTH_AS_DAYS: i64 = 30;

/// Age assigned to relative text that cannot be understood
pub const UNPARSEABLE_AGE_DAYS: i64 = 365;

fn relative_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(\d+)\+?\s+([a-z]+)\s+ago").expect("relative time pattern is valid")
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelativeUnit {
    Minute,
    Hour,
    Day,
    Week,
    Month,
}

impl RelativeUnit {
    /// Match a unit word, singular or plural
    pub fn from_word(word: &str) -> Option<Self> {
        match word.strip_suffix('s').unwrap_or(word) {
            "minute" => Some(Self::Minute),
            "hour" => Some(Self::Hour),
            "day" => Some(Self::Day),
            "week" => Some(Self::Week),
            "month" => Some(Self::Month),
            _ => None,
        }
    }

    fn span(self, count: i64) -> Option<TimeDelta> {
        match self {
            Self::Minute => TimeDelta::try_minutes(count),
            Self::Hour => TimeDelta::try_hours(count),
            Self::Day => TimeDelta::try_days(count),
            Self::Week => TimeDelta::try_weeks(count),
            Self::Month => count.checked_mul(MONTH_AS_DAYS).and_then(TimeDelta::try_days),
        }
    }
}

impl fmt::Display for RelativeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Minute => "minute",
            Self::Hour => "hour",
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
        };
        f.write_str(name)
    }
}

/// How a relative phrase was interpreted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelativeResolution {
    /// Nothing to parse; treated as just posted
    Empty,
    Yesterday,
    Offset { count: i64, unit: RelativeUnit },
    /// Matched "N <word> ago" but the word is not a supported unit
    UnknownUnit(String),
    /// Did not match any known phrasing
    Unrecognized,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelativeParse {
    pub at: DateTime<FixedOffset>,
    pub resolution: RelativeResolution,
}

impl RelativeParse {
    /// Whether the far-past sentinel was used
    pub fn is_sentinel(&self) -> bool {
        matches!(
            self.resolution,
            RelativeResolution::UnknownUnit(_) | RelativeResolution::Unrecognized
        )
    }
}

/// Parser for relative recency phrases, anchored to the run's reference instant
#[derive(Debug, Clone, Copy)]
pub struct RelativeTimeParser {
    clock: RunClock,
}

impl RelativeTimeParser {
    pub fn new(clock: RunClock) -> Self {
        Self { clock }
    }

    pub fn clock(&self) -> &RunClock {
        &self.clock
    }

    /// Instant used for phrases that cannot be understood
    pub fn sentinel(&self) -> DateTime<FixedOffset> {
        self.clock.now() - TimeDelta::days(UNPARSEABLE_AGE_DAYS)
    }

    pub fn parse(&self, text: &str) -> RelativeParse {
        let now = self.clock.now();
        let normalized = text.trim().to_lowercase();

        if normalized.is_empty() {
            return RelativeParse {
                at: now,
                resolution: RelativeResolution::Empty,
            };
        }

        if normalized == "yesterday" {
            return RelativeParse {
                at: now - TimeDelta::days(1),
                resolution: RelativeResolution::Yesterday,
            };
        }

        let Some(caps) = relative_pattern().captures(&normalized) else {
            debug!("Unrecognized relative time '{}', using sentinel", text);
            return self.sentinel_parse(RelativeResolution::Unrecognized);
        };

        let word = &caps[2];
        let Some(unit) = RelativeUnit::from_word(word) else {
            debug!("Unknown relative time unit '{}' in '{}'", word, text);
            return self.sentinel_parse(RelativeResolution::UnknownUnit(word.to_string()));
        };

        let at = caps[1]
            .parse::<i64>()
            .ok()
            .and_then(|count| unit.span(count).map(|span| (count, span)))
            .and_then(|(count, span)| now.checked_sub_signed(span).map(|at| (count, at)));

        match at {
            Some((count, at)) => RelativeParse {
                at,
                resolution: RelativeResolution::Offset { count, unit },
            },
            None => {
                debug!("Relative time '{}' is out of range, using sentinel", text);
                self.sentinel_parse(RelativeResolution::Unrecognized)
            }
        }
    }

    fn sentinel_parse(&self, resolution: RelativeResolution) -> RelativeParse {
        RelativeParse {
            at: self.sentinel(),
            resolution,
        }
    }
}
