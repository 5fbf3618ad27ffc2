//! Time utilities: canonical offset resolution and posted-date normalization
//!
//! Every timestamp that reaches the filter is expressed in one canonical fixed
//! offset. The reference instant for a run is captured once in a [`RunClock`]
//! and handed to every component that needs "now".

use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;
use regex::Regex;
use serde_json::Value;
use tracing::debug;

/// Offset-aware date formats tried after RFC 3339
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%:z",
];

/// Formats without an offset; these are read as UTC
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

/// Reference instant for a single run, in the canonical offset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunClock {
    now: DateTime<FixedOffset>,
}

impl RunClock {
    /// Read the system clock once and express it in `offset`
    pub fn capture(offset: FixedOffset) -> Self {
        Self {
            now: Utc::now().with_timezone(&offset),
        }
    }

    /// Pin the clock to a known instant; its offset becomes the canonical one
    pub fn fixed(now: DateTime<FixedOffset>) -> Self {
        Self { now }
    }

    pub fn now(&self) -> DateTime<FixedOffset> {
        self.now
    }

    pub fn offset(&self) -> FixedOffset {
        *self.now.offset()
    }

    /// Convert any instant into the canonical offset
    pub fn to_canonical<Tz2: TimeZone>(&self, dt: &DateTime<Tz2>) -> DateTime<FixedOffset> {
        dt.with_timezone(&self.offset())
    }
}

/// Typed form of an upstream posted-date value
#[derive(Debug, Clone, PartialEq)]
pub enum RawTimestamp {
    /// Already an offset-aware instant
    Instant(DateTime<FixedOffset>),
    /// ISO-8601 text, or epoch milliseconds carried as text
    Text(String),
    /// Milliseconds since the Unix epoch
    EpochMillis(i64),
    Missing,
}

impl RawTimestamp {
    /// Map a JSON value from a board payload
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::String(text) => Self::Text(text.clone()),
            Value::Number(number) => number
                .as_i64()
                .or_else(|| number.as_f64().map(|f| f as i64))
                .map(Self::EpochMillis)
                .unwrap_or(Self::Missing),
            _ => Self::Missing,
        }
    }

    /// Whether the value carries nothing worth parsing (empty text, zero, missing)
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Missing => true,
            Self::Text(text) => text.trim().is_empty(),
            Self::EpochMillis(ms) => *ms == 0,
            Self::Instant(_) => false,
        }
    }

    /// Keep `self` unless it is blank, otherwise take `other`
    pub fn or(self, other: RawTimestamp) -> RawTimestamp {
        if self.is_blank() { other } else { self }
    }
}

impl From<DateTime<FixedOffset>> for RawTimestamp {
    fn from(dt: DateTime<FixedOffset>) -> Self {
        Self::Instant(dt)
    }
}

impl From<DateTime<Utc>> for RawTimestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::Instant(dt.fixed_offset())
    }
}

impl From<&str> for RawTimestamp {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for RawTimestamp {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<i64> for RawTimestamp {
    fn from(ms: i64) -> Self {
        Self::EpochMillis(ms)
    }
}

impl From<Option<&Value>> for RawTimestamp {
    fn from(value: Option<&Value>) -> Self {
        value.map(Self::from_json).unwrap_or(Self::Missing)
    }
}

/// Which strategy produced a normalized timestamp
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Input was already an instant and was only shifted to the canonical offset
    Converted,
    Iso8601,
    EpochMillis,
    /// Every strategy failed; the run's "now" was used instead
    Fallback(FallbackReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    Missing,
    Unparseable(String),
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => write!(f, "no posted date supplied"),
            Self::Unparseable(text) => write!(f, "unparseable posted date '{text}'"),
        }
    }
}

/// Result of normalizing a raw timestamp
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    pub at: DateTime<FixedOffset>,
    pub resolution: Resolution,
}

impl Normalized {
    pub fn is_fallback(&self) -> bool {
        matches!(self.resolution, Resolution::Fallback(_))
    }
}

/// Best-effort converter from heterogeneous posted dates to canonical instants
///
/// Strategies are tried in order: existing instant, ISO-8601 text, epoch
/// milliseconds (numeric or textual). Nothing here returns an error; when all
/// strategies fail the run's reference instant is used and the reason is
/// recorded in [`Resolution::Fallback`].
#[derive(Debug, Clone, Copy)]
pub struct TimeNormalizer {
    clock: RunClock,
}

impl TimeNormalizer {
    pub fn new(clock: RunClock) -> Self {
        Self { clock }
    }

    pub fn clock(&self) -> &RunClock {
        &self.clock
    }

    pub fn now(&self) -> DateTime<FixedOffset> {
        self.clock.now()
    }

    pub fn normalize(&self, raw: impl Into<RawTimestamp>) -> Normalized {
        let raw = raw.into();
        let resolved = match &raw {
            RawTimestamp::Instant(dt) => Some((self.clock.to_canonical(dt), Resolution::Converted)),
            RawTimestamp::Text(text) => parse_iso8601(text)
                .map(|dt| (self.clock.to_canonical(&dt), Resolution::Iso8601))
                .or_else(|| {
                    text.trim()
                        .parse::<i64>()
                        .ok()
                        .and_then(|ms| self.epoch_millis_to_canonical(ms))
                        .map(|dt| (dt, Resolution::EpochMillis))
                }),
            RawTimestamp::EpochMillis(ms) => self
                .epoch_millis_to_canonical(*ms)
                .map(|dt| (dt, Resolution::EpochMillis)),
            RawTimestamp::Missing => None,
        };

        match resolved {
            Some((at, resolution)) => Normalized { at, resolution },
            None => {
                let reason = match raw {
                    RawTimestamp::Missing => FallbackReason::Missing,
                    RawTimestamp::Text(text) => FallbackReason::Unparseable(text),
                    RawTimestamp::EpochMillis(ms) => FallbackReason::Unparseable(ms.to_string()),
                    RawTimestamp::Instant(dt) => FallbackReason::Unparseable(dt.to_rfc3339()),
                };
                debug!("Falling back to run time: {}", reason);
                Normalized {
                    at: self.clock.now(),
                    resolution: Resolution::Fallback(reason),
                }
            }
        }
    }

    fn epoch_millis_to_canonical(&self, ms: i64) -> Option<DateTime<FixedOffset>> {
        DateTime::from_timestamp_millis(ms).map(|dt| self.clock.to_canonical(&dt))
    }
}

/// Parse ISO-8601 text, reading a trailing `Z` as `+00:00` and naive values as UTC
pub fn parse_iso8601(text: &str) -> Option<DateTime<FixedOffset>> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    let candidate = match trimmed.strip_suffix(['Z', 'z']) {
        Some(stripped) => format!("{stripped}+00:00"),
        None => trimmed.to_string(),
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(&candidate) {
        return Some(dt);
    }

    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(&candidate, format) {
            return Some(dt);
        }
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(&candidate, format) {
            return Some(naive.and_utc().fixed_offset());
        }
    }

    NaiveDate::parse_from_str(&candidate, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().fixed_offset())
}

/// Resolve a timezone expression to the offset in force at `at`
///
/// Accepts fixed offsets ("+05:30", "-0400") or IANA names ("Asia/Kolkata").
pub fn resolve_canonical_offset(tz_str: &str, at: DateTime<Utc>) -> Result<FixedOffset, String> {
    if let Ok(offset) = parse_fixed_offset(tz_str) {
        return Ok(offset);
    }

    if let Ok(tz) = tz_str.trim().parse::<Tz>() {
        return Ok(tz.offset_from_utc_datetime(&at.naive_utc()).fix());
    }

    Err(format!(
        "Invalid timezone: '{}'. Use either a named timezone (e.g., 'Asia/Kolkata') or UTC offset (e.g., '+05:30')",
        tz_str
    ))
}

/// Parse fixed offset timezone formats like "+05:30", "+0530"
pub fn parse_fixed_offset(offset_str: &str) -> Result<FixedOffset, String> {
    let offset_str = offset_str.trim();

    let re = Regex::new(r"^([+-])(\d{2}):?(\d{2})$").map_err(|e| format!("Regex error: {}", e))?;

    let caps = re
        .captures(offset_str)
        .ok_or_else(|| format!("Invalid offset format: '{}'", offset_str))?;

    let sign = if &caps[1] == "+" { 1 } else { -1 };
    let hours: i32 = caps[2].parse().map_err(|_| "Invalid hours in offset")?;
    let minutes: i32 = caps[3].parse().map_err(|_| "Invalid minutes in offset")?;

    if hours > 23 || minutes > 59 {
        return Err("Invalid time values in offset".to_string());
    }

    let total_seconds = sign * (hours * 3600 + minutes * 60);

    FixedOffset::east_opt(total_seconds).ok_or_else(|| "Invalid timezone offset".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ist() -> FixedOffset {
        FixedOffset::east_opt(5 * 3600 + 30 * 60).unwrap()
    }

    fn clock() -> RunClock {
        RunClock::fixed(ist().with_ymd_and_hms(2024, 10, 1, 18, 0, 0).unwrap())
    }

    #[test]
    fn test_iso_with_z_suffix_is_converted_to_canonical() {
        let normalizer = TimeNormalizer::new(clock());
        let result = normalizer.normalize("2024-10-01T12:00:00Z");

        assert_eq!(result.resolution, Resolution::Iso8601);
        assert_eq!(result.at.offset(), &ist());
        assert_eq!(
            result.at,
            Utc.with_ymd_and_hms(2024, 10, 1, 12, 0, 0).unwrap()
        );
        assert_eq!(result.at.format("%H:%M").to_string(), "17:30");
    }

    #[test]
    fn test_iso_with_explicit_offset_and_fraction() {
        let normalizer = TimeNormalizer::new(clock());
        let result = normalizer.normalize("2024-10-01T08:00:00.123-04:00");

        assert_eq!(result.resolution, Resolution::Iso8601);
        assert_eq!(
            result.at.timestamp(),
            Utc.with_ymd_and_hms(2024, 10, 1, 12, 0, 0).unwrap().timestamp()
        );
    }

    #[test]
    fn test_epoch_millis_number_and_text() {
        let normalizer = TimeNormalizer::new(clock());
        let expected = Utc.with_ymd_and_hms(2024, 10, 1, 11, 0, 0).unwrap();

        let from_number = normalizer.normalize(1_727_780_400_000_i64);
        assert_eq!(from_number.resolution, Resolution::EpochMillis);
        assert_eq!(from_number.at, expected);

        let from_text = normalizer.normalize("1727780400000");
        assert_eq!(from_text.resolution, Resolution::EpochMillis);
        assert_eq!(from_text.at, expected);
        assert_eq!(from_text.at.offset(), &ist());
    }

    #[test]
    fn test_unparseable_text_falls_back_to_now() {
        let normalizer = TimeNormalizer::new(clock());
        let result = normalizer.normalize("not-a-date");

        assert!(result.is_fallback());
        assert_eq!(result.at, clock().now());
        assert_eq!(
            result.resolution,
            Resolution::Fallback(FallbackReason::Unparseable("not-a-date".to_string()))
        );
    }

    #[test]
    fn test_missing_falls_back_to_now() {
        let normalizer = TimeNormalizer::new(clock());
        let result = normalizer.normalize(RawTimestamp::Missing);

        assert_eq!(result.at, clock().now());
        assert_eq!(
            result.resolution,
            Resolution::Fallback(FallbackReason::Missing)
        );
    }

    #[test]
    fn test_out_of_range_epoch_falls_back() {
        let normalizer = TimeNormalizer::new(clock());
        let result = normalizer.normalize(i64::MAX);
        assert!(result.is_fallback());
    }

    #[test]
    fn test_instant_is_converted() {
        let normalizer = TimeNormalizer::new(clock());
        let utc = Utc.with_ymd_and_hms(2024, 10, 1, 0, 0, 0).unwrap();
        let result = normalizer.normalize(utc);

        assert_eq!(result.resolution, Resolution::Converted);
        assert_eq!(result.at, utc);
        assert_eq!(result.at.offset(), &ist());
    }

    #[test]
    fn test_naive_and_date_only_are_read_as_utc() {
        assert_eq!(
            parse_iso8601("2024-10-01T12:00:00").unwrap(),
            Utc.with_ymd_and_hms(2024, 10, 1, 12, 0, 0).unwrap()
        );
        assert_eq!(
            parse_iso8601("2024-10-01").unwrap(),
            Utc.with_ymd_and_hms(2024, 10, 1, 0, 0, 0).unwrap()
        );
        assert!(parse_iso8601("").is_none());
        assert!(parse_iso8601("yesterday").is_none());
    }

    #[test]
    fn test_raw_timestamp_from_json() {
        assert_eq!(
            RawTimestamp::from_json(&json!("2024-10-01")),
            RawTimestamp::Text("2024-10-01".to_string())
        );
        assert_eq!(
            RawTimestamp::from_json(&json!(1727780400000_i64)),
            RawTimestamp::EpochMillis(1727780400000)
        );
        assert_eq!(
            RawTimestamp::from_json(&json!(1727780400000.9_f64)),
            RawTimestamp::EpochMillis(1727780400000)
        );
        assert_eq!(RawTimestamp::from_json(&json!(null)), RawTimestamp::Missing);
        assert_eq!(RawTimestamp::from_json(&json!({})), RawTimestamp::Missing);
    }

    #[test]
    fn test_raw_timestamp_or_skips_blank_values() {
        let picked = RawTimestamp::Text("  ".to_string()).or(RawTimestamp::EpochMillis(5));
        assert_eq!(picked, RawTimestamp::EpochMillis(5));

        let kept = RawTimestamp::Text("2024-10-01".to_string()).or(RawTimestamp::EpochMillis(5));
        assert_eq!(kept, RawTimestamp::Text("2024-10-01".to_string()));

        assert_eq!(
            RawTimestamp::Missing.or(RawTimestamp::Missing),
            RawTimestamp::Missing
        );
    }

    #[test]
    fn test_parse_fixed_offset() {
        assert_eq!(parse_fixed_offset("+05:30").unwrap(), ist());
        assert_eq!(parse_fixed_offset("+0530").unwrap(), ist());
        assert_eq!(
            parse_fixed_offset("-04:00").unwrap().local_minus_utc(),
            -4 * 3600
        );

        assert!(parse_fixed_offset("+25:00").is_err());
        assert!(parse_fixed_offset("invalid").is_err());
    }

    #[test]
    fn test_resolve_canonical_offset() {
        let at = Utc.with_ymd_and_hms(2024, 10, 1, 0, 0, 0).unwrap();

        assert_eq!(resolve_canonical_offset("+05:30", at).unwrap(), ist());
        assert_eq!(resolve_canonical_offset("Asia/Kolkata", at).unwrap(), ist());
        assert_eq!(
            resolve_canonical_offset("Asia/Dubai", at)
                .unwrap()
                .local_minus_utc(),
            4 * 3600
        );
        assert!(resolve_canonical_offset("Mars/Olympus", at).is_err());
    }
}
