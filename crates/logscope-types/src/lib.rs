//! Shared types for logscope
//!
//! This crate contains data structures used across multiple logscope crates.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{DateTime, FixedOffset, Local, Offset, SecondsFormat, TimeDelta, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while parsing operator-supplied values
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid timestamp '{0}', expected RFC 3339 (e.g. 2024-01-15T10:30:00+00:00)")]
    Timestamp(String),

    #[error("invalid span '{0}', expected a number followed by s, m, h or d")]
    Span(String),

    #[error("invalid timezone '{0}', expected utc, local or an offset like +05:30")]
    Timezone(String),
}

// ============================================================================
// Streams
// ============================================================================

/// A named source of log records
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Stream {
    pub name: String,
}

impl Stream {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl fmt::Display for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Opaque credential handed to the engine at start-up
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    /// Wrap a token, rejecting blank values
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            None
        } else {
            Some(Self(token))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(<redacted>)")
    }
}

// ============================================================================
// Log Types
// ============================================================================

/// A single log record returned by a query
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogRecord {
    /// When the record was produced
    pub time: DateTime<Utc>,

    /// Log line content
    pub body: String,

    /// Ordered tags; order is significant for tag matching
    pub tags: Vec<String>,
}

impl LogRecord {
    pub fn new(time: DateTime<Utc>, body: impl Into<String>, tags: Vec<String>) -> Self {
        Self {
            time,
            body: body.into(),
            tags,
        }
    }

    /// Build a record from the comma-joined label string a source stores
    pub fn from_labels(time: DateTime<Utc>, body: impl Into<String>, labels: &str) -> Self {
        Self::new(time, body, Self::split_tags(labels))
    }

    /// Split a comma-joined label string, keeping order and duplicates
    pub fn split_tags(labels: &str) -> Vec<String> {
        if labels.is_empty() {
            return Vec::new();
        }
        labels.split(',').map(str::to_string).collect()
    }

    /// Tags joined back into their stored form
    pub fn labels(&self) -> String {
        self.tags.join(",")
    }

    /// First `n` tags, for compact row display
    pub fn leading_tags(&self, n: usize) -> &[String] {
        &self.tags[..n.min(self.tags.len())]
    }
}

/// Operator-chosen tags, kept in the order they were picked
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TagSelection(Vec<String>);

impl TagSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the tag at the end, or drop it if already selected.
    /// Returns whether the tag is selected afterwards.
    pub fn toggle(&mut self, tag: &str) -> bool {
        if self.remove(tag) {
            false
        } else {
            self.0.push(tag.to_string());
            true
        }
    }

    /// Drop a single tag; returns false if it was not selected
    pub fn remove(&mut self, tag: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|t| t != tag);
        self.0.len() != before
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.0.iter().any(|t| t == tag)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl From<Vec<String>> for TagSelection {
    fn from(tags: Vec<String>) -> Self {
        Self(tags)
    }
}

impl<S: Into<String>> FromIterator<S> for TagSelection {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

// ============================================================================
// Time Types
// ============================================================================

/// Absolute query window, stored in UTC
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Window ending at `now` and spanning `span` back
    pub fn last(span: TimeDelta, now: DateTime<Utc>) -> Self {
        let start = now.checked_sub_signed(span).unwrap_or(DateTime::<Utc>::MIN_UTC);
        Self { start, end: now }
    }

    /// Parse both bounds from RFC 3339 text, normalising to UTC
    pub fn parse(start: &str, end: &str) -> Result<Self, ParseError> {
        Ok(Self::new(parse_instant(start)?, parse_instant(end)?))
    }

    /// Start after end; accepted, but no record can fall inside
    pub fn is_inverted(&self) -> bool {
        self.start > self.end
    }

    /// Half-open membership test `[start, end)`
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }

    /// Start bound as sent to a record source
    pub fn start_param(&self) -> String {
        query_param(self.start)
    }

    /// End bound as sent to a record source
    pub fn end_param(&self) -> String {
        query_param(self.end)
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} .. {}", self.start_param(), self.end_param())
    }
}

/// ISO-8601 with an explicit `+00:00` offset
fn query_param(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Secs, false)
}

/// Parse an RFC 3339 instant into UTC
pub fn parse_instant(text: &str) -> Result<DateTime<Utc>, ParseError> {
    DateTime::parse_from_rfc3339(text.trim())
        .map(|t| t.with_timezone(&Utc))
        .map_err(|_| ParseError::Timestamp(text.to_string()))
}

static SPAN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\s*([smhd])$").expect("span pattern is valid"));

/// Parse a relative span such as `45m`, `2h` or `1d`
pub fn parse_span(text: &str) -> Result<TimeDelta, ParseError> {
    let err = || ParseError::Span(text.to_string());
    let caps = SPAN_RE.captures(text.trim()).ok_or_else(err)?;
    let amount: i64 = caps[1].parse().map_err(|_| err())?;
    let unit = match &caps[2] {
        "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        _ => 24 * 60 * 60,
    };
    amount
        .checked_mul(unit)
        .and_then(TimeDelta::try_seconds)
        .ok_or_else(err)
}

/// Relative window presets the operator can cycle through
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TimeRangePreset {
    /// Last 5 minutes
    Last5m,
    /// Last 10 minutes
    #[default]
    Last10m,
    /// Last 15 minutes
    Last15m,
    /// Last 30 minutes
    Last30m,
    /// Last 1 hour
    Last1h,
    /// Last 6 hours
    Last6h,
    /// Last 24 hours
    Last24h,
}

impl TimeRangePreset {
    /// Get the number of seconds for this preset
    pub fn as_seconds(&self) -> i64 {
        match self {
            Self::Last5m => 5 * 60,
            Self::Last10m => 10 * 60,
            Self::Last15m => 15 * 60,
            Self::Last30m => 30 * 60,
            Self::Last1h => 60 * 60,
            Self::Last6h => 6 * 60 * 60,
            Self::Last24h => 24 * 60 * 60,
        }
    }

    /// Absolute window for this preset ending at `now`
    pub fn range(&self, now: DateTime<Utc>) -> TimeRange {
        TimeRange::last(TimeDelta::seconds(self.as_seconds()), now)
    }

    /// Get display label for this preset
    pub fn label(&self) -> &'static str {
        match self {
            Self::Last5m => "5m",
            Self::Last10m => "10m",
            Self::Last15m => "15m",
            Self::Last30m => "30m",
            Self::Last1h => "1h",
            Self::Last6h => "6h",
            Self::Last24h => "24h",
        }
    }

    /// Cycle to the next preset
    pub fn next(&self) -> Self {
        match self {
            Self::Last5m => Self::Last10m,
            Self::Last10m => Self::Last15m,
            Self::Last15m => Self::Last30m,
            Self::Last30m => Self::Last1h,
            Self::Last1h => Self::Last6h,
            Self::Last6h => Self::Last24h,
            Self::Last24h => Self::Last5m,
        }
    }

    /// Cycle to the previous preset
    pub fn prev(&self) -> Self {
        match self {
            Self::Last5m => Self::Last24h,
            Self::Last10m => Self::Last5m,
            Self::Last15m => Self::Last10m,
            Self::Last30m => Self::Last15m,
            Self::Last1h => Self::Last30m,
            Self::Last6h => Self::Last1h,
            Self::Last24h => Self::Last6h,
        }
    }
}

/// Timezone used only when rendering record times
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum DisplayTimezone {
    #[default]
    Utc,
    Offset(FixedOffset),
}

/// `DD/MM/YYYY, HH:mm:ss`
const DISPLAY_FORMAT: &str = "%d/%m/%Y, %H:%M:%S";

static OFFSET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([+-])(\d{1,2}):?(\d{2})$").expect("offset pattern is valid")
});

impl DisplayTimezone {
    /// The machine's current local offset
    pub fn local() -> Self {
        Self::Offset(Local::now().offset().fix())
    }

    pub fn offset(&self) -> FixedOffset {
        match self {
            Self::Utc => Utc.fix(),
            Self::Offset(offset) => *offset,
        }
    }

    /// Render an instant in this timezone
    pub fn format(&self, instant: DateTime<Utc>) -> String {
        instant
            .with_timezone(&self.offset())
            .format(DISPLAY_FORMAT)
            .to_string()
    }

    pub fn label(&self) -> String {
        match self {
            Self::Utc => "UTC".to_string(),
            Self::Offset(offset) => offset.to_string(),
        }
    }
}

impl FromStr for DisplayTimezone {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseError::Timezone(s.to_string());
        let trimmed = s.trim();
        match trimmed.to_lowercase().as_str() {
            "utc" | "gmt" | "z" => return Ok(Self::Utc),
            "local" => return Ok(Self::local()),
            "ist" => {
                return FixedOffset::east_opt(5 * 3600 + 30 * 60)
                    .map(Self::Offset)
                    .ok_or_else(err);
            }
            _ => {}
        }

        let caps = OFFSET_RE.captures(trimmed).ok_or_else(err)?;
        let hours: i32 = caps[2].parse().map_err(|_| err())?;
        let minutes: i32 = caps[3].parse().map_err(|_| err())?;
        if minutes >= 60 {
            return Err(err());
        }
        let sign = if &caps[1] == "-" { -1 } else { 1 };
        FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
            .map(Self::Offset)
            .ok_or_else(err)
    }
}

// ============================================================================
// Query Types
// ============================================================================

/// The (stream, window) pair a query is issued for
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub stream: String,
    pub range: TimeRange,
}

impl QueryKey {
    pub fn new(stream: impl Into<String>, range: TimeRange) -> Self {
        Self {
            stream: stream.into(),
            range,
        }
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.stream, self.range)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, h, m, s).unwrap()
    }

    #[test]
    fn test_split_tags_keeps_order_and_duplicates() {
        assert_eq!(
            LogRecord::split_tags("env:prod,svc:a,env:prod"),
            vec!["env:prod", "svc:a", "env:prod"]
        );
        assert!(LogRecord::split_tags("").is_empty());

        let record = LogRecord::from_labels(at(10, 0, 0), "hello", "a,b,c,d");
        assert_eq!(record.labels(), "a,b,c,d");
        assert_eq!(record.leading_tags(3), ["a", "b", "c"]);
        assert_eq!(record.leading_tags(10).len(), 4);
    }

    #[test]
    fn test_tag_selection_preserves_pick_order() {
        let mut selection = TagSelection::new();
        assert!(selection.toggle("svc:a"));
        assert!(selection.toggle("env:prod"));
        assert_eq!(selection.as_slice(), ["svc:a", "env:prod"]);

        assert!(!selection.toggle("svc:a"));
        assert_eq!(selection.as_slice(), ["env:prod"]);

        assert!(selection.remove("env:prod"));
        assert!(!selection.remove("env:prod"));
        assert!(selection.is_empty());
    }

    #[test]
    fn test_query_params_carry_utc_offset() {
        let range = TimeRange::new(at(10, 20, 0), at(10, 30, 0));
        assert_eq!(range.start_param(), "2024-01-15T10:20:00+00:00");
        assert_eq!(range.end_param(), "2024-01-15T10:30:00+00:00");
    }

    #[test]
    fn test_parse_range_normalises_offsets() {
        let range = TimeRange::parse("2024-01-15T16:00:00+05:30", "2024-01-15T10:40:00Z").unwrap();
        assert_eq!(range.start, at(10, 30, 0));
        assert_eq!(range.end, at(10, 40, 0));
        assert!(TimeRange::parse("yesterday", "2024-01-15T10:40:00Z").is_err());
    }

    #[test]
    fn test_range_membership_is_half_open() {
        let range = TimeRange::new(at(10, 0, 0), at(10, 10, 0));
        assert!(range.contains(at(10, 0, 0)));
        assert!(!range.contains(at(10, 10, 0)));

        let empty = TimeRange::new(at(10, 0, 0), at(10, 0, 0));
        assert!(!empty.contains(at(10, 0, 0)));
        assert!(!empty.is_inverted());

        let inverted = TimeRange::new(at(10, 10, 0), at(10, 0, 0));
        assert!(inverted.is_inverted());
        assert!(!inverted.contains(at(10, 5, 0)));
    }

    #[test]
    fn test_parse_span() {
        assert_eq!(parse_span("45m").unwrap(), TimeDelta::seconds(45 * 60));
        assert_eq!(parse_span("2h").unwrap(), TimeDelta::seconds(7200));
        assert_eq!(parse_span(" 1d ").unwrap(), TimeDelta::seconds(86400));
        assert!(parse_span("10").is_err());
        assert!(parse_span("m10").is_err());
    }

    #[test]
    fn test_preset_cycle_and_default() {
        let preset = TimeRangePreset::default();
        assert_eq!(preset, TimeRangePreset::Last10m);
        assert_eq!(preset.range(at(10, 10, 0)).start, at(10, 0, 0));
        assert_eq!(preset.next().prev(), preset);
        assert_eq!(TimeRangePreset::Last24h.next(), TimeRangePreset::Last5m);
    }

    #[test]
    fn test_display_timezone() {
        let utc: DisplayTimezone = "UTC".parse().unwrap();
        assert_eq!(utc.format(at(10, 5, 9)), "15/01/2024, 10:05:09");

        let ist: DisplayTimezone = "+05:30".parse().unwrap();
        assert_eq!(ist.format(at(20, 0, 0)), "16/01/2024, 01:30:00");
        assert_eq!(ist, "IST".parse().unwrap());
        assert_eq!(ist.label(), "+05:30");

        let west: DisplayTimezone = "-0800".parse().unwrap();
        assert_eq!(west.format(at(10, 0, 0)), "15/01/2024, 02:00:00");

        assert!("+05:75".parse::<DisplayTimezone>().is_err());
        assert!("mars".parse::<DisplayTimezone>().is_err());
    }

    #[test]
    fn test_session_token_rejects_blank() {
        assert!(SessionToken::new("  ").is_none());
        let token = SessionToken::new("secret").unwrap();
        assert_eq!(token.as_str(), "secret");
        assert!(!format!("{token:?}").contains("secret"));
    }
}
