//! Event date parsing and UK-style display formatting.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::Serialize;

const BST_LABEL: &str = "BST (GMT+1)";
const GMT_LABEL: &str = "GMT";

/// Naive layouts the CMS uses for date-time fields.
const NAIVE_LAYOUTS: &[&str] = &[
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
];

/// Display form of an event's start/end pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventDates {
    /// Start and end share a calendar day.
    Single { line: String },
    /// The event spans several days.
    Span { start: String, end: String },
}

impl EventDates {
    pub fn lines(&self) -> Vec<&str> {
        match self {
            EventDates::Single { line } => vec![line.as_str()],
            EventDates::Span { start, end } => vec![start.as_str(), end.as_str()],
        }
    }
}

fn last_sunday_midnight(year: i32, month: u32) -> Option<DateTime<Utc>> {
    let last_day = NaiveDate::from_ymd_opt(year, month, 31)?;
    let back = i64::from(last_day.weekday().num_days_from_sunday());
    let sunday = last_day - Duration::days(back);
    Some(sunday.and_hms_opt(0, 0, 0)?.and_utc())
}

/// Whether `instant` falls inside British Summer Time.
///
/// The switch is approximated at midnight UTC on the last Sundays of March and
/// October.
pub fn is_british_summer_time(instant: DateTime<Utc>) -> bool {
    let year = instant.year();
    match (last_sunday_midnight(year, 3), last_sunday_midnight(year, 10)) {
        (Some(start), Some(end)) => instant >= start && instant < end,
        _ => false,
    }
}

/// `"BST (GMT+1)"` in summer time, `"GMT"` otherwise.
pub fn timezone_label(instant: DateTime<Utc>) -> &'static str {
    if is_british_summer_time(instant) {
        BST_LABEL
    } else {
        GMT_LABEL
    }
}

/// Wall-clock time in the UK for a UTC instant.
pub fn uk_civil_time(instant: DateTime<Utc>) -> NaiveDateTime {
    let offset = if is_british_summer_time(instant) { 1 } else { 0 };
    (instant + Duration::hours(offset)).naive_utc()
}

/// `"18 July 2025"`.
pub fn format_date(civil: NaiveDateTime) -> String {
    civil.format("%d %B %Y").to_string()
}

/// `"14:30"`.
pub fn format_time(civil: NaiveDateTime) -> String {
    civil.format("%H:%M").to_string()
}

/// Format an event's start and end instants for cards.
pub fn format_event_dates(start: DateTime<Utc>, end: DateTime<Utc>) -> EventDates {
    let tz = timezone_label(start);
    let start_civil = uk_civil_time(start);
    let end_civil = uk_civil_time(end);

    if start_civil.date() == end_civil.date() {
        EventDates::Single {
            line: format!(
                "Date: {}, {} - {} {}",
                format_date(start_civil),
                format_time(start_civil),
                format_time(end_civil),
                tz
            ),
        }
    } else {
        EventDates::Span {
            start: format!(
                "Start: {}, {} {}",
                format_date(start_civil),
                format_time(start_civil),
                tz
            ),
            end: format!(
                "End: {}, {} {}",
                format_date(end_civil),
                format_time(end_civil),
                tz
            ),
        }
    }
}

/// Parse a CMS date-time value.
///
/// RFC 3339 values keep their offset; naive values are read as UK civil time.
pub fn parse_event_datetime(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }

    let naive = NAIVE_LAYOUTS
        .iter()
        .find_map(|layout| NaiveDateTime::parse_from_str(raw, layout).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })?;

    let as_gmt = Utc.from_utc_datetime(&naive);
    if is_british_summer_time(as_gmt) {
        Some(as_gmt - Duration::hours(1))
    } else {
        Some(as_gmt)
    }
}
