//! Date preset / custom range filtering over the `startTimestamp` attribute.

use std::fmt;
use std::str::FromStr;

use chrono::{Duration, Local, NaiveDate, TimeZone, Utc};
use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::filter::{FilterContext, FilterUpdate};

/// Attribute the range predicate is built over.
pub const START_TIMESTAMP_ATTRIBUTE: &str = "startTimestamp";

/// Named shortcut ranges plus the custom-range marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DatePreset {
    Today,
    Tomorrow,
    Week,
    Custom,
}

impl DatePreset {
    pub fn as_str(self) -> &'static str {
        match self {
            DatePreset::Today => "today",
            DatePreset::Tomorrow => "tomorrow",
            DatePreset::Week => "week",
            DatePreset::Custom => "custom",
        }
    }

    /// Label shown next to the radio button.
    pub fn label(self) -> &'static str {
        match self {
            DatePreset::Today => "Today",
            DatePreset::Tomorrow => "Tomorrow",
            DatePreset::Week => "This week",
            DatePreset::Custom => "Custom dates",
        }
    }
}

impl fmt::Display for DatePreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DatePreset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "today" => Ok(DatePreset::Today),
            "tomorrow" => Ok(DatePreset::Tomorrow),
            "week" | "this-week" => Ok(DatePreset::Week),
            "custom" => Ok(DatePreset::Custom),
            _ => Err(Error::UnknownDatePreset {
                name: s.to_string(),
            }),
        }
    }
}

/// Inclusive calendar-day range picked in the calendar widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if end < start {
            return Err(Error::InvalidDateRange {
                message: format!("end {end} is before start {start}"),
            });
        }
        Ok(Self { start, end })
    }

    pub fn single(day: NaiveDate) -> Self {
        Self {
            start: day,
            end: day,
        }
    }
}

/// Longest daylight-saving gap skipped when midnight does not exist locally.
const MAX_GAP_MINUTES: i64 = 180;

/// Milliseconds since the epoch at local midnight of `date` in `tz`.
///
/// When a clock change skips midnight the day starts at the first local
/// minute that exists (usually 01:00).
pub fn local_midnight_millis<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> Option<i64> {
    let midnight = date.and_hms_opt(0, 0, 0)?;
    (0..=MAX_GAP_MINUTES)
        .map(|minutes| midnight + Duration::minutes(minutes))
        .find_map(|local| tz.from_local_datetime(&local).earliest())
        .map(|instant| instant.timestamp_millis())
}

fn bounds<Tz: TimeZone>(tz: &Tz, first: NaiveDate, days: i64) -> Option<String> {
    let start = local_midnight_millis(tz, first)?;
    let end = local_midnight_millis(tz, first + Duration::days(days))?;
    Some(format!(
        "{attr} >= {start} AND {attr} < {end}",
        attr = START_TIMESTAMP_ATTRIBUTE
    ))
}

/// Build the range predicate for a preset, or for `custom` with a range.
///
/// Returns `None` when the inputs do not describe a usable range.
pub fn build_date_filter_query<Tz: TimeZone>(
    preset: Option<DatePreset>,
    range: Option<&DateRange>,
    tz: &Tz,
    today: NaiveDate,
) -> Option<String> {
    match preset? {
        DatePreset::Today => bounds(tz, today, 1),
        DatePreset::Tomorrow => bounds(tz, today + Duration::days(1), 1),
        DatePreset::Week => bounds(tz, today, 7),
        DatePreset::Custom => {
            let range = range?;
            let days = (range.end - range.start).num_days() + 1;
            if days < 1 {
                return None;
            }
            bounds(tz, range.start, days)
        }
    }
}

/// Stateful date filter.
///
/// Remembers the last valid predicate so the search keeps its date filter
/// while a custom range is still being picked; [`DateFilter::clear`] drops it.
#[derive(Debug)]
pub struct DateFilter<Tz: TimeZone = Local> {
    filters: FilterContext,
    tz: Tz,
    selected: Option<DatePreset>,
    draft: Option<DateRange>,
    applied: Option<DateRange>,
    is_applied: bool,
    calendar_open: bool,
    last_valid: Option<String>,
}

impl DateFilter<Local> {
    /// Filter anchored at the machine's local midnight.
    pub fn local(filters: FilterContext) -> Self {
        Self::new(filters, Local)
    }
}

impl<Tz: TimeZone> DateFilter<Tz> {
    pub fn new(filters: FilterContext, tz: Tz) -> Self {
        Self {
            filters,
            tz,
            selected: None,
            draft: None,
            applied: None,
            is_applied: false,
            calendar_open: false,
            last_valid: None,
        }
    }

    pub fn selected_preset(&self) -> Option<DatePreset> {
        self.selected
    }

    pub fn custom_range(&self) -> Option<DateRange> {
        self.draft
    }

    pub fn is_applied(&self) -> bool {
        self.is_applied
    }

    pub fn calendar_open(&self) -> bool {
        self.calendar_open
    }

    pub fn open_calendar(&mut self) {
        self.calendar_open = true;
    }

    pub fn close_calendar(&mut self) {
        self.calendar_open = false;
    }

    pub fn select_preset(&mut self, preset: DatePreset) {
        self.selected = Some(preset);
        self.is_applied = false;

        if preset == DatePreset::Custom {
            self.calendar_open = true;
        } else {
            self.filters.update(FilterUpdate::date_range(None));
            self.calendar_open = false;
        }
    }

    /// Live range from the calendar; not used for filtering until applied.
    pub fn set_custom_range(&mut self, range: DateRange) {
        self.draft = Some(range);
    }

    /// Commit the live custom range.
    pub fn apply(&mut self) -> Result<DateRange> {
        let range = self.draft.ok_or_else(|| Error::InvalidDateRange {
            message: "no custom range selected".to_string(),
        })?;
        self.filters.update(FilterUpdate::date_range(Some(range)));
        self.applied = Some(range);
        self.is_applied = true;
        self.calendar_open = false;
        Ok(range)
    }

    /// Drop the selection and the remembered fallback predicate.
    pub fn clear(&mut self) {
        self.selected = None;
        self.draft = None;
        self.applied = None;
        self.is_applied = false;
        self.calendar_open = false;
        self.last_valid = None;
        self.filters.update(FilterUpdate::date_range(None));
    }

    /// Current predicate for `today`, falling back to the last valid one.
    pub fn filter_query(&mut self, today: NaiveDate) -> Option<String> {
        let shared = self.filters.snapshot().date_range;
        let range = if self.is_applied {
            shared
        } else {
            self.applied.or(shared)
        };

        match build_date_filter_query(self.selected, range.as_ref(), &self.tz, today) {
            Some(query) => {
                self.last_valid = Some(query.clone());
                Some(query)
            }
            None => {
                if self.last_valid.is_some() {
                    debug!("date selection incomplete; keeping previous predicate");
                }
                self.last_valid.clone()
            }
        }
    }

    /// [`DateFilter::filter_query`] for the current day in the filter's zone.
    pub fn filter_query_now(&mut self) -> Option<String> {
        let today = Utc::now().with_timezone(&self.tz).date_naive();
        self.filter_query(today)
    }
}
