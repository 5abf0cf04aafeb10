//! Time-window normalization.
//!
//! Recurring events are compared by local time of day and weekday, not by
//! absolute instant. This module turns a start/end pair into that
//! date-independent shape, either in the event's own zone or projected into
//! another event's zone.

use chrono::{DateTime, Datelike, TimeZone, Timelike, Utc};
use chrono_tz::Tz;

use crate::weekday::Weekday;

/// A day-independent `[start, end)` range in minutes since local midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeOfDayRange {
    pub start: u16,
    pub end: u16,
}

impl TimeOfDayRange {
    /// Zero or negative when the range is degenerate or wraps past midnight.
    pub fn duration_minutes(&self) -> i32 {
        i32::from(self.end) - i32::from(self.start)
    }
}

/// The recurring-time footprint of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizedWindow {
    pub time_of_day: TimeOfDayRange,
    /// Weekday of the start instant.
    pub weekday: Weekday,
}

/// Minute of the local day for `instant`, in whatever zone it carries.
pub fn minute_of_day<Z: TimeZone>(instant: &DateTime<Z>) -> u16 {
    // hour <= 23 and minute <= 59, so this never exceeds 1439.
    (instant.hour() * 60 + instant.minute()) as u16
}

/// Weekday of `instant` in whatever zone it carries.
pub fn weekday_of<Z: TimeZone>(instant: &DateTime<Z>) -> Weekday {
    instant.weekday().into()
}

/// Reduce a start/end pair to local time of day plus the start weekday.
///
/// Both instants should carry the event's authoring zone. Seconds are
/// dropped.
pub fn normalize<Z: TimeZone>(start: &DateTime<Z>, end: &DateTime<Z>) -> NormalizedWindow {
    NormalizedWindow {
        time_of_day: TimeOfDayRange {
            start: minute_of_day(start),
            end: minute_of_day(end),
        },
        weekday: weekday_of(start),
    }
}

/// Absolute range and local footprint of one event, computed once per check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub local: NormalizedWindow,
}

impl EventWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>, timezone: Tz) -> Self {
        EventWindow {
            start,
            end,
            local: normalize(&start.with_timezone(&timezone), &end.with_timezone(&timezone)),
        }
    }
}

/// The part of an absolute range that falls on one local calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DaySegment {
    pub weekday: Weekday,
    /// `end` is 1440 when the range runs on past local midnight.
    pub time_of_day: TimeOfDayRange,
}

const MINUTES_PER_DAY: u16 = 24 * 60;

/// Project `[start, end)` into `tz` and split it at local midnights.
///
/// A range that is same-day in its own zone can straddle midnight in
/// another, so the result usually has one segment and sometimes two. Empty
/// pieces are skipped, as is everything after the first week.
pub fn day_segments(start: DateTime<Utc>, end: DateTime<Utc>, tz: Tz) -> Vec<DaySegment> {
    let local_start = start.with_timezone(&tz);
    let local_end = end.with_timezone(&tz);
    let first = local_start.date_naive();
    let last = local_end.date_naive();

    first
        .iter_days()
        .take_while(|date| *date <= last)
        .take(7)
        .filter_map(|date| {
            let from = if date == first { minute_of_day(&local_start) } else { 0 };
            let to = if date == last { minute_of_day(&local_end) } else { MINUTES_PER_DAY };
            (to > from).then(|| DaySegment {
                weekday: date.weekday().into(),
                time_of_day: TimeOfDayRange { start: from, end: to },
            })
        })
        .collect()
}
