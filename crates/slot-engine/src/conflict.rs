//! Decide whether a proposed event collides with anything already stored.
//!
//! A candidate and every stored event are each an *anchor* (the literal dated
//! occurrence) and optionally a weekly *series* generated from it. Four
//! comparisons cover every pairing:
//!
//! | case                      | candidate | stored     | coordinates  |
//! |---------------------------|-----------|------------|--------------|
//! | [`ConflictCase::AnchorAnchor`]         | anchor | one-time  | instants     |
//! | [`ConflictCase::AnchorRecurrence`]     | anchor | recurring | time of day  |
//! | [`ConflictCase::RecurrenceAnchor`]     | series | one-time  | time of day  |
//! | [`ConflictCase::RecurrenceRecurrence`] | series | recurring | time of day  |
//!
//! They run in that order and the first hit wins. The last two only run when
//! the candidate recurs. All four share [`overlaps`].
//!
//! Time-of-day comparisons happen on one wall clock: the candidate is read in
//! the stored series' zone for Case 2, and stored events are read in the
//! candidate's zone for Cases 3 and 4.

use std::fmt;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Result, SlotError};
use crate::model::Event;
use crate::store::{EventQuery, EventStore};
use crate::weekday::{Weekday, WeekdaySet};
use crate::window::{day_segments, EventWindow, TimeOfDayRange};

/// Which comparison produced a conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConflictCase {
    AnchorAnchor,
    AnchorRecurrence,
    RecurrenceAnchor,
    RecurrenceRecurrence,
    None,
}

impl fmt::Display for ConflictCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ConflictCase::AnchorAnchor => "ANCHOR_ANCHOR",
            ConflictCase::AnchorRecurrence => "ANCHOR_RECURRENCE",
            ConflictCase::RecurrenceAnchor => "RECURRENCE_ANCHOR",
            ConflictCase::RecurrenceRecurrence => "RECURRENCE_RECURRENCE",
            ConflictCase::None => "NONE",
        })
    }
}

/// Outcome of a conflict check. A conflict is a successful answer, not an
/// error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictResult {
    pub conflict: bool,
    pub case: ConflictCase,
    /// The stored event that caused the hit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conflicting_event: Option<Uuid>,
}

impl ConflictResult {
    pub fn none() -> Self {
        ConflictResult {
            conflict: false,
            case: ConflictCase::None,
            conflicting_event: None,
        }
    }

    fn hit(case: ConflictCase, event: &Event) -> Self {
        ConflictResult {
            conflict: true,
            case,
            conflicting_event: Some(event.id),
        }
    }
}

/// A proposed event, not yet stored.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub timezone: Tz,
    /// `None` for a one-time event. `Some` must be non-empty and distinct.
    pub weekdays: Option<Vec<Weekday>>,
}

impl Candidate {
    pub fn one_time(start: DateTime<Utc>, end: DateTime<Utc>, timezone: Tz) -> Self {
        Candidate {
            start,
            end,
            timezone,
            weekdays: None,
        }
    }

    pub fn weekly(
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        timezone: Tz,
        weekdays: &[Weekday],
    ) -> Self {
        Candidate {
            start,
            end,
            timezone,
            weekdays: Some(weekdays.to_vec()),
        }
    }
}

/// Whether two ranges share any point.
///
/// Ranges are `[start, end)`: one that starts exactly where the other ends
/// does not overlap it, one that starts at the same point does.
pub fn overlaps<T: PartialOrd>(a_start: T, a_end: T, b_start: T, b_end: T) -> bool {
    (b_start >= a_start && b_start < a_end)
        || (b_end > a_start && b_end <= a_end)
        || (b_start <= a_start && b_end >= a_end)
}

fn time_of_day_overlaps(a: TimeOfDayRange, b: TimeOfDayRange) -> bool {
    overlaps(a.start, a.end, b.start, b.end)
}

/// Run the four-case comparison for `candidate` against `store`.
///
/// # Errors
/// Returns `SlotError::InvalidWindow` if the candidate's end is not after its
/// start, in absolute time or in local time of day.
/// Returns `SlotError::InvalidRecurrenceSet` if `weekdays` is `Some` but empty
/// or contains a duplicate.
/// Returns `SlotError::StoreUnavailable` if a store query fails.
///
/// Input errors are reported before the store is queried.
pub fn check_conflict<S: EventStore + ?Sized>(
    store: &S,
    candidate: &Candidate,
) -> Result<ConflictResult> {
    let window = EventWindow::new(candidate.start, candidate.end, candidate.timezone);
    validate_window(&window)?;

    let days = candidate
        .weekdays
        .as_deref()
        .map(WeekdaySet::from_days)
        .transpose()?;

    if let Some(event) = anchor_vs_anchor(store, &window)? {
        return Ok(report(ConflictCase::AnchorAnchor, &event));
    }
    if let Some(event) = anchor_vs_recurrence(store, &window)? {
        return Ok(report(ConflictCase::AnchorRecurrence, &event));
    }
    if let Some(days) = days {
        if let Some(event) = recurrence_vs_anchor(store, &window, candidate.timezone, days)? {
            return Ok(report(ConflictCase::RecurrenceAnchor, &event));
        }
        if let Some(event) = recurrence_vs_recurrence(store, &window, candidate.timezone, days)? {
            return Ok(report(ConflictCase::RecurrenceRecurrence, &event));
        }
    }

    tracing::debug!(start = %candidate.start, end = %candidate.end, "no conflict");
    Ok(ConflictResult::none())
}

fn validate_window(window: &EventWindow) -> Result<()> {
    if window.end <= window.start {
        return Err(SlotError::InvalidWindow(format!(
            "end {} is not after start {}",
            window.end, window.start
        )));
    }
    let tod = window.local.time_of_day;
    if tod.duration_minutes() <= 0 {
        return Err(SlotError::InvalidWindow(format!(
            "local end minute {} is not after local start minute {}",
            tod.end, tod.start
        )));
    }
    Ok(())
}

fn report(case: ConflictCase, event: &Event) -> ConflictResult {
    tracing::debug!(%case, event = %event.id, name = %event.name, "conflict found");
    ConflictResult::hit(case, event)
}

fn fetch<S: EventStore + ?Sized>(store: &S, query: EventQuery) -> Result<Vec<Event>> {
    store.query(&query).map_err(SlotError::StoreUnavailable)
}

/// Case 1: candidate anchor against one-time events, on absolute instants.
fn anchor_vs_anchor<S: EventStore + ?Sized>(
    store: &S,
    window: &EventWindow,
) -> Result<Option<Event>> {
    Ok(fetch(store, EventQuery::Anchors)?
        .into_iter()
        .filter(|event| !event.is_recurring())
        .find(|event| overlaps(window.start, window.end, event.start, event.end)))
}

/// Stored events are indexed by weekday in their own zone. At one instant,
/// local dates in any two zones differ by at most two days.
const ZONE_REACH_DAYS: i64 = 2;

/// Case 2: candidate anchor against recurring events whose series covers the
/// candidate's weekday and has already begun.
///
/// The candidate is projected into each series' zone, so both sides are read
/// on the series' wall clock.
fn anchor_vs_recurrence<S: EventStore + ?Sized>(
    store: &S,
    window: &EventWindow,
) -> Result<Option<Event>> {
    let reach = WeekdaySet::single(window.local.weekday).widened(ZONE_REACH_DAYS);
    Ok(fetch(store, EventQuery::SeriesOn(reach))?
        .into_iter()
        .find(|event| {
            let Some(rule) = event.weekdays() else {
                return false;
            };
            let own = event.window().local.time_of_day;
            event.start <= window.end
                && day_segments(window.start, window.end, event.timezone)
                    .iter()
                    .any(|seg| rule.contains(seg.weekday) && time_of_day_overlaps(seg.time_of_day, own))
        }))
}

/// Case 3: candidate series against one-time events on its weekdays that
/// fall on or after the series starts.
///
/// Each stored event is projected into the candidate's zone.
fn recurrence_vs_anchor<S: EventStore + ?Sized>(
    store: &S,
    window: &EventWindow,
    timezone: Tz,
    days: WeekdaySet,
) -> Result<Option<Event>> {
    Ok(fetch(store, EventQuery::AnchorsOn(days.widened(ZONE_REACH_DAYS)))?
        .into_iter()
        .filter(|event| !event.is_recurring())
        .find(|event| {
            event.start >= window.start
                && day_segments(event.start, event.end, timezone).iter().any(|seg| {
                    days.contains(seg.weekday)
                        && time_of_day_overlaps(window.local.time_of_day, seg.time_of_day)
                })
        }))
}

/// Case 4: candidate series against recurring events sharing a weekday.
/// Both repeat forever, so there is no date gate.
///
/// The stored anchor is projected into the candidate's zone. The day offset
/// that projection introduces is applied to the whole stored rule, using the
/// anchor's UTC offsets for every occurrence.
fn recurrence_vs_recurrence<S: EventStore + ?Sized>(
    store: &S,
    window: &EventWindow,
    timezone: Tz,
    days: WeekdaySet,
) -> Result<Option<Event>> {
    Ok(fetch(store, EventQuery::SeriesOn(days.widened(ZONE_REACH_DAYS)))?
        .into_iter()
        .find(|event| {
            let Some(rule) = event.weekdays() else {
                return false;
            };
            let anchor_day = i64::from(event.window().local.weekday.day_number());
            day_segments(event.start, event.end, timezone).iter().any(|seg| {
                let offset = i64::from(seg.weekday.day_number()) - anchor_day;
                rule.shifted(offset).intersects(days)
                    && time_of_day_overlaps(window.local.time_of_day, seg.time_of_day)
            })
        }))
}
