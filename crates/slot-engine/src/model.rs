//! Stored calendar events and their weekly recurrence rules.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Result, SlotError};
use crate::weekday::{Weekday, WeekdaySet};
use crate::window::EventWindow;

/// Weekdays on which an event repeats, indefinitely, at the anchor's local
/// time of day and duration.
///
/// Owned by exactly one [`Event`] and has no identity of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawRecurrenceRule")]
pub struct RecurrenceRule {
    days_of_week: WeekdaySet,
}

#[derive(Deserialize)]
struct RawRecurrenceRule {
    days_of_week: Vec<Weekday>,
}

impl TryFrom<RawRecurrenceRule> for RecurrenceRule {
    type Error = SlotError;

    fn try_from(raw: RawRecurrenceRule) -> Result<Self> {
        RecurrenceRule::new(&raw.days_of_week)
    }
}

impl RecurrenceRule {
    /// # Errors
    /// Returns `SlotError::InvalidRecurrenceSet` if `days` is empty or has
    /// duplicates.
    pub fn new(days: &[Weekday]) -> Result<Self> {
        Ok(RecurrenceRule {
            days_of_week: WeekdaySet::from_days(days)?,
        })
    }

    pub fn days_of_week(&self) -> WeekdaySet {
        self.days_of_week
    }
}

/// A stored event. `start`/`end` are the anchor: the first (or only)
/// occurrence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub name: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// IANA zone the event was authored in; time-of-day and weekday are
    /// read in this zone.
    pub timezone: Tz,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<RecurrenceRule>,
}

impl Event {
    pub fn is_recurring(&self) -> bool {
        self.recurrence.is_some()
    }

    /// Recurrence days, if any.
    pub fn weekdays(&self) -> Option<WeekdaySet> {
        self.recurrence.map(|rule| rule.days_of_week())
    }

    pub fn window(&self) -> EventWindow {
        EventWindow::new(self.start, self.end, self.timezone)
    }
}
