//! Checks a draft event must pass before it reaches the conflict evaluator.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::config::ValidationConfig;
use crate::conflict::Candidate;
use crate::error::{Result, SlotError};
use crate::weekday::{Weekday, WeekdaySet};
use crate::window::weekday_of;

/// An event as submitted by a caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDraft {
    pub name: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub timezone: Tz,
    #[serde(default)]
    pub days_of_week: Option<Vec<Weekday>>,
}

/// A draft that passed validation: trimmed name plus a candidate window
/// ready for [`check_conflict`](crate::check_conflict).
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedDraft {
    pub name: String,
    pub candidate: Candidate,
}

/// Validate `draft` against `config`.
///
/// An empty `days_of_week` list means "does not repeat" and is normalized to
/// `None`.
///
/// # Errors
/// - `SlotError::InvalidEvent` if the trimmed name is empty or too long.
/// - `SlotError::InvalidWindow` if end is not after start, the event crosses
///   local midnight, or it ends after `config.latest_end`.
/// - `SlotError::InvalidRecurrenceSet` if a weekday is repeated, or the
///   local start date is not one of the repeating weekdays.
pub fn validate_draft(draft: &EventDraft, config: &ValidationConfig) -> Result<ValidatedDraft> {
    let name = draft.name.trim();
    if name.is_empty() {
        return Err(SlotError::InvalidEvent("name is required".to_string()));
    }
    if name.chars().count() > config.max_name_length {
        return Err(SlotError::InvalidEvent(format!(
            "name must be {} characters or less",
            config.max_name_length
        )));
    }

    if draft.end <= draft.start {
        return Err(SlotError::InvalidWindow(
            "end time must be after start time".to_string(),
        ));
    }

    let local_start = draft.start.with_timezone(&draft.timezone);
    let local_end = draft.end.with_timezone(&draft.timezone);
    if local_start.date_naive() != local_end.date_naive() {
        return Err(SlotError::InvalidWindow(
            "events cannot cross midnight".to_string(),
        ));
    }
    if local_end.time() > config.latest_end {
        return Err(SlotError::InvalidWindow(format!(
            "event must end by {}",
            config.latest_end.format("%H:%M")
        )));
    }

    let weekdays = match draft.days_of_week.as_deref() {
        None | Some([]) => None,
        Some(days) => {
            let set = WeekdaySet::from_days(days)?;
            let first = weekday_of(&local_start);
            if !set.contains(first) {
                return Err(SlotError::InvalidRecurrenceSet(format!(
                    "series starts on {} but repeats on {}",
                    first, set
                )));
            }
            Some(days.to_vec())
        }
    };

    Ok(ValidatedDraft {
        name: name.to_string(),
        candidate: Candidate {
            start: draft.start,
            end: draft.end,
            timezone: draft.timezone,
            weekdays,
        },
    })
}
