//! Error types for slot-engine operations.

use thiserror::Error;
use uuid::Uuid;

use crate::conflict::ConflictCase;
use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum SlotError {
    /// The window is empty, reversed, or wraps past midnight in local time.
    #[error("Invalid window: {0}")]
    InvalidWindow(String),

    /// A weekday list was given but is empty or repeats a day.
    #[error("Invalid recurrence set: {0}")]
    InvalidRecurrenceSet(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid event: {0}")]
    InvalidEvent(String),

    /// The requested slot collides with a stored event.
    #[error("Time slot conflict with existing event{} ({})", event_label(.event), .case)]
    SlotTaken {
        case: ConflictCase,
        event: Option<Uuid>,
    },

    /// Passed through from the store untouched.
    #[error("Event store unavailable: {0}")]
    StoreUnavailable(#[source] StoreError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl SlotError {
    /// Whether the same call may succeed if retried later.
    ///
    /// Only store failures are transient; everything else is a property of
    /// the input and will fail the same way again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SlotError::StoreUnavailable(_))
    }
}

fn event_label(event: &Option<Uuid>) -> String {
    event.map(|id| format!(" {}", id)).unwrap_or_default()
}

pub type Result<T> = std::result::Result<T, SlotError>;
