//! # slot-engine
//!
//! Conflict detection for calendar events that happen once or repeat weekly.
//!
//! Given a proposed event (start, end, timezone and optionally the weekdays it
//! repeats on) the engine decides whether it collides with anything in an
//! event store, and reports which kind of comparison found the collision.
//!
//! ## Modules
//!
//! - [`window`] — start/end instants → local time-of-day range and weekday
//! - [`conflict`] — the overlap predicate and the four-case evaluator
//! - [`weekday`] — the seven-day domain and a bit set over it
//! - [`model`] — stored events and their recurrence rules
//! - [`store`] — the store seam and an indexed in-memory store
//! - [`validation`] — upstream checks on a draft event
//! - [`scheduler`] — validate, check and insert as one operation
//! - [`config`] — TOML configuration
//! - [`error`] — Error types

pub mod config;
pub mod conflict;
pub mod error;
pub mod model;
pub mod scheduler;
pub mod store;
pub mod validation;
pub mod weekday;
pub mod window;

pub use config::SchedulerConfig;
pub use conflict::{check_conflict, overlaps, Candidate, ConflictCase, ConflictResult};
pub use error::SlotError;
pub use model::{Event, RecurrenceRule};
pub use scheduler::Scheduler;
pub use store::{EventQuery, EventRepository, EventStore, InMemoryStore, StoreError};
pub use validation::{validate_draft, EventDraft};
pub use weekday::{Weekday, WeekdaySet};
pub use window::{normalize, EventWindow, NormalizedWindow, TimeOfDayRange};
