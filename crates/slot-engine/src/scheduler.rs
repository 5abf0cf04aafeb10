//! Event-creation service: validate, check for conflicts, then store.

use uuid::Uuid;

use crate::config::SchedulerConfig;
use crate::conflict::{check_conflict, Candidate, ConflictResult};
use crate::error::{Result, SlotError};
use crate::model::{Event, RecurrenceRule};
use crate::store::EventRepository;
use crate::validation::{validate_draft, EventDraft};

/// Default page size for [`Scheduler::list_events`].
pub const DEFAULT_PAGE_LIMIT: usize = 100;

/// Owns a repository and books events into it.
///
/// [`Scheduler::create_event`] takes `&mut self`, so the conflict check and
/// the insert that follows it cannot interleave with another booking on the
/// same scheduler. To share one across threads, put the whole scheduler
/// behind a `Mutex`; locking only the repository would reopen the gap.
#[derive(Debug)]
pub struct Scheduler<R> {
    repository: R,
    config: SchedulerConfig,
}

impl<R: EventRepository> Scheduler<R> {
    pub fn new(repository: R, config: SchedulerConfig) -> Self {
        Scheduler { repository, config }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn into_repository(self) -> R {
        self.repository
    }

    /// Check a candidate without booking it.
    ///
    /// # Errors
    /// See [`check_conflict`].
    pub fn check(&self, candidate: &Candidate) -> Result<ConflictResult> {
        check_conflict(&self.repository, candidate)
    }

    /// Validate `draft`, reject it if the slot is taken, otherwise store it.
    ///
    /// # Errors
    /// - Validation errors from [`validate_draft`].
    /// - `SlotError::SlotTaken` if the slot conflicts with a stored event.
    /// - `SlotError::StoreUnavailable` if the repository fails.
    pub fn create_event(&mut self, draft: EventDraft) -> Result<Event> {
        let valid = validate_draft(&draft, &self.config.validation)?;

        let result = check_conflict(&self.repository, &valid.candidate)?;
        ensure_free(&valid.name, &result)?;

        let recurrence = valid
            .candidate
            .weekdays
            .as_deref()
            .map(RecurrenceRule::new)
            .transpose()?;
        let event = Event {
            id: Uuid::new_v4(),
            name: valid.name,
            start: valid.candidate.start,
            end: valid.candidate.end,
            timezone: valid.candidate.timezone,
            recurrence,
        };

        self.repository
            .insert(event.clone())
            .map_err(SlotError::StoreUnavailable)?;
        tracing::info!(
            id = %event.id,
            name = %event.name,
            recurring = event.is_recurring(),
            "Created event"
        );
        Ok(event)
    }

    /// # Errors
    /// Returns `SlotError::StoreUnavailable` if the repository fails.
    pub fn get_event(&self, id: Uuid) -> Result<Option<Event>> {
        self.repository.get(id).map_err(SlotError::StoreUnavailable)
    }

    /// # Errors
    /// Returns `SlotError::StoreUnavailable` if the repository fails.
    pub fn list_events(&self, skip: usize, limit: usize) -> Result<Vec<Event>> {
        self.repository
            .list(skip, limit)
            .map_err(SlotError::StoreUnavailable)
    }
}

fn ensure_free(name: &str, result: &ConflictResult) -> Result<()> {
    if !result.conflict {
        return Ok(());
    }
    tracing::warn!(
        name = %name,
        case = %result.case,
        existing = ?result.conflicting_event,
        "Time slot conflict with existing event"
    );
    Err(SlotError::SlotTaken {
        case: result.case,
        event: result.conflicting_event,
    })
}
