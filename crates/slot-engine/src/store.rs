//! The event-store seam and an in-memory implementation.
//!
//! The evaluator only needs three kinds of lookup, modelled by
//! [`EventQuery`]. [`InMemoryStore`] answers the weekday-keyed ones from
//! per-weekday inverted indexes instead of scanning every event.

use std::collections::BTreeSet;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::model::Event;
use crate::weekday::{Weekday, WeekdaySet};

/// Failure reported by a store backend. The engine passes it through as
/// [`SlotError::StoreUnavailable`](crate::SlotError::StoreUnavailable).
pub type StoreError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A filter over stored events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventQuery {
    /// Every event without a recurrence rule.
    Anchors,
    /// Events without a recurrence rule whose local start weekday is in the set.
    AnchorsOn(WeekdaySet),
    /// Recurring events whose rule shares at least one weekday with the set.
    SeriesOn(WeekdaySet),
}

impl EventQuery {
    /// Reference semantics. Backends may filter however they like as long as
    /// they return exactly the events for which this holds.
    pub fn matches(&self, event: &Event) -> bool {
        match (self, event.weekdays()) {
            (EventQuery::Anchors, None) => true,
            (EventQuery::AnchorsOn(days), None) => days.contains(event.window().local.weekday),
            (EventQuery::SeriesOn(days), Some(rule)) => days.intersects(rule),
            _ => false,
        }
    }
}

/// Read access used by the conflict evaluator.
pub trait EventStore {
    fn query(&self, query: &EventQuery) -> Result<Vec<Event>, StoreError>;
}

/// Full persistence surface used by the scheduler.
pub trait EventRepository: EventStore {
    fn insert(&mut self, event: Event) -> Result<(), StoreError>;

    fn get(&self, id: Uuid) -> Result<Option<Event>, StoreError>;

    /// Events in insertion order, skipping `skip` and returning at most `limit`.
    fn list(&self, skip: usize, limit: usize) -> Result<Vec<Event>, StoreError>;
}

impl<S: EventStore + ?Sized> EventStore for &S {
    fn query(&self, query: &EventQuery) -> Result<Vec<Event>, StoreError> {
        (**self).query(query)
    }
}

/// Events held in insertion order with per-weekday indexes.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    events: Vec<Event>,
    anchors: Vec<usize>,
    /// Positions of one-time events by local start weekday.
    anchors_by_day: [Vec<usize>; 7],
    /// Positions of recurring events by each weekday in their rule.
    series_by_day: [Vec<usize>; 7],
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Append without any conflict check.
    pub fn push(&mut self, event: Event) {
        let pos = self.events.len();
        match event.weekdays() {
            Some(days) => {
                for day in days.iter() {
                    self.series_by_day[usize::from(day.day_number())].push(pos);
                }
            }
            None => {
                let day = event.window().local.weekday;
                self.anchors.push(pos);
                self.anchors_by_day[usize::from(day.day_number())].push(pos);
            }
        }
        self.events.push(event);
    }

    fn collect(&self, days: WeekdaySet, index: &[Vec<usize>; 7]) -> Vec<Event> {
        // A series listed under several matching days must come back once.
        let positions: BTreeSet<usize> = days
            .iter()
            .flat_map(|day: Weekday| index[usize::from(day.day_number())].iter().copied())
            .collect();
        positions.into_iter().map(|pos| self.events[pos].clone()).collect()
    }
}

impl FromIterator<Event> for InMemoryStore {
    fn from_iter<I: IntoIterator<Item = Event>>(iter: I) -> Self {
        let mut store = InMemoryStore::new();
        for event in iter {
            store.push(event);
        }
        store
    }
}

impl EventStore for InMemoryStore {
    fn query(&self, query: &EventQuery) -> Result<Vec<Event>, StoreError> {
        let found = match *query {
            EventQuery::Anchors => self
                .anchors
                .iter()
                .map(|&pos| self.events[pos].clone())
                .collect(),
            EventQuery::AnchorsOn(days) => self.collect(days, &self.anchors_by_day),
            EventQuery::SeriesOn(days) => self.collect(days, &self.series_by_day),
        };
        Ok(found)
    }
}

impl EventRepository for InMemoryStore {
    fn insert(&mut self, event: Event) -> Result<(), StoreError> {
        if self.events.iter().any(|existing| existing.id == event.id) {
            return Err(format!("duplicate event id {}", event.id).into());
        }
        self.push(event);
        Ok(())
    }

    fn get(&self, id: Uuid) -> Result<Option<Event>, StoreError> {
        Ok(self.events.iter().find(|event| event.id == id).cloned())
    }

    fn list(&self, skip: usize, limit: usize) -> Result<Vec<Event>, StoreError> {
        Ok(self.events.iter().skip(skip).take(limit).cloned().collect())
    }
}

// On disk the store is just the event list; indexes are rebuilt on load.
impl Serialize for InMemoryStore {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.events.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for InMemoryStore {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let events = Vec::<Event>::deserialize(deserializer)?;
        Ok(events.into_iter().collect())
    }
}
