//! Tests for the four-case conflict evaluator.

use std::cell::RefCell;

use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Tz;
use slot_engine::{
    check_conflict, Candidate, ConflictCase, Event, EventQuery, EventStore, InMemoryStore,
    RecurrenceRule, SlotError, StoreError, Weekday, WeekdaySet,
};
use uuid::Uuid;

use slot_engine::Weekday::*;

fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

/// One-time UTC event on the given day.
fn one_time(day: (i32, u32, u32), start: (u32, u32), end: (u32, u32)) -> Event {
    Event {
        id: Uuid::new_v4(),
        name: "one-time".to_string(),
        start: utc(day.0, day.1, day.2, start.0, start.1),
        end: utc(day.0, day.1, day.2, end.0, end.1),
        timezone: Tz::UTC,
        recurrence: None,
    }
}

/// Weekly UTC series anchored on the given day.
fn series(day: (i32, u32, u32), start: (u32, u32), end: (u32, u32), days: &[Weekday]) -> Event {
    Event {
        recurrence: Some(RecurrenceRule::new(days).unwrap()),
        name: "series".to_string(),
        ..one_time(day, start, end)
    }
}

fn candidate(day: (i32, u32, u32), start: (u32, u32), end: (u32, u32)) -> Candidate {
    Candidate::one_time(
        utc(day.0, day.1, day.2, start.0, start.1),
        utc(day.0, day.1, day.2, end.0, end.1),
        Tz::UTC,
    )
}

fn weekly(day: (i32, u32, u32), start: (u32, u32), end: (u32, u32), days: &[Weekday]) -> Candidate {
    Candidate {
        weekdays: Some(days.to_vec()),
        ..candidate(day, start, end)
    }
}

/// Store that always fails.
struct DownStore;

impl EventStore for DownStore {
    fn query(&self, _: &EventQuery) -> Result<Vec<Event>, StoreError> {
        Err("connection refused".into())
    }
}

/// Store that records the queries it receives.
struct RecordingStore {
    inner: InMemoryStore,
    seen: RefCell<Vec<EventQuery>>,
}

impl EventStore for RecordingStore {
    fn query(&self, query: &EventQuery) -> Result<Vec<Event>, StoreError> {
        self.seen.borrow_mut().push(*query);
        self.inner.query(query)
    }
}

// 2024-04-01 is a Monday.
const MON: (i32, u32, u32) = (2024, 4, 1);
const WED: (i32, u32, u32) = (2024, 4, 3);

// ─────────────────────────────────────────────────────────────────────────────
// Anchor × Anchor
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn anchor_overlap_detected() {
    let existing = one_time(MON, (9, 0), (10, 0));
    let id = existing.id;
    let store: InMemoryStore = [existing].into_iter().collect();

    let result = check_conflict(&store, &candidate(MON, (9, 30), (10, 30))).unwrap();

    assert!(result.conflict);
    assert_eq!(result.case, ConflictCase::AnchorAnchor);
    assert_eq!(result.conflicting_event, Some(id));
}

#[test]
fn adjacent_anchor_not_a_conflict() {
    let store: InMemoryStore = [one_time(MON, (9, 0), (10, 0))].into_iter().collect();

    let result = check_conflict(&store, &candidate(MON, (10, 0), (11, 0))).unwrap();

    assert!(!result.conflict, "starting exactly at the other's end is free");
    assert_eq!(result.case, ConflictCase::None);
    assert_eq!(result.conflicting_event, None);
}

#[test]
fn contained_and_enclosing_anchors_conflict() {
    let store: InMemoryStore = [one_time(MON, (9, 0), (12, 0))].into_iter().collect();

    assert!(check_conflict(&store, &candidate(MON, (10, 0), (11, 0))).unwrap().conflict);
    assert!(check_conflict(&store, &candidate(MON, (8, 0), (13, 0))).unwrap().conflict);
    assert!(check_conflict(&store, &candidate(MON, (9, 0), (9, 15))).unwrap().conflict);
}

#[test]
fn same_time_on_another_date_is_free_for_one_time_events() {
    let store: InMemoryStore = [one_time(MON, (9, 0), (10, 0))].into_iter().collect();

    let result = check_conflict(&store, &candidate((2024, 4, 8), (9, 0), (10, 0))).unwrap();

    assert!(!result.conflict);
}

// ─────────────────────────────────────────────────────────────────────────────
// Anchor × Recurrence
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn anchor_on_series_weekday_conflicts() {
    let store: InMemoryStore = [series(MON, (9, 0), (10, 0), &[Monday])]
        .into_iter()
        .collect();

    let result = check_conflict(&store, &candidate((2024, 4, 8), (9, 30), (10, 30))).unwrap();

    assert!(result.conflict);
    assert_eq!(result.case, ConflictCase::AnchorRecurrence);
}

#[test]
fn anchor_before_series_begins_is_free() {
    let store: InMemoryStore = [series(MON, (9, 0), (10, 0), &[Monday])]
        .into_iter()
        .collect();

    // 2024-03-25 is the Monday before the series anchor.
    let result = check_conflict(&store, &candidate((2024, 3, 25), (9, 0), (10, 0))).unwrap();

    assert!(!result.conflict, "series has not begun yet");
}

#[test]
fn anchor_on_other_weekday_is_free() {
    let store: InMemoryStore = [series(MON, (9, 0), (10, 0), &[Monday, Wednesday])]
        .into_iter()
        .collect();

    // 2024-04-09 is a Tuesday.
    let result = check_conflict(&store, &candidate((2024, 4, 9), (9, 0), (10, 0))).unwrap();

    assert!(!result.conflict);
}

#[test]
fn anchor_at_different_time_of_day_is_free() {
    let store: InMemoryStore = [series(MON, (9, 0), (10, 0), &[Monday])]
        .into_iter()
        .collect();

    let result = check_conflict(&store, &candidate((2024, 4, 8), (10, 0), (11, 0))).unwrap();

    assert!(!result.conflict);
}

#[test]
fn series_compares_wall_clock_across_dst() {
    // Anchored Monday 2024-01-08 09:00 EST (14:00 UTC).
    let ny = chrono_tz::America::New_York;
    let existing = Event {
        timezone: ny,
        ..series((2024, 1, 8), (14, 0), (15, 0), &[Monday])
    };
    let store: InMemoryStore = [existing].into_iter().collect();

    // Monday 2024-07-08 09:00 EDT is 13:00 UTC.
    let summer = Candidate::one_time(utc(2024, 7, 8, 13, 0), utc(2024, 7, 8, 14, 0), ny);
    let result = check_conflict(&store, &summer).unwrap();

    assert!(result.conflict);
    assert_eq!(result.case, ConflictCase::AnchorRecurrence);
}

// ─────────────────────────────────────────────────────────────────────────────
// Recurrence × Anchor
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn series_hits_later_one_time_event() {
    // Wednesday 2024-04-17, after the candidate series starts.
    let store: InMemoryStore = [one_time((2024, 4, 17), (9, 0), (10, 0))]
        .into_iter()
        .collect();

    let result = check_conflict(
        &store,
        &weekly((2024, 4, 8), (9, 30), (10, 30), &[Monday, Wednesday]),
    )
    .unwrap();

    assert!(result.conflict);
    assert_eq!(result.case, ConflictCase::RecurrenceAnchor);
}

#[test]
fn series_ignores_one_time_event_before_it_starts() {
    let store: InMemoryStore = [one_time(WED, (9, 0), (10, 0))].into_iter().collect();

    let result = check_conflict(
        &store,
        &weekly((2024, 4, 8), (9, 30), (10, 30), &[Monday, Wednesday]),
    )
    .unwrap();

    assert!(!result.conflict);
}

#[test]
fn series_ignores_one_time_event_on_other_weekday() {
    // 2024-04-18 is a Thursday.
    let store: InMemoryStore = [one_time((2024, 4, 18), (9, 0), (10, 0))]
        .into_iter()
        .collect();

    let result = check_conflict(
        &store,
        &weekly((2024, 4, 8), (9, 0), (10, 0), &[Monday, Wednesday]),
    )
    .unwrap();

    assert!(!result.conflict);
}

// ─────────────────────────────────────────────────────────────────────────────
// Recurrence × Recurrence
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn shared_weekday_series_conflict() {
    let a = series(MON, (9, 0), (9, 30), &[Monday, Wednesday]);
    let store: InMemoryStore = [a].into_iter().collect();

    // Anchored on Friday 2024-04-12 so the anchor itself misses series A.
    let b = weekly((2024, 4, 12), (9, 0), (9, 30), &[Wednesday, Friday]);
    let result = check_conflict(&store, &b).unwrap();

    assert!(result.conflict, "both repeat on WEDNESDAY at 09:00");
    assert_eq!(result.case, ConflictCase::RecurrenceRecurrence);
}

#[test]
fn disjoint_weekday_series_are_free() {
    let a = series(MON, (9, 0), (9, 30), &[Monday, Wednesday]);
    let store: InMemoryStore = [a].into_iter().collect();

    // 2024-04-02 is a Tuesday.
    let c = weekly((2024, 4, 2), (9, 0), (9, 30), &[Tuesday, Thursday]);
    let result = check_conflict(&store, &c).unwrap();

    assert!(!result.conflict);
    assert_eq!(result.case, ConflictCase::None);
}

#[test]
fn series_conflict_has_no_date_gate() {
    // Stored series starts a year after the candidate series; they still
    // collide forever once both are running.
    let a = series((2025, 4, 2), (9, 0), (9, 30), &[Wednesday]);
    let store: InMemoryStore = [a].into_iter().collect();

    let b = weekly((2024, 4, 12), (9, 15), (9, 45), &[Wednesday, Friday]);
    let result = check_conflict(&store, &b).unwrap();

    assert_eq!(result.case, ConflictCase::RecurrenceRecurrence);
}

// ─────────────────────────────────────────────────────────────────────────────
// Mixed timezones
// ─────────────────────────────────────────────────────────────────────────────

/// Tokyo series on Mondays 09:00-10:00 JST, anchored 2024-04-01 (00:00 UTC).
fn tokyo_monday_series() -> Event {
    Event {
        timezone: chrono_tz::Asia::Tokyo,
        ..series(MON, (0, 0), (1, 0), &[Monday])
    }
}

#[test]
fn series_in_another_zone_is_compared_by_instant() {
    let store: InMemoryStore = [tokyo_monday_series()].into_iter().collect();
    let ny = chrono_tz::America::New_York;

    // Monday 2024-04-08 09:00 EDT is 22:00 JST: same weekday name, no overlap.
    let monday_morning = Candidate::one_time(utc(2024, 4, 8, 13, 0), utc(2024, 4, 8, 14, 0), ny);
    assert!(!check_conflict(&store, &monday_morning).unwrap().conflict);

    // Sunday 2024-04-07 20:00 EDT is Monday 09:00 JST, exactly an occurrence.
    let sunday_evening = Candidate::one_time(utc(2024, 4, 8, 0, 0), utc(2024, 4, 8, 1, 0), ny);
    let result = check_conflict(&store, &sunday_evening).unwrap();
    assert!(result.conflict);
    assert_eq!(result.case, ConflictCase::AnchorRecurrence);
}

#[test]
fn candidate_series_reads_one_time_event_in_its_own_zone() {
    // Tuesday 2024-04-09 00:00-01:00 UTC is Monday 20:00-21:00 in New York.
    let store: InMemoryStore = [one_time((2024, 4, 9), (0, 0), (1, 0))].into_iter().collect();
    let ny = chrono_tz::America::New_York;

    // Mondays 20:00-21:00 EDT, anchored 2024-04-01.
    let mondays = Candidate::weekly(utc(2024, 4, 2, 0, 0), utc(2024, 4, 2, 1, 0), ny, &[Monday]);
    let result = check_conflict(&store, &mondays).unwrap();
    assert_eq!(result.case, ConflictCase::RecurrenceAnchor);

    let tuesdays = Candidate::weekly(utc(2024, 4, 3, 0, 0), utc(2024, 4, 3, 1, 0), ny, &[Tuesday]);
    assert!(!check_conflict(&store, &tuesdays).unwrap().conflict);
}

#[test]
fn series_in_different_zones_shift_weekdays() {
    let store: InMemoryStore = [tokyo_monday_series()].into_iter().collect();
    let ny = chrono_tz::America::New_York;

    // Sundays 20:00-21:00 EDT line up with Mondays 09:00-10:00 JST. Anchored
    // on Wednesday 2024-04-17 (Thursday morning in Tokyo) so the anchor
    // itself is not the hit.
    let sundays = Candidate::weekly(
        utc(2024, 4, 18, 0, 0),
        utc(2024, 4, 18, 1, 0),
        ny,
        &[Sunday, Wednesday],
    );
    let result = check_conflict(&store, &sundays).unwrap();
    assert!(result.conflict);
    assert_eq!(result.case, ConflictCase::RecurrenceRecurrence);

    // Mondays at the same New York time never meet the Tokyo series.
    let mondays = Candidate::weekly(utc(2024, 4, 16, 0, 0), utc(2024, 4, 16, 1, 0), ny, &[Monday]);
    assert!(!check_conflict(&store, &mondays).unwrap().conflict);
}

#[test]
fn projection_across_midnight_still_overlaps() {
    // Tokyo series on Tuesdays 00:00-01:00 JST, which is Monday 15:00-16:00 UTC.
    let existing = Event {
        timezone: chrono_tz::Asia::Tokyo,
        ..series(MON, (15, 0), (16, 0), &[Tuesday])
    };
    let store: InMemoryStore = [existing].into_iter().collect();

    // Monday 2024-04-08 14:30-15:30 UTC reads as 23:30 Monday to 00:30 Tuesday JST.
    let result = check_conflict(&store, &candidate((2024, 4, 8), (14, 30), (15, 30))).unwrap();
    assert_eq!(result.case, ConflictCase::AnchorRecurrence);
}

// ─────────────────────────────────────────────────────────────────────────────
// Ordering and short-circuit
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn first_matching_case_is_reported() {
    let store: InMemoryStore = [
        series(MON, (9, 0), (10, 0), &[Monday]),
        one_time((2024, 4, 8), (9, 0), (10, 0)),
    ]
    .into_iter()
    .collect();

    let result =
        check_conflict(&store, &weekly((2024, 4, 8), (9, 0), (10, 0), &[Monday])).unwrap();

    assert_eq!(result.case, ConflictCase::AnchorAnchor);
}

#[test]
fn stops_querying_after_first_hit() {
    let store = RecordingStore {
        inner: [one_time(MON, (9, 0), (10, 0))].into_iter().collect(),
        seen: RefCell::new(Vec::new()),
    };

    check_conflict(&store, &weekly(MON, (9, 0), (10, 0), &[Monday, Friday])).unwrap();

    assert_eq!(*store.seen.borrow(), vec![EventQuery::Anchors]);
}

#[test]
fn one_time_candidate_runs_only_first_two_cases() {
    let store = RecordingStore {
        inner: InMemoryStore::new(),
        seen: RefCell::new(Vec::new()),
    };

    let result = check_conflict(&store, &candidate(WED, (9, 0), (10, 0))).unwrap();

    assert!(!result.conflict);
    let seen = store.seen.borrow();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0], EventQuery::Anchors);
    // Wednesday plus the days a stored series in another zone could read it as.
    assert_eq!(
        seen[1],
        EventQuery::SeriesOn(WeekdaySet::from_days(&[Monday, Tuesday, Wednesday, Thursday, Friday]).unwrap())
    );
}

#[test]
fn repeated_checks_are_identical() {
    let store: InMemoryStore = [
        one_time(MON, (9, 0), (10, 0)),
        series(MON, (11, 0), (12, 0), &[Monday, Thursday]),
    ]
    .into_iter()
    .collect();
    let probe = weekly(WED, (11, 30), (12, 30), &[Wednesday, Thursday]);

    let first = check_conflict(&store, &probe).unwrap();
    let second = check_conflict(&store, &probe).unwrap();

    assert_eq!(first, second);
    assert_eq!(first.case, ConflictCase::RecurrenceRecurrence);
}

// ─────────────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn empty_weekday_list_rejected_before_store_is_queried() {
    let result = check_conflict(&DownStore, &weekly(MON, (9, 0), (10, 0), &[]));
    assert!(matches!(result, Err(SlotError::InvalidRecurrenceSet(_))));
}

#[test]
fn duplicate_weekdays_rejected() {
    let result = check_conflict(
        &InMemoryStore::new(),
        &weekly(MON, (9, 0), (10, 0), &[Monday, Tuesday, Monday]),
    );
    assert!(matches!(result, Err(SlotError::InvalidRecurrenceSet(_))));
}

#[test]
fn degenerate_windows_rejected() {
    let store = InMemoryStore::new();

    let zero = candidate(MON, (9, 0), (9, 0));
    assert!(matches!(check_conflict(&store, &zero), Err(SlotError::InvalidWindow(_))));

    let reversed = candidate(MON, (10, 0), (9, 0));
    assert!(matches!(check_conflict(&store, &reversed), Err(SlotError::InvalidWindow(_))));

    let wraps = Candidate::one_time(utc(2024, 4, 1, 23, 0), utc(2024, 4, 2, 1, 0), Tz::UTC);
    assert!(matches!(check_conflict(&DownStore, &wraps), Err(SlotError::InvalidWindow(_))));
}

#[test]
fn store_failure_is_propagated() {
    let err = check_conflict(&DownStore, &candidate(MON, (9, 0), (10, 0))).unwrap_err();

    assert!(matches!(err, SlotError::StoreUnavailable(_)));
    assert!(err.is_retryable());
    assert!(err.to_string().contains("connection refused"));
}
