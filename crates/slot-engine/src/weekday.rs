//! The closed seven-day weekday domain and a compact set over it.
//!
//! Recurrence days are stored and compared as real set members. A
//! [`WeekdaySet`] is a 7-bit mask, so membership and intersection are single
//! bitwise operations and there is no textual encoding to mis-match.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SlotError};

/// A day of the week, Monday first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    /// All seven days in canonical order.
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    /// 0 for Monday through 6 for Sunday.
    pub fn day_number(self) -> u8 {
        self as u8
    }

    pub fn from_day_number(n: u8) -> Option<Weekday> {
        Self::ALL.get(usize::from(n)).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            Weekday::Monday => "MONDAY",
            Weekday::Tuesday => "TUESDAY",
            Weekday::Wednesday => "WEDNESDAY",
            Weekday::Thursday => "THURSDAY",
            Weekday::Friday => "FRIDAY",
            Weekday::Saturday => "SATURDAY",
            Weekday::Sunday => "SUNDAY",
        }
    }

    fn bit(self) -> u8 {
        1 << self.day_number()
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Weekday {
    type Err = SlotError;

    /// Accepts full names or three-letter abbreviations, any case.
    fn from_str(s: &str) -> Result<Self> {
        let upper = s.trim().to_ascii_uppercase();
        Weekday::ALL
            .into_iter()
            .find(|day| day.name() == upper || day.name()[..3] == upper)
            .ok_or_else(|| SlotError::InvalidRecurrenceSet(format!("unknown weekday '{}'", s)))
    }
}

impl From<chrono::Weekday> for Weekday {
    fn from(day: chrono::Weekday) -> Self {
        match day {
            chrono::Weekday::Mon => Weekday::Monday,
            chrono::Weekday::Tue => Weekday::Tuesday,
            chrono::Weekday::Wed => Weekday::Wednesday,
            chrono::Weekday::Thu => Weekday::Thursday,
            chrono::Weekday::Fri => Weekday::Friday,
            chrono::Weekday::Sat => Weekday::Saturday,
            chrono::Weekday::Sun => Weekday::Sunday,
        }
    }
}

impl From<Weekday> for chrono::Weekday {
    fn from(day: Weekday) -> Self {
        match day {
            Weekday::Monday => chrono::Weekday::Mon,
            Weekday::Tuesday => chrono::Weekday::Tue,
            Weekday::Wednesday => chrono::Weekday::Wed,
            Weekday::Thursday => chrono::Weekday::Thu,
            Weekday::Friday => chrono::Weekday::Fri,
            Weekday::Saturday => chrono::Weekday::Sat,
            Weekday::Sunday => chrono::Weekday::Sun,
        }
    }
}

/// A set of weekdays.
///
/// The empty set is representable (it is what the intersection of two
/// disjoint sets produces) but is never accepted as a recurrence: see
/// [`WeekdaySet::from_days`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "Vec<Weekday>", from = "Vec<Weekday>")]
pub struct WeekdaySet(u8);

impl WeekdaySet {
    pub const EMPTY: WeekdaySet = WeekdaySet(0);

    /// Build a recurrence set from a caller-supplied list.
    ///
    /// # Errors
    /// Returns `SlotError::InvalidRecurrenceSet` if `days` is empty or names
    /// the same weekday twice.
    pub fn from_days(days: &[Weekday]) -> Result<Self> {
        if days.is_empty() {
            return Err(SlotError::InvalidRecurrenceSet(
                "weekday set is empty; omit it for a one-time event".to_string(),
            ));
        }
        let mut set = WeekdaySet::EMPTY;
        for &day in days {
            if !set.insert(day) {
                return Err(SlotError::InvalidRecurrenceSet(format!(
                    "duplicate weekday {}",
                    day
                )));
            }
        }
        Ok(set)
    }

    pub fn single(day: Weekday) -> Self {
        WeekdaySet(day.bit())
    }

    /// Adds `day`, returning `false` if it was already present.
    pub fn insert(&mut self, day: Weekday) -> bool {
        let present = self.contains(day);
        self.0 |= day.bit();
        !present
    }

    pub fn contains(self, day: Weekday) -> bool {
        self.0 & day.bit() != 0
    }

    pub fn intersects(self, other: WeekdaySet) -> bool {
        self.0 & other.0 != 0
    }

    pub fn intersection(self, other: WeekdaySet) -> WeekdaySet {
        WeekdaySet(self.0 & other.0)
    }

    pub fn union(self, other: WeekdaySet) -> WeekdaySet {
        WeekdaySet(self.0 | other.0)
    }

    /// Every member moved `days` forward, wrapping Sunday into Monday.
    /// Negative `days` moves backward.
    pub fn shifted(self, days: i64) -> WeekdaySet {
        let n = days.rem_euclid(7) as u32;
        let bits = u16::from(self.0);
        WeekdaySet((((bits << n) | (bits >> (7 - n))) & 0x7f) as u8)
    }

    /// Members plus every day up to `radius` days before or after one.
    pub fn widened(self, radius: i64) -> WeekdaySet {
        (-radius..=radius).fold(WeekdaySet::EMPTY, |acc, k| acc.union(self.shifted(k)))
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Members in Monday-first order.
    pub fn iter(self) -> impl Iterator<Item = Weekday> {
        Weekday::ALL.into_iter().filter(move |day| self.contains(*day))
    }
}

impl FromIterator<Weekday> for WeekdaySet {
    fn from_iter<I: IntoIterator<Item = Weekday>>(iter: I) -> Self {
        let mut set = WeekdaySet::EMPTY;
        for day in iter {
            set.insert(day);
        }
        set
    }
}

impl From<WeekdaySet> for Vec<Weekday> {
    fn from(set: WeekdaySet) -> Self {
        set.iter().collect()
    }
}

impl From<Vec<Weekday>> for WeekdaySet {
    fn from(days: Vec<Weekday>) -> Self {
        days.into_iter().collect()
    }
}

impl fmt::Display for WeekdaySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(Weekday::name).collect();
        write!(f, "{{{}}}", names.join(", "))
    }
}
