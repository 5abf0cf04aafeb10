//! Parsing of command-line times, zones and weekday lists.

use anyhow::{bail, Result};
use chrono::offset::LocalResult;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use slot_engine::{SlotError, Weekday};

const LOCAL_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"];

pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.parse::<Tz>()
        .map_err(|_| SlotError::InvalidTimezone(name.to_string()).into())
}

/// Parse an RFC 3339 instant, or a local wall-clock time in `tz`.
///
/// Local times that fall in a DST gap or overlap are rejected rather than
/// guessed.
pub fn parse_instant(raw: &str, tz: Tz) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }

    let Some(naive) = LOCAL_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
    else {
        bail!(
            "'{}' is neither RFC 3339 nor a local YYYY-MM-DDTHH:MM[:SS] time",
            raw
        );
    };

    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(earlier, later) => bail!(
            "'{}' is ambiguous in {} ({} or {}); give an explicit offset",
            raw,
            tz.name(),
            earlier.to_rfc3339(),
            later.to_rfc3339()
        ),
        LocalResult::None => bail!("'{}' does not exist in {} (DST gap)", raw, tz.name()),
    }
}

/// Split a comma-separated weekday list. An empty string yields an empty list.
pub fn parse_days(raw: &str) -> Result<Vec<Weekday>> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| part.parse::<Weekday>().map_err(Into::into))
        .collect()
}
