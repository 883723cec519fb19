//! Date/time resolution for feed records.
//!
//! Two encodings show up in the feed: separate day-first date and `HH:MM`
//! time strings (`10-03-2024` / `14:30`), and a single ISO-like timestamp with
//! a space between date and time (`2024-03-10 14:30:00`). Anything else
//! resolves to [`LastUpdated::Unparseable`], which always sorts last.

use std::cmp::Ordering;
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Serialize, Serializer};

// ---

/// Wall-clock instant of the last upstream update, or the sort-last sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LastUpdated {
    At(NaiveDateTime),
    Unparseable,
}

impl LastUpdated {
    /// Ordering for newest-first lists. The sentinel goes last.
    pub fn newest_first(a: &Self, b: &Self) -> Ordering {
        // ---
        match (a, b) {
            (Self::At(x), Self::At(y)) => y.cmp(x),
            (Self::At(_), Self::Unparseable) => Ordering::Less,
            (Self::Unparseable, Self::At(_)) => Ordering::Greater,
            (Self::Unparseable, Self::Unparseable) => Ordering::Equal,
        }
    }

    /// Ordering for oldest-first lists. The sentinel still goes last.
    pub fn oldest_first(a: &Self, b: &Self) -> Ordering {
        // ---
        match (a, b) {
            (Self::At(x), Self::At(y)) => x.cmp(y),
            _ => Self::newest_first(a, b),
        }
    }
}

/// Table rendering: `DD/MM/YYYY, HH:MM`, or `N/A` for the sentinel.
impl fmt::Display for LastUpdated {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::At(at) => write!(f, "{}", at.format("%d/%m/%Y, %H:%M")),
            Self::Unparseable => f.write_str("N/A"),
        }
    }
}

/// ISO-8601 local date-time, or `null` for the sentinel.
impl Serialize for LastUpdated {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::At(at) => serializer.collect_str(&at.format("%Y-%m-%dT%H:%M:%S")),
            Self::Unparseable => serializer.serialize_none(),
        }
    }
}

/// Resolve from a day-first date and a `HH:MM` time.
///
/// `/` and `-` are accepted interchangeably as date separators.
pub fn from_date_and_time(date: &str, time: &str) -> LastUpdated {
    // ---
    let normalized = date.trim().replace('-', "/");
    let parts: Vec<&str> = normalized.split('/').collect();
    let &[day, month, year] = parts.as_slice() else {
        return LastUpdated::Unparseable;
    };

    let date = match (
        day.parse::<u32>(),
        month.parse::<u32>(),
        year.parse::<i32>(),
    ) {
        (Ok(d), Ok(m), Ok(y)) => NaiveDate::from_ymd_opt(y, m, d),
        _ => None,
    };

    match (date, parse_time(time)) {
        (Some(d), Some(t)) => LastUpdated::At(d.and_time(t)),
        _ => LastUpdated::Unparseable,
    }
}

/// Resolve from a combined `YYYY-MM-DD HH:MM[:SS]` timestamp.
pub fn from_combined(timestamp: &str) -> LastUpdated {
    // ---
    let iso = timestamp.trim().replacen(' ', "T", 1);
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(&iso, fmt).ok())
        .map_or(LastUpdated::Unparseable, LastUpdated::At)
}

fn parse_time(time: &str) -> Option<NaiveTime> {
    // ---
    let mut parts = time.trim().split(':');
    let hour = parts.next()?.parse::<u32>().ok()?;
    let minute = parts.next()?.parse::<u32>().ok()?;
    let second = match parts.next() {
        Some(s) => s.parse::<u32>().ok()?,
        None => 0,
    };
    if parts.next().is_some() {
        return None;
    }
    NaiveTime::from_hms_opt(hour, minute, second)
}
