//! Timestamps and the time-format predicate.
//!
//! A datum timestamp is either a numeric Unix epoch value or a time string.
//! [`is_valid_time`] decides whether a timestamp is acceptable to the
//! ingestion endpoint; the datum only ever calls it as a predicate.
//!
//! # Accepted forms
//!
//! - Epoch values with at most 13 digits (seconds or milliseconds precision)
//! - Absolute times: `yyyy/MM/dd`, `yyyy/MM/dd-HH:mm`, `yyyy/MM/dd HH:mm`,
//!   `yyyy/MM/dd-HH:mm:ss`, `yyyy/MM/dd HH:mm:ss`
//! - Relative times: `<amount><unit>-ago` where unit is one of
//!   `ms`, `s`, `m`, `h`, `d`, `w`, `n`, `y`
//!
//! ```rust
//! use tsdatum::time::{is_valid_time, Timestamp};
//!
//! assert!(is_valid_time(&Timestamp::from(1_700_000_000u64)));
//! assert!(is_valid_time(&Timestamp::from("2014/07/18 09:45")));
//! assert!(is_valid_time(&Timestamp::from("1h-ago")));
//! assert!(!is_valid_time(&Timestamp::from("5")));
//! ```

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Largest epoch value accepted: 13 digits covers millisecond timestamps.
pub const MAX_EPOCH: u64 = 9_999_999_999_999;

/// Units accepted in relative `<amount><unit>-ago` times.
const RELATIVE_UNITS: [&str; 8] = ["ms", "s", "m", "h", "d", "w", "n", "y"];

/// Absolute layouts as (chrono format, shape, has time of day).
///
/// In a shape, `d` stands for one ASCII digit; every other byte must match
/// literally.
const ABSOLUTE_LAYOUTS: [(&str, &str, bool); 5] = [
    ("%Y/%m/%d", "dddd/dd/dd", false),
    ("%Y/%m/%d-%H:%M", "dddd/dd/dd-dd:dd", true),
    ("%Y/%m/%d %H:%M", "dddd/dd/dd dd:dd", true),
    ("%Y/%m/%d-%H:%M:%S", "dddd/dd/dd-dd:dd:dd", true),
    ("%Y/%m/%d %H:%M:%S", "dddd/dd/dd dd:dd:dd", true),
];

/// A datum timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Timestamp {
    /// Unix epoch time in seconds or milliseconds.
    Epoch(u64),
    /// An absolute or relative time string.
    Absolute(String),
}

impl Timestamp {
    /// Returns the current time as epoch milliseconds.
    pub fn now_millis() -> Self {
        let millis = Utc::now().timestamp_millis();
        Self::Epoch(u64::try_from(millis).unwrap_or_default())
    }

    /// Returns the epoch value, if this is a numeric timestamp.
    pub fn as_epoch(&self) -> Option<u64> {
        match self {
            Self::Epoch(n) => Some(*n),
            Self::Absolute(_) => None,
        }
    }

    /// Returns the time string, if this is a string timestamp.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Epoch(_) => None,
            Self::Absolute(s) => Some(s),
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Epoch(n) => n.fmt(f),
            Self::Absolute(s) => f.write_str(s),
        }
    }
}

impl From<u64> for Timestamp {
    fn from(value: u64) -> Self {
        Self::Epoch(value)
    }
}

impl From<u32> for Timestamp {
    fn from(value: u32) -> Self {
        Self::Epoch(u64::from(value))
    }
}

impl From<String> for Timestamp {
    fn from(value: String) -> Self {
        Self::Absolute(value)
    }
}

impl From<&str> for Timestamp {
    fn from(value: &str) -> Self {
        Self::Absolute(value.to_string())
    }
}

/// Returns `true` if `timestamp` is an acceptable time representation.
pub fn is_valid_time(timestamp: &Timestamp) -> bool {
    match timestamp {
        Timestamp::Epoch(n) => *n <= MAX_EPOCH,
        Timestamp::Absolute(s) => is_absolute_time(s) || is_relative_time(s),
    }
}

fn is_absolute_time(s: &str) -> bool {
    // chrono tolerates signs, padding spaces and short fields, so the shape
    // is checked first and chrono only validates the calendar.
    ABSOLUTE_LAYOUTS
        .iter()
        .filter(|(_, shape, _)| matches_shape(s, shape))
        .any(|(layout, _, has_time)| {
            if *has_time {
                NaiveDateTime::parse_from_str(s, layout).is_ok()
            } else {
                NaiveDate::parse_from_str(s, layout).is_ok()
            }
        })
}

fn matches_shape(s: &str, shape: &str) -> bool {
    s.len() == shape.len()
        && s.bytes().zip(shape.bytes()).all(|(b, expected)| match expected {
            b'd' => b.is_ascii_digit(),
            sep => b == sep,
        })
}

fn is_relative_time(s: &str) -> bool {
    let Some(spec) = s.strip_suffix("-ago") else {
        return false;
    };
    let Some(digits_end) = spec.find(|c: char| !c.is_ascii_digit()) else {
        return false;
    };
    let (amount, unit) = spec.split_at(digits_end);
    if amount.is_empty() || amount.bytes().all(|b| b == b'0') {
        return false;
    }
    RELATIVE_UNITS.contains(&unit)
}
