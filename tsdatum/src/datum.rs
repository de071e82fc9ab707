//! The datum builder and its line-protocol serialization.
//!
//! A [`Datum`] holds one metric observation: a metric name, a timestamp, a
//! value and a set of tags. Fields are populated through chainable setters,
//! each of which validates its input before storing it, and the datum is
//! serialized on demand with [`Datum::to_line`].
//!
//! # Line format
//!
//! ```text
//! <metric> <timestamp> <value> <tagk1>=<tagv1> ... <tagkN>=<tagvN>
//! ```
//!
//! Fields are separated by single spaces and tags appear in the order they
//! were first inserted.
//!
//! # Example
//!
//! ```rust
//! use tsdatum::Datum;
//!
//! # fn main() -> tsdatum::Result<()> {
//! let mut datum = Datum::new();
//! datum
//!     .set_metric("cpu.utilization")
//!     .set_timestamp(1_700_000_000u64)?
//!     .set_value(0.42)?
//!     .set_tag("beep", "boop")
//!     .set_tag("foo", "bar");
//!
//! assert_eq!(
//!     datum.to_line()?,
//!     "cpu.utilization 1700000000 0.42 beep=boop foo=bar"
//! );
//! # Ok(())
//! # }
//! ```
//!
//! Serialization does not consume or reset anything, so one datum can act as
//! a line factory: re-timestamp, re-value, serialize, repeat.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TypeError, ValidationError};
use crate::time::{Timestamp, is_valid_time};

/// Tag name to tag value mapping, iterated in insertion order.
pub type TagMap = IndexMap<String, String>;

/// A single metric data point under construction.
///
/// A new datum has no metric, timestamp or value and an empty tag set. Each
/// setter either stores a validated value or fails without touching any
/// state.
///
/// # Thread Safety
///
/// A datum is a plain value. Setters take `&mut self`, so concurrent
/// mutation of one instance needs external synchronization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "serde_json::Value")]
pub struct Datum {
    #[serde(skip_serializing_if = "Option::is_none")]
    metric: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<f64>,
    tags: TagMap,
}

impl Datum {
    /// Creates an empty datum.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the metric name, if one has been set.
    pub fn metric(&self) -> Option<&str> {
        self.metric.as_deref()
    }

    /// Sets the metric name, e.g. `cpu.utilization`.
    pub fn set_metric(&mut self, name: impl Into<String>) -> &mut Self {
        self.metric = Some(name.into());
        self
    }

    /// Returns the timestamp, if one has been set.
    pub fn timestamp(&self) -> Option<&Timestamp> {
        self.timestamp.as_ref()
    }

    /// Sets the timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`TypeError::InvalidTimestamp`] if the timestamp is not a valid
    /// time representation (see [`crate::time`]).
    pub fn set_timestamp(&mut self, timestamp: impl Into<Timestamp>) -> Result<&mut Self> {
        let timestamp = timestamp.into();
        if !is_valid_time(&timestamp) {
            tracing::debug!(%timestamp, "rejected timestamp");
            return Err(TypeError::InvalidTimestamp {
                value: timestamp.to_string(),
                reason: "must be a valid time",
            }
            .into());
        }
        self.timestamp = Some(timestamp);
        Ok(self)
    }

    /// Returns the value, if one has been set.
    pub fn value(&self) -> Option<f64> {
        self.value
    }

    /// Sets the value.
    ///
    /// # Errors
    ///
    /// Returns [`TypeError::InvalidValue`] if `value` is NaN or infinite.
    pub fn set_value(&mut self, value: f64) -> Result<&mut Self> {
        if !value.is_finite() {
            tracing::debug!(value, "rejected value");
            return Err(TypeError::InvalidValue {
                value: value.to_string(),
            }
            .into());
        }
        self.value = Some(value);
        Ok(self)
    }

    /// Returns a copy of all tags.
    ///
    /// The returned map is independent of the datum; changing it has no
    /// effect on later calls.
    pub fn tags(&self) -> TagMap {
        self.tags.clone()
    }

    /// Returns the value of a single tag, or `None` if it was never set.
    pub fn tag(&self, name: &str) -> Option<&str> {
        self.tags.get(name).map(String::as_str)
    }

    /// Sets a tag, overwriting any previous value for the same name.
    ///
    /// An overwritten tag keeps its original position in the line.
    pub fn set_tag(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.tags.insert(name.into(), value.into());
        self
    }

    /// Removes a tag. Removing a tag that was never set is a no-op.
    pub fn remove_tag(&mut self, name: &str) -> &mut Self {
        self.tags.shift_remove(name);
        self
    }

    /// Removes all tags.
    pub fn clear_tags(&mut self) -> &mut Self {
        self.tags.clear();
        self
    }

    /// Returns the number of tags.
    pub fn tag_count(&self) -> usize {
        self.tags.len()
    }

    /// Returns `true` if at least one tag is set.
    pub fn has_tags(&self) -> bool {
        !self.tags.is_empty()
    }

    /// Validates the datum and returns a displayable view of its line.
    ///
    /// # Errors
    ///
    /// Returns the first failing [`ValidationError`], checking metric,
    /// timestamp, value and tags in that order.
    pub fn line(&self) -> Result<Line<'_>> {
        let metric = match self.metric.as_deref() {
            Some(metric) if !metric.is_empty() => metric,
            _ => return Err(ValidationError::MissingMetric.into()),
        };
        let timestamp = self
            .timestamp
            .as_ref()
            .ok_or(ValidationError::MissingTimestamp)?;
        let value = self.value.ok_or(ValidationError::MissingValue)?;
        if self.tags.is_empty() {
            return Err(ValidationError::MissingTags.into());
        }
        Ok(Line {
            metric,
            timestamp,
            value,
            tags: &self.tags,
        })
    }

    /// Serializes the datum to a line.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the metric, timestamp, value or tags
    /// are missing.
    pub fn to_line(&self) -> Result<String> {
        let line = self.line()?.to_string();
        tracing::trace!(%line, "serialized datum");
        Ok(line)
    }

    /// Appends the serialized line to `buf` without a trailing newline.
    ///
    /// `buf` is left untouched on error.
    ///
    /// # Errors
    ///
    /// Same as [`Datum::to_line`].
    pub fn write_line(&self, buf: &mut String) -> Result<()> {
        let line = self.line()?.to_string();
        buf.push_str(&line);
        Ok(())
    }
}

/// A validated view of a datum, rendered by its `Display` impl.
///
/// Obtained from [`Datum::line`].
#[derive(Debug, Clone, Copy)]
pub struct Line<'a> {
    metric: &'a str,
    timestamp: &'a Timestamp,
    value: f64,
    tags: &'a TagMap,
}

impl fmt::Display for Line<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // -0 renders as 0.
        let value = if self.value == 0.0 { 0.0 } else { self.value };
        write!(f, "{} {} {}", self.metric, self.timestamp, value)?;
        for (name, value) in self.tags {
            write!(f, " {name}={value}")?;
        }
        Ok(())
    }
}
