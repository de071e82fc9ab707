//! Building datums from dynamically typed JSON input.
//!
//! The typed setters on [`Datum`] make most type errors impossible at
//! compile time. Input that arrives as JSON (files, pipes, HTTP bodies) is
//! checked here instead: every field is decoded with the same rules the
//! setters enforce, and anything of the wrong type is rejected with a
//! [`TypeError`] naming the offending value.
//!
//! A datum object has the shape:
//!
//! ```json
//! {
//!   "metric": "cpu.utilization",
//!   "timestamp": 1700000000,
//!   "value": 0.42,
//!   "tags": { "host": "web1" }
//! }
//! ```
//!
//! Every member is optional; unknown members are ignored.

use serde_json::{Map, Value};

use crate::datum::{Datum, TagMap};
use crate::error::{DatumError, Result, TypeError};
use crate::time::{Timestamp, is_valid_time};

/// Decodes a metric name. Only JSON strings are accepted.
///
/// # Errors
///
/// Returns [`TypeError::InvalidMetric`] for any other JSON type.
pub fn metric_from_json(value: &Value) -> std::result::Result<String, TypeError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        other => Err(TypeError::InvalidMetric {
            value: other.to_string(),
        }),
    }
}

/// Decodes a timestamp from a JSON string or non-negative integer.
///
/// # Errors
///
/// Returns [`TypeError::InvalidTimestamp`] if the value has the wrong type or
/// is not a valid time.
pub fn timestamp_from_json(value: &Value) -> std::result::Result<Timestamp, TypeError> {
    let timestamp = match value {
        Value::String(s) => Timestamp::Absolute(s.clone()),
        Value::Number(n) => match n.as_u64() {
            Some(epoch) => Timestamp::Epoch(epoch),
            None => return Err(invalid_time(value)),
        },
        other => {
            return Err(TypeError::InvalidTimestamp {
                value: other.to_string(),
                reason: "must be either a string or numeric",
            });
        }
    };
    if !is_valid_time(&timestamp) {
        return Err(invalid_time(value));
    }
    Ok(timestamp)
}

fn invalid_time(value: &Value) -> TypeError {
    TypeError::InvalidTimestamp {
        value: value.to_string(),
        reason: "must be a valid time",
    }
}

/// Decodes a datum value. Only finite JSON numbers are accepted.
///
/// # Errors
///
/// Returns [`TypeError::InvalidValue`] for any other JSON type.
pub fn value_from_json(value: &Value) -> std::result::Result<f64, TypeError> {
    value
        .as_f64()
        .filter(|v| v.is_finite())
        .ok_or_else(|| TypeError::InvalidValue {
            value: value.to_string(),
        })
}

/// Decodes a tag name, as used for lookups and removal.
///
/// # Errors
///
/// Returns [`TypeError::InvalidTagName`] unless `name` is a JSON string.
pub fn tag_name_from_json(name: &Value) -> std::result::Result<String, TypeError> {
    match name {
        Value::String(s) => Ok(s.clone()),
        other => Err(TypeError::InvalidTagName {
            value: other.to_string(),
        }),
    }
}

/// Decodes a tag name and value. Both must be JSON strings.
///
/// # Errors
///
/// Returns [`TypeError::InvalidTagName`] or [`TypeError::InvalidTagValue`]
/// depending on which argument failed.
pub fn tag_from_json(name: &Value, value: &Value) -> std::result::Result<(String, String), TypeError> {
    let name = tag_name_from_json(name)?;
    match value {
        Value::String(value) => Ok((name, value.clone())),
        other => Err(TypeError::InvalidTagValue {
            tag: name,
            value: other.to_string(),
        }),
    }
}

/// Decodes a JSON object of tag names to tag values, keeping member order.
///
/// # Errors
///
/// Returns [`TypeError::InvalidDatum`] if `value` is not an object, or
/// [`TypeError::InvalidTagValue`] if a member is not a string.
pub fn tags_from_json(value: &Value) -> std::result::Result<TagMap, TypeError> {
    let Value::Object(members) = value else {
        return Err(TypeError::InvalidDatum {
            expected: "tags must be an object of strings",
            value: value.to_string(),
        });
    };
    members
        .iter()
        .map(|(name, value)| tag_from_json(&Value::String(name.clone()), value))
        .collect()
}

/// Fields decoded from a datum object, not yet applied.
#[derive(Debug, Default)]
struct Decoded {
    metric: Option<String>,
    timestamp: Option<Timestamp>,
    value: Option<f64>,
    tags: TagMap,
}

impl Decoded {
    fn from_object(members: &Map<String, Value>) -> std::result::Result<Self, TypeError> {
        Ok(Self {
            metric: members.get("metric").map(metric_from_json).transpose()?,
            timestamp: members.get("timestamp").map(timestamp_from_json).transpose()?,
            value: members.get("value").map(value_from_json).transpose()?,
            tags: members
                .get("tags")
                .map(tags_from_json)
                .transpose()?
                .unwrap_or_default(),
        })
    }
}

impl Datum {
    /// Builds a new datum from a JSON object.
    ///
    /// # Errors
    ///
    /// Returns a [`TypeError`] if `value` is not an object or any member has
    /// the wrong type or format.
    pub fn from_json(value: &Value) -> Result<Self> {
        let mut datum = Self::new();
        datum.apply_json(value)?;
        Ok(datum)
    }

    /// Applies the members of a JSON object on top of this datum.
    ///
    /// Present members overwrite the current field; tags are merged in. The
    /// whole object is decoded before anything is stored, so on error the
    /// datum is unchanged.
    ///
    /// # Errors
    ///
    /// Same as [`Datum::from_json`].
    pub fn apply_json(&mut self, value: &Value) -> Result<&mut Self> {
        let Value::Object(members) = value else {
            tracing::debug!(%value, "rejected non-object datum");
            return Err(TypeError::InvalidDatum {
                expected: "datum must be a JSON object",
                value: value.to_string(),
            }
            .into());
        };
        let decoded = Decoded::from_object(members).inspect_err(|e| {
            tracing::debug!(error = %e, "rejected datum member");
        })?;

        if let Some(metric) = decoded.metric {
            self.set_metric(metric);
        }
        if let Some(timestamp) = decoded.timestamp {
            self.set_timestamp(timestamp)?;
        }
        if let Some(value) = decoded.value {
            self.set_value(value)?;
        }
        for (name, value) in decoded.tags {
            self.set_tag(name, value);
        }
        Ok(self)
    }
}

impl TryFrom<Value> for Datum {
    type Error = DatumError;

    fn try_from(value: Value) -> Result<Self> {
        Self::from_json(&value)
    }
}

impl TryFrom<&Value> for Datum {
    type Error = DatumError;

    fn try_from(value: &Value) -> Result<Self> {
        Self::from_json(value)
    }
}
