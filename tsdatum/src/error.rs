//! Error types for datum construction and serialization.

use thiserror::Error;

/// The main error type for all datum operations.
///
/// Setters fail with [`DatumError::Type`] when an argument has the wrong type
/// or format. Serialization fails with [`DatumError::Validation`] when the
/// datum is incomplete. A failed operation never mutates the datum.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DatumError {
    /// An argument had the wrong type or an unacceptable format.
    #[error("type error: {0}")]
    Type(#[from] TypeError),

    /// The datum is missing state required for serialization.
    #[error("invalid datum: {0}")]
    Validation(#[from] ValidationError),
}

impl DatumError {
    /// Returns `true` if this error was raised by a setter or getter argument check.
    pub fn is_type(&self) -> bool {
        matches!(self, Self::Type(_))
    }

    /// Returns `true` if this error was raised by an incomplete datum at serialization time.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// Errors raised when an argument fails a type or format check.
///
/// Every variant carries the offending value rendered as text.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TypeError {
    /// The metric name is not a string.
    #[error("metric name must be a string. Value: `{value}`")]
    InvalidMetric {
        /// The rejected value.
        value: String,
    },

    /// The timestamp is neither a string nor a number, or is not a valid time.
    #[error("timestamp {reason}. Value: `{value}`")]
    InvalidTimestamp {
        /// The rejected value.
        value: String,
        /// What the timestamp was expected to be.
        reason: &'static str,
    },

    /// The datum value is not a finite number.
    #[error("value must be a finite number. Value: `{value}`")]
    InvalidValue {
        /// The rejected value.
        value: String,
    },

    /// A tag name is not a string.
    #[error("tag name must be a string. Value: `{value}`")]
    InvalidTagName {
        /// The rejected value.
        value: String,
    },

    /// A tag value is not a string.
    #[error("tag value for `{tag}` must be a string. Value: `{value}`")]
    InvalidTagValue {
        /// The tag whose value was rejected.
        tag: String,
        /// The rejected value.
        value: String,
    },

    /// A dynamically typed datum or tag set had the wrong shape.
    #[error("{expected}. Value: `{value}`")]
    InvalidDatum {
        /// Description of the expected shape.
        expected: &'static str,
        /// The rejected value.
        value: String,
    },
}

/// Errors raised when serializing an incomplete datum.
///
/// Checks run in declaration order; the first missing field is reported.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    /// No metric name was assigned.
    #[error("datum must be assigned a `metric` name")]
    MissingMetric,

    /// No timestamp was assigned.
    #[error("datum must be assigned a `timestamp`")]
    MissingTimestamp,

    /// No value was assigned.
    #[error("datum must be assigned a `value`")]
    MissingValue,

    /// The tag set is empty.
    #[error("datum must have at least one `tag`")]
    MissingTags,
}

/// Type alias for `Result<T, DatumError>`.
pub type Result<T> = std::result::Result<T, DatumError>;
