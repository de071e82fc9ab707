//! # tsdatum
//!
//! Builder and line-protocol serializer for single OpenTSDB data points.
//!
//! tsdatum builds one metric observation at a time, validating each field as
//! it is set, and serializes it into the space-delimited line format accepted
//! by a time-series ingestion endpoint. Sending the lines anywhere is left to
//! the caller.
//!
//! ## Key Properties
//!
//! - Invalid input is rejected at the setter, so a datum never holds bad state
//! - Serialization is read-only; one datum can produce a stream of lines
//! - Tags serialize in insertion order
//! - Two error kinds: type errors from setters, validation errors from serialization
//!
//! ## Quick Start
//!
//! ```rust
//! use tsdatum::{Datum, Timestamp};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut datum = Datum::new();
//! datum
//!     .set_metric("cpu.utilization")
//!     .set_tag("beep", "boop")
//!     .set_tag("foo", "bar");
//!
//! // Reuse the same datum as a line factory.
//! let mut lines = Vec::new();
//! for i in 0..3u32 {
//!     datum
//!         .set_timestamp(Timestamp::now_millis())?
//!         .set_value(f64::from(i))?;
//!     lines.push(datum.to_line()?);
//! }
//! println!("{}", lines.join("\n"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`datum`] - The [`Datum`] builder and line serialization
//! - [`time`] - [`Timestamp`] and the time-format predicate
//! - [`json`] - Building datums from dynamically typed JSON
//! - [`error`] - Error types

pub mod datum;
pub mod error;
pub mod json;
pub mod time;

// Re-export primary API types at crate root for convenience.
pub use datum::{Datum, Line, TagMap};
pub use error::{DatumError, Result, TypeError, ValidationError};
pub use time::Timestamp;
