//! Validation errors raised by the planning core

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Rejections for values that break a core invariant
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// A route event would leave before it arrives
    #[error("departure {departure} precedes arrival {arrival}")]
    DepartureBeforeArrival {
        arrival: DateTime<Utc>,
        departure: DateTime<Utc>,
    },

    /// A timestamp string could not be read as RFC 3339 or a naive datetime
    #[error("invalid timestamp '{0}'")]
    InvalidTimestamp(String),

    /// A duty interval bound is not a `HH:MM` wall-clock time
    #[error("invalid clock time '{0}', expected HH:MM")]
    InvalidClockTime(String),

    /// A UTC offset outside of +/- 24h
    #[error("UTC offset of {0} minutes is out of range")]
    InvalidUtcOffset(i32),

    /// A planning rule that would stop the driver from making progress
    #[error("invalid HOS rule {field}: {reason}")]
    InvalidRules { field: &'static str, reason: String },

    /// Forced stops kept landing on the same spot
    #[error("route planning stalled with {remaining_miles:.1} mi left on the leg")]
    StalledLeg { remaining_miles: f64 },
}
