//! Domain error types.
//!
//! These errors represent validation failures in timetable data. They are
//! distinct from provider and storage errors.

use super::day_type::InvalidDayType;
use super::time::TimeError;

/// Domain-level errors for validation and data consistency.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// A stop-time entry does not parse as a clock time
    #[error("malformed schedule data: {0}")]
    MalformedTime(#[from] TimeError),

    /// A trip must visit at least two stops
    #[error("stop sequence needs at least two stops, got {0}")]
    SequenceTooShort(usize),

    /// A stop name may appear only once per sequence
    #[error("stop {0:?} appears more than once in the sequence")]
    DuplicateStop(String),

    /// Unknown day type label
    #[error(transparent)]
    InvalidDayType(#[from] InvalidDayType),
}
