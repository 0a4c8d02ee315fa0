//! Domain types for the bus schedule server.
//!
//! This module contains the core domain model types that represent
//! validated timetable data. All types enforce their invariants at
//! construction time, so code that receives these types can trust their
//! validity.

mod day_type;
mod error;
mod stop;
mod time;
mod trip;

pub use day_type::{DayType, InvalidDayType};
pub use error::DomainError;
pub use stop::{Stop, StopId, StopSource};
pub use time::{ClockTime, TimeError};
pub use trip::{
    DedupKey, RawStopTime, SequenceBuilder, StopSequence, StopTime, Trip, TripDraft, TripId,
    TripKind, TripRecord, Vote, Votes,
};
