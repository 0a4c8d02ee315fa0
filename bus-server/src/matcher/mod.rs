//! Trip matching.
//!
//! Answers "which buses go from here to there": containment search over the
//! trip store, then direction, day and start-time filters, sorted by the
//! time at the origin stop.

mod config;
mod exceptions;
mod search;

pub use config::MatcherConfig;
pub use exceptions::restore_diacritics;
pub use search::{MatchError, MatchQuery, MatchedTrip, TripMatcher};
