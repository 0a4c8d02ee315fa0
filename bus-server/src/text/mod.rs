//! Text comparison for stop names.
//!
//! Stored names keep their diacritics; every comparison in the crate goes
//! through [`normalize`] first.

mod normalize;
mod resolve;
mod similarity;

pub use normalize::normalize;
pub use resolve::{Group, MatchMethod, Resolution, ResolverConfig, StopResolver};
pub use similarity::{STOP_WORDS, SequenceMatcher, similarity};
