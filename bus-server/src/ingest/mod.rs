//! Discovering trips from the external directions provider.
//!
//! Discovered trips expire a fixed time after they were last returned by
//! the provider; curated trips never do.

mod config;
mod ingestor;

pub use config::{DEFAULT_TTL_DAYS, IngestConfig};
pub use ingestor::{ExternalScheduleIngestor, IngestReport};
