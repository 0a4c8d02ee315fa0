//! JSON snapshot of the stores on disk.
//!
//! The same file format doubles as the seed for curated timetables: a
//! hand-written snapshot with only `stops`, `trips` and `holidays` loads
//! fine. Trips are validated one at a time so a single bad timetable entry
//! does not reject the whole file.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::{Stop, Trip, TripRecord};
use crate::text::Group;

use super::error::StoreError;

/// Contents of the stores at a point in time.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Snapshot {
    /// Unix timestamp when the snapshot was taken.
    pub saved_at_secs: u64,
    pub stops: Vec<Stop>,
    pub trips: Vec<Trip>,
    pub holidays: Vec<NaiveDate>,
    pub groups: Vec<Group>,
}

/// On-disk form; trips are kept raw until validated.
#[derive(Debug, Deserialize)]
struct SnapshotRecord {
    #[serde(default)]
    saved_at_secs: u64,
    #[serde(default)]
    stops: Vec<Stop>,
    #[serde(default)]
    trips: Vec<TripRecord>,
    #[serde(default)]
    holidays: Vec<NaiveDate>,
    #[serde(default)]
    groups: Vec<Group>,
}

impl From<SnapshotRecord> for Snapshot {
    fn from(record: SnapshotRecord) -> Self {
        let trips = record
            .trips
            .into_iter()
            .filter_map(|raw| {
                let id = raw.id;
                let label = raw.route_label.clone();
                match Trip::try_from(raw) {
                    Ok(trip) => Some(trip),
                    Err(e) => {
                        warn!(trip = %id, route = %label, error = %e, "skipping malformed trip");
                        None
                    }
                }
            })
            .collect();

        Snapshot {
            saved_at_secs: record.saved_at_secs,
            stops: record.stops,
            trips,
            holidays: record.holidays,
            groups: record.groups,
        }
    }
}

/// Snapshot file location.
#[derive(Debug, Clone)]
pub struct SnapshotFile {
    path: PathBuf,
}

impl SnapshotFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load the snapshot.
    ///
    /// Returns `Ok(None)` if the file does not exist.
    pub fn load(&self) -> Result<Option<Snapshot>, StoreError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(e)),
        };

        let record: SnapshotRecord =
            serde_json::from_str(&contents).map_err(|e| StoreError::Json {
                message: e.to_string(),
            })?;

        Ok(Some(record.into()))
    }

    /// Write the snapshot, stamping `saved_at_secs`.
    ///
    /// Creates parent directories if needed. The file is written next to the
    /// target and renamed over it, so readers never see a partial file.
    pub fn save(&self, snapshot: &mut Snapshot) -> Result<(), StoreError> {
        snapshot.saved_at_secs = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let json = serde_json::to_string_pretty(snapshot).map_err(|e| StoreError::Json {
            message: e.to_string(),
        })?;

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(|e| self.io_error(e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| self.io_error(e))?;

        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, e: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.display().to_string(),
            message: e.to_string(),
        }
    }
}
