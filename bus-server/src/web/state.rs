//! Application state for the web layer.

use std::sync::Arc;

use crate::service::ScheduleService;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Trip search, discovery and catalog access
    pub schedule: Arc<ScheduleService>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(schedule: ScheduleService) -> Self {
        Self {
            schedule: Arc::new(schedule),
        }
    }
}
