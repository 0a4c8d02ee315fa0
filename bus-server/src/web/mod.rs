//! Web layer for the bus schedule server.
//!
//! JSON endpoints for trip search, stop and route listings, and votes.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
