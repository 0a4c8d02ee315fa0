//! Bus schedule server.
//!
//! Answers "which buses go from this stop to that one, on this day, after
//! this time?" from a curated timetable, and fills gaps by asking an
//! external transit directions provider and keeping what it returns.

pub mod cache;
pub mod config;
pub mod directions;
pub mod domain;
pub mod ingest;
pub mod matcher;
pub mod service;
pub mod store;
pub mod text;
pub mod web;
