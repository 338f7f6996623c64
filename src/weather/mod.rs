//! The weather pull: one timeline API request per (location, date) pair,
//! flattened into one TSV row per returned day.

pub mod api;
pub mod error;
pub(crate) mod flatten;
pub mod input;
pub mod job;
