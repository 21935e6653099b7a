//! Shelter Finder Library
//!
//! Finds Naturstyrelsen shelters that are free for a requested stay. The
//! library fetches the shelter listing, resolves each shelter's real place id
//! (with a persistent cache), filters by title and region presets, checks the
//! booked dates and writes the free shelters to CSV.

pub mod app;
pub mod cli;
pub mod config;
pub mod constants;
pub mod errors;

// Re-export commonly used types for convenience
pub use errors::{AppError, Result};
