//! Command-line interface components
//!
//! This module contains CLI-specific code for the Shelter Finder application,
//! including argument parsing, command handlers and progress display.

pub mod args;
pub mod commands;
pub mod progress;

pub use args::{Cli, GlobalArgs, SearchArgs};
pub use commands::{handle_build_cache, handle_cache_info, handle_list_regions, handle_search};
pub use progress::{ProgressConfig, ProgressDisplay};
