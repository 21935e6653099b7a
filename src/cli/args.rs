//! Command-line argument parsing for Shelter Finder
//!
//! This module defines the CLI structure using clap derive macros. The tool
//! has a single flat command surface: one search per run, plus a few flags
//! that print information or prime the place id cache and exit.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser};

use crate::constants::files;

/// Shelter Finder - find Naturstyrelsen shelters that are free for your dates
#[derive(Parser, Debug)]
#[command(
    name = "shelter_finder",
    version,
    about = "Find Naturstyrelsen shelters with open availability and export them as CSV",
    long_about = "Queries book.naturstyrelsen.dk for every bookable shelter, resolves each shelter's place id
(with a persistent cache), checks the booked dates for your stay and writes the free shelters
to a CSV with coordinates first, ready for mapping tools.

Examples:
  shelter_finder --start 2025-09-07 --nights 2 --region sjaelland
  shelter_finder --start 2025-09-07 --filter fjord --region fyn --region bornholm
  shelter_finder --list-regions
  shelter_finder --build-cache"
)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Search options
    #[command(flatten)]
    pub search: SearchArgs,
}

/// Logging and configuration options
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Very verbose logging (debug level)
    #[arg(long)]
    pub very_verbose: bool,

    /// Configuration file path
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// What to search for and where to put the results
#[derive(Args, Debug, Clone)]
pub struct SearchArgs {
    /// First night of the stay (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub start: Option<NaiveDate>,

    /// Number of nights
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub nights: u32,

    /// Substring to match in the shelter title (case-insensitive)
    #[arg(long, value_name = "TEXT", default_value = "")]
    pub filter: String,

    /// Region preset to keep; repeat to combine regions
    #[arg(long = "region", value_name = "NAME")]
    pub regions: Vec<String>,

    /// List region presets and exit
    #[arg(long)]
    pub list_regions: bool,

    /// Only check the first N shelters after filtering (0 = all)
    #[arg(long, value_name = "N", default_value_t = 0)]
    pub max_places: usize,

    /// Print booked dates for the first N shelters and exit without writing CSV
    #[arg(long, value_name = "N", default_value_t = 0)]
    pub probe: usize,

    /// Suppress per-shelter booking details
    #[arg(short, long)]
    pub quiet: bool,

    /// CSV output file
    #[arg(long, value_name = "FILE", default_value = files::DEFAULT_OUTPUT_FILE)]
    pub out: PathBuf,

    /// Place id cache file
    #[arg(long, value_name = "FILE", default_value = files::DEFAULT_CACHE_FILE)]
    pub cache_file: PathBuf,

    /// Do not load or save the place id cache
    #[arg(long)]
    pub no_cache: bool,

    /// Resolve place ids again even when they are cached
    #[arg(long)]
    pub refresh_cache: bool,

    /// Resolve and cache place ids for the (filtered) listing, then exit
    #[arg(long)]
    pub build_cache: bool,

    /// Show the place id cache location and size, then exit
    #[arg(long)]
    pub cache_info: bool,
}

impl Default for SearchArgs {
    fn default() -> Self {
        Self {
            start: None,
            nights: 1,
            filter: String::new(),
            regions: Vec::new(),
            list_regions: false,
            max_places: 0,
            probe: 0,
            quiet: false,
            out: PathBuf::from(files::DEFAULT_OUTPUT_FILE),
            cache_file: PathBuf::from(files::DEFAULT_CACHE_FILE),
            no_cache: false,
            refresh_cache: false,
            build_cache: false,
            cache_info: false,
        }
    }
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Log level requested on the command line, if any
    pub fn log_level(&self) -> Option<tracing::Level> {
        if self.global.very_verbose {
            Some(tracing::Level::DEBUG)
        } else if self.global.verbose {
            Some(tracing::Level::INFO)
        } else {
            None
        }
    }
}

impl SearchArgs {
    /// Reject flag combinations that cannot be honoured
    pub fn validate(&self) -> Result<(), String> {
        if self.no_cache && (self.build_cache || self.cache_info) {
            return Err("--no-cache cannot be combined with --build-cache or --cache-info".to_string());
        }
        if self.build_cache && self.probe > 0 {
            return Err("--probe cannot be combined with --build-cache".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("shelter_finder").chain(args.iter().copied()))
    }

    #[test]
    fn test_defaults() {
        let cli = parse(&["--start", "2025-09-07"]).unwrap();
        let search = cli.search;

        assert_eq!(search.start, NaiveDate::from_ymd_opt(2025, 9, 7));
        assert_eq!(search.nights, 1);
        assert_eq!(search.out, PathBuf::from("available_shelters.csv"));
        assert_eq!(search.cache_file, PathBuf::from("ids_cache.json"));
        assert!(search.regions.is_empty());
    }

    #[test]
    fn test_repeated_regions() {
        let cli = parse(&["--region", "fyn", "--region", "Sjælland"]).unwrap();
        assert_eq!(cli.search.regions, vec!["fyn", "Sjælland"]);
    }

    #[test]
    fn test_zero_nights_rejected() {
        assert!(parse(&["--start", "2025-09-07", "--nights", "0"]).is_err());
        assert!(parse(&["--start", "2025-09-07", "--nights", "3"]).is_ok());
    }

    #[test]
    fn test_bad_start_date_rejected() {
        assert!(parse(&["--start", "07-09-2025"]).is_err());
        assert!(parse(&["--start", "2025-02-30"]).is_err());
    }

    #[test]
    fn test_start_optional_for_info_modes() {
        for flag in ["--list-regions", "--build-cache", "--cache-info"] {
            let cli = parse(&[flag]).unwrap();
            assert!(cli.search.start.is_none(), "{flag} should parse without --start");
        }
    }

    #[test]
    fn test_search_args_validation() {
        let mut args = SearchArgs::default();
        assert!(args.validate().is_ok());

        args.build_cache = true;
        assert!(args.validate().is_ok());

        args.no_cache = true;
        assert!(args.validate().is_err());

        args.no_cache = false;
        args.probe = 3;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_log_level() {
        let cli = parse(&["-v"]).unwrap();
        assert_eq!(cli.log_level(), Some(tracing::Level::INFO));

        let cli = parse(&["-v", "--very-verbose"]).unwrap();
        assert_eq!(cli.log_level(), Some(tracing::Level::DEBUG));

        let cli = parse(&[]).unwrap();
        assert_eq!(cli.log_level(), None);
    }
}
