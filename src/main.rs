//! Shelter Finder CLI application
//!
//! Command-line interface for finding free Naturstyrelsen shelters and
//! exporting them as CSV.

use std::process;

use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use shelter_finder::cli::{
    handle_build_cache, handle_cache_info, handle_list_regions, handle_search, Cli,
};
use shelter_finder::config::AppConfig;
use shelter_finder::app::RegionCatalog;
use shelter_finder::errors::Result;

fn main() {
    // Every request is awaited before the next, so one thread is enough
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error: failed to start async runtime: {}", e);
            process::exit(1);
        }
    };

    // Handle any errors that occurred
    if let Err(e) = runtime.block_on(run()) {
        error!(category = e.category(), "Run failed: {}", e);
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Main application logic
async fn run() -> Result<()> {
    // Load environment variables from .env file if it exists
    dotenv::dotenv().ok(); // Ignore errors if file doesn't exist

    let cli = Cli::parse_args();
    let config = AppConfig::load(cli.global.config.clone()).await?;

    init_logging(&cli, &config);

    info!("Shelter Finder v{} starting", env!("CARGO_PKG_VERSION"));

    let args = &cli.search;
    if args.list_regions {
        handle_list_regions(&RegionCatalog::default());
        Ok(())
    } else if args.cache_info {
        handle_cache_info(args, &config).await
    } else if args.build_cache {
        info!("Building place id cache");
        handle_build_cache(args, &config).await.map(|_| ())
    } else {
        info!("Searching for available shelters");
        handle_search(args, &config).await.map(|_| ())
    }
}

/// Initialize logging from the CLI flags, falling back to the configured level
fn init_logging(cli: &Cli, config: &AppConfig) {
    let log_level = cli
        .log_level()
        .map(|level| level.to_string().to_lowercase())
        .unwrap_or_else(|| config.logging.level.clone());

    // Create environment filter
    let mut filter = EnvFilter::from_default_env();
    match format!("shelter_finder={}", log_level).parse() {
        Ok(directive) => filter = filter.add_directive(directive),
        Err(e) => eprintln!("Ignoring invalid log level '{}': {}", log_level, e),
    }

    // Initialize subscriber
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(cli.global.very_verbose) // Show levels only in very verbose mode
        .init();

    if cli.global.very_verbose {
        info!("Very verbose logging enabled");
    } else if cli.global.verbose {
        info!("Verbose logging enabled");
    }
}
