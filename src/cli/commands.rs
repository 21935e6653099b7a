//! Command handlers for Shelter Finder CLI
//!
//! This module implements the handlers that coordinate between the CLI
//! arguments and the core application components. Operator-facing lines go
//! to stdout; diagnostics go through `tracing`.

use std::path::Path;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::app::{
    filter_by_regions, filter_by_title, write_csv, AvailableShelter, BookingClient, CategoryIds,
    IdCache, ListingFetcher, PlaceIdExtractor, PlaceIdResolver, RegionCatalog, ResolveOptions,
    ResolveStats, ShelterRecord,
};
use crate::cli::{ProgressConfig, ProgressDisplay, SearchArgs};
use crate::config::AppConfig;
use crate::errors::{AppError, Result};

/// Handle `--list-regions`
///
/// Prints the preset keys and exits without any network activity.
pub fn handle_list_regions(catalog: &RegionCatalog) {
    println!("Region presets:");
    for key in catalog.keys() {
        println!("  {}", key);
    }
    println!();
    println!("ASCII aliases accepted (e.g., sjaelland -> sjælland, moen -> møn, jutland -> jylland).");
}

/// Handle `--cache-info`
pub async fn handle_cache_info(args: &SearchArgs, config: &AppConfig) -> Result<()> {
    args.validate().map_err(AppError::generic)?;

    let cache = IdCache::load(&args.cache_file, &config.category_ids()).await;
    println!("Place id cache: {}", args.cache_file.display());
    if args.cache_file.exists() {
        println!("  Entries: {}", cache.len());
    } else {
        println!("  (not created yet)");
    }
    Ok(())
}

/// Handle `--build-cache`
///
/// Fetches and filters the listing, resolves every shelter's place id into
/// the cache, saves it and reports the totals. No availability is checked.
pub async fn handle_build_cache(args: &SearchArgs, config: &AppConfig) -> Result<ResolveStats> {
    args.validate().map_err(AppError::generic)?;

    let catalog = RegionCatalog::default();
    let categories = config.category_ids();
    let regions = resolve_regions(args, &catalog);

    let client = BookingClient::with_config(config.client_config())?;
    let mut shelters = collect_shelters(args, config, &client, &catalog, &regions).await?;

    let mut cache = IdCache::load(&args.cache_file, &categories).await;
    let cached_before = cache.len();
    let options = ResolveOptions {
        refresh: args.refresh_cache,
        remember_listing_ids: true,
    };

    println!("Building place id cache for {} places…", shelters.len());
    let stats = resolve_ids(config, &client, &mut shelters, &mut cache, options).await;
    save_cache(&cache, &args.cache_file).await;

    println!(
        "Cache hits: {}  scraped: {}  from listing: {}  unresolved: {}",
        stats.from_cache, stats.scraped, stats.from_listing, stats.failed
    );
    println!(
        "Cache now holds {} place ids ({} before). Saved: {}",
        cache.len(),
        cached_before,
        args.cache_file.display()
    );
    Ok(stats)
}

/// Handle an availability search
///
/// Returns the shelters found available; the list is empty in probe mode,
/// which prints booked dates and writes no CSV.
///
/// # Errors
///
/// Returns `AppError::MissingStartDate` before any network activity when no
/// start date was given, and fetch or report errors that end the run
pub async fn handle_search(args: &SearchArgs, config: &AppConfig) -> Result<Vec<AvailableShelter>> {
    args.validate().map_err(AppError::generic)?;
    let start = args.start.ok_or(AppError::MissingStartDate)?;

    let catalog = RegionCatalog::default();
    let categories = config.category_ids();
    let regions = resolve_regions(args, &catalog);

    let client = BookingClient::with_config(config.client_config())?;
    let mut shelters = collect_shelters(args, config, &client, &catalog, &regions).await?;

    // Probe mode only needs ids for the shelters it prints
    let subset_len = match args.probe {
        0 => shelters.len(),
        limit => limit.min(shelters.len()),
    };

    let mut cache = if args.no_cache {
        IdCache::new()
    } else {
        IdCache::load(&args.cache_file, &categories).await
    };

    let needs_resolution = shelters[..subset_len]
        .iter()
        .filter(|shelter| shelter.needs_resolution(&categories))
        .count();
    if needs_resolution > 0 || args.refresh_cache {
        println!("Resolving place IDs… ({} to resolve)", needs_resolution);
        let options = ResolveOptions {
            refresh: args.refresh_cache,
            remember_listing_ids: false,
        };
        let stats = resolve_ids(
            config,
            &client,
            &mut shelters[..subset_len],
            &mut cache,
            options,
        )
        .await;
        println!("Resolved {} place IDs.", stats.resolved());
        if !args.no_cache {
            save_cache(&cache, &args.cache_file).await;
        }
    } else {
        println!("All place IDs present and look valid for current subset.");
    }

    if args.probe > 0 {
        probe(config, &client, &shelters[..subset_len], &categories, start).await;
        return Ok(Vec::new());
    }

    let available = check_availability(args, config, &client, &shelters, &categories, start).await;

    write_csv(&args.out, &available)?;
    println!(
        "\nDone. {} shelters available for {} for {} nights.",
        available.len(),
        start,
        args.nights
    );
    println!("Saved: {}", args.out.display());
    Ok(available)
}

/// Map `--region` names to preset keys, warning about unknown names
fn resolve_regions<'a>(args: &SearchArgs, catalog: &'a RegionCatalog) -> Vec<&'a str> {
    let (regions, unknown) = catalog.resolve_all(&args.regions);
    for name in unknown {
        debug!("Region '{}' matched no preset", name);
        println!(
            "Warning: unknown region '{}'. Run --list-regions to see options.",
            name
        );
    }
    regions
}

/// Fetch the listing and apply the title filter, region filter and `--max-places`
async fn collect_shelters(
    args: &SearchArgs,
    config: &AppConfig,
    client: &BookingClient,
    catalog: &RegionCatalog,
    regions: &[&str],
) -> Result<Vec<ShelterRecord>> {
    client.warm_up().await;

    println!("Collecting places from API…");
    let fetcher = ListingFetcher::new(config.listing_config(), config.category_ids());
    let mut shelters = fetcher.fetch_all(client).await?;
    println!("Fetched {} places", shelters.len());

    if !args.filter.trim().is_empty() {
        let before = shelters.len();
        shelters = filter_by_title(shelters, &args.filter);
        println!(
            "Title filter '{}': {}/{} remain.",
            args.filter,
            shelters.len(),
            before
        );
    }

    if !regions.is_empty() {
        let before = shelters.len();
        shelters = filter_by_regions(shelters, catalog, regions);
        println!(
            "Region filter [{}]: {}/{} remain.",
            regions.join(", "),
            shelters.len(),
            before
        );
    }

    if args.max_places > 0 && shelters.len() > args.max_places {
        shelters.truncate(args.max_places);
        println!("Limiting to first {} places for test run.", shelters.len());
    }

    Ok(shelters)
}

async fn resolve_ids(
    config: &AppConfig,
    client: &BookingClient,
    shelters: &mut [ShelterRecord],
    cache: &mut IdCache,
    options: ResolveOptions,
) -> ResolveStats {
    let resolver = PlaceIdResolver::new(
        config.category_ids(),
        PlaceIdExtractor::new(),
        config.resolver_config(),
    );
    resolver
        .resolve_all(client, shelters, cache, options, |progress| {
            println!(
                "  …resolved {}/{} (of {})",
                progress.resolved, progress.attempted, progress.total
            );
        })
        .await
}

/// Save the cache, logging failures
async fn save_cache(cache: &IdCache, path: &Path) {
    match cache.save(path).await {
        Ok(()) => debug!("Place id cache saved to {}", path.display()),
        Err(e) => warn!("Could not save place id cache {}: {}", path.display(), e),
    }
}

/// Print booked dates for each shelter in `shelters`
async fn probe(
    config: &AppConfig,
    client: &BookingClient,
    shelters: &[ShelterRecord],
    categories: &CategoryIds,
    start: NaiveDate,
) {
    let prober = config.availability_prober();
    let start_key = start.to_string();

    println!("\nProbe first {} places on {}:", shelters.len(), start);
    for shelter in shelters {
        let Some(place_id) = shelter.place_id(categories) else {
            println!("- {} (id MISSING)", shelter.title);
            continue;
        };
        match prober.fetch_booked_dates(client, place_id, start).await {
            Ok(booked) => println!(
                "- {} (id {}): booked_count={}  has {}? {}",
                shelter.title,
                place_id,
                booked.len(),
                start,
                booked.contains(&start_key)
            ),
            Err(e) => println!("- {} (id {}): Error: {}", shelter.title, place_id, e),
        }
    }
}

/// Check every shelter for the requested stay, one request at a time
async fn check_availability(
    args: &SearchArgs,
    config: &AppConfig,
    client: &BookingClient,
    shelters: &[ShelterRecord],
    categories: &CategoryIds,
    start: NaiveDate,
) -> Vec<AvailableShelter> {
    let prober = config.availability_prober();
    let total = shelters.len();
    let mut available = Vec::new();

    println!(
        "\nChecking availability for {} places on {} for {} night(s)…",
        total, start, args.nights
    );
    let progress = ProgressDisplay::new(total, ProgressConfig::default());

    for (idx, shelter) in shelters.iter().enumerate() {
        progress.println(format!(
            "\n[{}/{}] {}  {}",
            idx + 1,
            total,
            shelter.title,
            shelter.url
        ));

        let Some(place_id) = shelter.place_id(categories) else {
            progress.println("  Skipping (missing or invalid place_id)");
            progress.inc();
            continue;
        };

        match prober.check(client, place_id, start, args.nights).await {
            Ok(check) => {
                if !args.quiet {
                    progress.println(format!(
                        "  place_id={} needs={:?} booked_hits={:?} booked_count={}",
                        place_id, check.required, check.booked_hits, check.booked_count
                    ));
                }
                if check.is_available() {
                    available.push(AvailableShelter::new(shelter, place_id));
                    progress.println(format!("  AVAILABLE -> {}", shelter.title));
                } else {
                    progress.println("  Not available for your range.");
                }
            }
            Err(e) => {
                let e = AppError::from(e);
                warn!(
                    category = e.category(),
                    recoverable = e.is_recoverable(),
                    "Availability check failed for {}: {}",
                    shelter.url,
                    e
                );
                progress.println(format!("  Error: {}", e));
            }
        }
        progress.inc();
    }

    progress.finish();
    info!("{} of {} shelters available", available.len(), total);
    available
}
