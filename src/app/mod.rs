//! Core application logic for Shelter Finder
//!
//! This module contains the booking site client, the listing fetcher, the
//! place id cache and resolver, the in-memory filters, the availability
//! prober and the CSV report writer.
//!
//! # Examples
//!
//! ```rust,no_run
//! use shelter_finder::app::{
//!     BookingClient, CategoryIds, IdCache, ListingConfig, ListingFetcher, PlaceIdExtractor,
//!     PlaceIdResolver, ResolveOptions, ResolverConfig,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = BookingClient::new()?;
//! client.warm_up().await;
//!
//! let categories = CategoryIds::default();
//! let mut shelters = ListingFetcher::new(ListingConfig::default(), categories.clone())
//!     .fetch_all(&client)
//!     .await?;
//!
//! let mut cache = IdCache::new();
//! let resolver = PlaceIdResolver::new(categories, PlaceIdExtractor::new(), ResolverConfig::default());
//! let stats = resolver
//!     .resolve_all(&client, &mut shelters, &mut cache, ResolveOptions::default(), |_| {})
//!     .await;
//! println!("Resolved {} place ids", stats.resolved());
//! # Ok(())
//! # }
//! ```

pub mod availability;
pub mod cache;
pub mod client;
pub mod extract;
pub mod filter;
pub mod listing;
pub mod models;
pub mod regions;
pub mod report;
pub mod resolver;

// Re-export main public API
pub use availability::{booked_dates, required_dates, AvailabilityCheck, AvailabilityProber};
pub use cache::IdCache;
pub use client::{BookingClient, ClientConfig};
pub use extract::{ExtractedId, PlaceIdExtractor};
pub use filter::{filter_by_regions, filter_by_title};
pub use listing::{ListingConfig, ListingFetcher};
pub use models::{AvailableShelter, CategoryIds, ShelterRecord};
pub use regions::{RegionCatalog, RegionPreset};
pub use report::write_csv;
pub use resolver::{
    PlaceIdResolver, Resolution, ResolveOptions, ResolveProgress, ResolveStats, ResolverConfig,
    Unresolved,
};
