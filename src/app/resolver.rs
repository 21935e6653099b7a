//! Place id resolution
//!
//! The listing endpoint does not always hand out a shelter's real place id;
//! some rows carry a category id or nothing at all. For each shelter the
//! resolver applies, in order:
//!
//! 1. a valid id already on the record is kept, without any network call;
//! 2. unless refreshing, a cached id for the shelter's URL is used;
//! 3. otherwise the shelter's detail page is fetched and the id extracted
//!    with [`PlaceIdExtractor`].
//!
//! A category id is never accepted at any step. Failures leave the record
//! unresolved and the batch moves on.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::app::cache::IdCache;
use crate::app::client::BookingClient;
use crate::app::extract::PlaceIdExtractor;
use crate::app::models::{CategoryIds, ShelterRecord};
use crate::constants::resolver;

/// Pacing and reporting settings for the resolver
#[derive(Debug, Clone, PartialEq)]
pub struct ResolverConfig {
    /// Delay after each cache lookup or detail page attempt
    pub detail_delay: Duration,
    /// Report progress every N attempts (0 disables reporting)
    pub progress_interval: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            detail_delay: resolver::DETAIL_DELAY,
            progress_interval: resolver::PROGRESS_INTERVAL,
        }
    }
}

/// Per-run switches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Ignore cached ids and scrape again
    pub refresh: bool,
    /// Also store ids that came straight from the listing in the cache
    pub remember_listing_ids: bool,
}

/// Why a shelter's id could not be resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unresolved {
    /// The detail page could not be fetched
    Fetch(String),
    /// No pattern matched the detail page
    NoMatch,
    /// The page only yielded a category id
    CategoryId(u64),
}

impl std::fmt::Display for Unresolved {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Unresolved::Fetch(error) => write!(f, "detail page fetch failed: {}", error),
            Unresolved::NoMatch => write!(f, "no place id found on detail page"),
            Unresolved::CategoryId(id) => write!(f, "detail page only has category id {}", id),
        }
    }
}

/// Where a shelter's place id came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The listing already carried a valid id
    Listing(u64),
    /// Taken from the cache
    Cache(u64),
    /// Extracted from the detail page
    Scraped { place_id: u64, pattern: &'static str },
    /// No usable id
    Unresolved(Unresolved),
}

impl Resolution {
    /// The resolved place id, if any
    pub fn place_id(&self) -> Option<u64> {
        match self {
            Resolution::Listing(id) | Resolution::Cache(id) => Some(*id),
            Resolution::Scraped { place_id, .. } => Some(*place_id),
            Resolution::Unresolved(_) => None,
        }
    }

    /// Whether resolving needed the cache or the network
    pub fn was_attempted(&self) -> bool {
        !matches!(self, Resolution::Listing(_))
    }
}

/// Progress snapshot handed to the reporting callback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveProgress {
    /// Ids resolved so far
    pub resolved: usize,
    /// Shelters attempted so far
    pub attempted: usize,
    /// Shelters that need an attempt in this batch
    pub total: usize,
}

/// Summary of a resolution batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveStats {
    /// Shelters in the batch
    pub total: usize,
    /// Shelters whose listing id was already valid
    pub from_listing: usize,
    /// Shelters that needed the cache or a detail page
    pub attempted: usize,
    /// Resolved from the cache
    pub from_cache: usize,
    /// Resolved from a detail page
    pub scraped: usize,
    /// Left unresolved
    pub failed: usize,
}

impl ResolveStats {
    /// Ids resolved by this batch (cache or detail page)
    pub fn resolved(&self) -> usize {
        self.from_cache + self.scraped
    }

    fn record(&mut self, resolution: &Resolution) {
        match resolution {
            Resolution::Listing(_) => self.from_listing += 1,
            Resolution::Cache(_) => self.from_cache += 1,
            Resolution::Scraped { .. } => self.scraped += 1,
            Resolution::Unresolved(_) => self.failed += 1,
        }
        if resolution.was_attempted() {
            self.attempted += 1;
        }
    }
}

/// Resolves trustworthy place ids for shelters
#[derive(Debug, Clone)]
pub struct PlaceIdResolver {
    categories: CategoryIds,
    extractor: PlaceIdExtractor,
    config: ResolverConfig,
}

impl PlaceIdResolver {
    /// Create a resolver from its injected configuration
    pub fn new(categories: CategoryIds, extractor: PlaceIdExtractor, config: ResolverConfig) -> Self {
        Self {
            categories,
            extractor,
            config,
        }
    }

    /// Extract a usable place id from a detail page body
    pub fn place_id_from_page(&self, body: &str) -> Result<(u64, &'static str), Unresolved> {
        let found = self.extractor.extract(body).ok_or(Unresolved::NoMatch)?;
        self.categories
            .accept(found.place_id)
            .map(|id| (id, found.pattern))
            .ok_or(Unresolved::CategoryId(found.place_id))
    }

    /// Resolve the place id of one shelter
    ///
    /// On success the id is written to both the record and the cache.
    pub async fn resolve_one(
        &self,
        client: &BookingClient,
        shelter: &mut ShelterRecord,
        cache: &mut IdCache,
        options: ResolveOptions,
    ) -> Resolution {
        if let Some(id) = shelter.place_id(&self.categories) {
            if options.remember_listing_ids {
                cache.insert(shelter.url.as_str(), id, &self.categories);
            }
            return Resolution::Listing(id);
        }

        if !options.refresh {
            if let Some(id) = cache.get(&shelter.url).and_then(|id| self.categories.accept(id)) {
                debug!("Cache hit for {}: {}", shelter.url, id);
                shelter.candidate_id = Some(id);
                return Resolution::Cache(id);
            }
        }

        let body = match client.detail_page(&shelter.url).await {
            Ok(body) => body,
            Err(e) => {
                warn!("Could not fetch {}: {}", shelter.url, e);
                return Resolution::Unresolved(Unresolved::Fetch(e.to_string()));
            }
        };

        match self.place_id_from_page(&body) {
            Ok((place_id, pattern)) => {
                debug!("Resolved {} -> {} via {}", shelter.url, place_id, pattern);
                shelter.candidate_id = Some(place_id);
                cache.insert(shelter.url.as_str(), place_id, &self.categories);
                Resolution::Scraped { place_id, pattern }
            }
            Err(reason) => {
                debug!("Unresolved {}: {}", shelter.url, reason);
                Resolution::Unresolved(reason)
            }
        }
    }

    /// Resolve every shelter in `shelters`, sequentially
    ///
    /// `on_progress` is called every `progress_interval` attempts. Shelters
    /// that already carry a valid id do not count as attempts.
    pub async fn resolve_all<F>(
        &self,
        client: &BookingClient,
        shelters: &mut [ShelterRecord],
        cache: &mut IdCache,
        options: ResolveOptions,
        mut on_progress: F,
    ) -> ResolveStats
    where
        F: FnMut(ResolveProgress),
    {
        let mut stats = ResolveStats {
            total: shelters.len(),
            ..Default::default()
        };
        let to_attempt = shelters
            .iter()
            .filter(|shelter| shelter.needs_resolution(&self.categories))
            .count();

        for shelter in shelters.iter_mut() {
            let resolution = self.resolve_one(client, shelter, cache, options).await;
            stats.record(&resolution);
            if !resolution.was_attempted() {
                continue;
            }

            if self.config.progress_interval > 0
                && stats.attempted % self.config.progress_interval == 0
            {
                on_progress(ResolveProgress {
                    resolved: stats.resolved(),
                    attempted: stats.attempted,
                    total: to_attempt,
                });
            }
            tokio::time::sleep(self.config.detail_delay).await;
        }

        info!(
            "Place ids: {} from listing, {} from cache, {} scraped, {} unresolved",
            stats.from_listing, stats.from_cache, stats.scraped, stats.failed
        );
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> PlaceIdResolver {
        PlaceIdResolver::new(
            CategoryIds::default(),
            PlaceIdExtractor::new(),
            ResolverConfig::default(),
        )
    }

    #[test]
    fn test_page_with_real_id() {
        let body = r#"<div data-place-id="5501"></div>"#;
        assert_eq!(
            resolver().place_id_from_page(body),
            Ok((5501, "data-place-id"))
        );
    }

    #[test]
    fn test_page_with_category_id_is_unresolved() {
        for category in CategoryIds::default().iter() {
            let body = format!(r#"<a href="/soeg/?i={}">Alle</a>"#, category);
            assert_eq!(
                resolver().place_id_from_page(&body),
                Err(Unresolved::CategoryId(category))
            );
        }
    }

    #[test]
    fn test_page_without_id() {
        assert_eq!(
            resolver().place_id_from_page("<html></html>"),
            Err(Unresolved::NoMatch)
        );
    }

    #[test]
    fn test_stats_counting() {
        let mut stats = ResolveStats::default();
        stats.record(&Resolution::Listing(1));
        stats.record(&Resolution::Cache(2));
        stats.record(&Resolution::Scraped {
            place_id: 3,
            pattern: "query-param",
        });
        stats.record(&Resolution::Unresolved(Unresolved::NoMatch));

        assert_eq!(stats.from_listing, 1);
        assert_eq!(stats.attempted, 3);
        assert_eq!(stats.resolved(), 2);
        assert_eq!(stats.failed, 1);
    }

    #[test]
    fn test_resolution_place_id() {
        assert_eq!(Resolution::Cache(9).place_id(), Some(9));
        assert_eq!(
            Resolution::Unresolved(Unresolved::Fetch("timeout".into())).place_id(),
            None
        );
        assert!(!Resolution::Listing(9).was_attempted());
    }
}
