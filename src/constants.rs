//! Application constants for Shelter Finder
//!
//! This module centralizes all constants used throughout the application,
//! organized by functional domain for maintainability and clarity.

use std::time::Duration;

/// HTTP client configuration constants
pub mod http {
    use super::Duration;

    /// Browser-like user agent; the booking site serves odd responses to bare clients
    pub const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_5) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

    /// Default `Accept` header for JSON endpoint calls
    pub const ACCEPT: &str = "application/json, text/javascript, */*; q=0.1";

    /// Default `Accept-Language` header
    pub const ACCEPT_LANGUAGE: &str = "da-DK,da;q=0.9,en-US;q=0.8,en;q=0.7";

    /// Timeout for JSON endpoint requests
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Timeout for detail page and warm-up requests
    pub const PAGE_TIMEOUT: Duration = Duration::from_secs(15);

    /// Connection establishment timeout
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Maximum number of redirects to follow
    pub const MAX_REDIRECTS: usize = 10;
}

/// Naturstyrelsen booking site URLs and endpoints
pub mod booking {
    /// Booking site base URL
    pub const BASE_URL: &str = "https://book.naturstyrelsen.dk";

    /// Paginated shelter listing endpoint
    pub const PLACES_PATH: &str =
        "/includes/branding_files/shelterbooking/includes/inc_ajaxbookingplaces.asp";

    /// Booked dates endpoint for a single place
    pub const BOOKINGS_PATH: &str =
        "/includes/branding_files/shelterbooking/includes/inc_ajaxgetbookingsforsingleplace.asp";

    /// Shelter search page, used as referer and for session warm-up
    pub const SEARCH_PATH: &str = "/soeg/?s1=3012";

    /// Path prefix of shelter detail pages
    pub const DETAIL_PREFIX: &str = "/sted/";

    /// Row list key in the listing response
    pub const PLACES_LIST_KEY: &str = "BookingPlacesList";

    /// Booked date list key in the bookings response
    pub const BOOKING_DATES_KEY: &str = "BookingDates";

    /// Category ids the site hands out in place of real place ids
    pub const CATEGORY_IDS: [u64; 3] = [3012, 3031, 3091];
}

/// Listing pagination limits
pub mod listing {
    use super::Duration;

    /// Rows requested per listing page
    pub const PAGE_SIZE: usize = 200;

    /// Hard cap on listing pages, guards against a server that always returns full pages
    pub const MAX_PAGES: usize = 500;

    /// Result cap passed to the listing endpoint
    pub const RESULT_CAP: u32 = 50_000;

    /// Delay between listing page requests
    pub const PAGE_DELAY: Duration = Duration::from_millis(150);
}

/// Place id resolution settings
pub mod resolver {
    use super::Duration;

    /// Delay after each cache or detail page attempt
    pub const DETAIL_DELAY: Duration = Duration::from_millis(50);

    /// Report resolution progress every N attempts
    pub const PROGRESS_INTERVAL: usize = 20;
}

/// Availability check settings
pub mod availability {
    use super::Duration;

    /// Delay before each bookings request
    pub const CHECK_DELAY: Duration = Duration::from_millis(250);

    /// Compact date format used by the bookings endpoint
    pub const ANCHOR_DATE_FORMAT: &str = "%Y%m%d";
}

/// File operation constants
pub mod files {
    /// Temporary file suffix for atomic operations
    pub const TEMP_FILE_SUFFIX: &str = ".tmp";

    /// Default place id cache file
    pub const DEFAULT_CACHE_FILE: &str = "ids_cache.json";

    /// Default CSV output file
    pub const DEFAULT_OUTPUT_FILE: &str = "available_shelters.csv";

    /// Project-local configuration file name
    pub const LOCAL_CONFIG_FILE: &str = "shelter-finder.toml";

    /// Directory name under the user config directory
    pub const CONFIG_DIR_NAME: &str = "shelter-finder";
}

/// CSV report layout
pub mod report {
    /// Output columns, coordinates first for mapping tools
    pub const CSV_HEADER: [&str; 6] = ["lat", "lng", "region", "name", "url", "place_id"];
}

/// Logging and debugging constants
pub mod logging {
    /// Default log level
    pub const DEFAULT_LOG_LEVEL: &str = "warn";
}

// Re-export commonly used constants for convenience
pub use booking::{BASE_URL, CATEGORY_IDS};
pub use files::{DEFAULT_CACHE_FILE, DEFAULT_OUTPUT_FILE, TEMP_FILE_SUFFIX};
pub use http::USER_AGENT;
