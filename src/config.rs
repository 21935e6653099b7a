//! Configuration management for Shelter Finder
//!
//! Every setting has a default, so the tool runs without a config file. An
//! optional TOML file can override pacing, endpoint and category settings.
//! Lookup order: `--config FILE`, then `./shelter-finder.toml`, then
//! `<config_dir>/shelter-finder/config.toml`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::app::{
    AvailabilityProber, CategoryIds, ClientConfig, ListingConfig, ResolverConfig,
};
use crate::constants::{availability, booking, files, http, listing, logging, resolver};
use crate::errors::{ConfigError, ConfigResult};

/// Unified application configuration for TOML serialization
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP client settings
    pub client: ClientConfigToml,
    /// Listing pagination settings
    pub listing: ListingConfigToml,
    /// Place id resolution settings
    pub resolver: ResolverConfigToml,
    /// Availability check settings
    pub availability: AvailabilityConfigToml,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// TOML-friendly client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfigToml {
    /// Booking site base URL
    pub base_url: String,
    /// User agent sent with every request
    pub user_agent: String,
    /// JSON endpoint timeout in seconds
    pub request_timeout_secs: u64,
    /// Detail page timeout in seconds
    pub page_timeout_secs: u64,
    /// Connect timeout in seconds
    pub connect_timeout_secs: u64,
    /// Visit the front and search pages before the first API call
    pub warm_up: bool,
}

impl Default for ClientConfigToml {
    fn default() -> Self {
        Self {
            base_url: booking::BASE_URL.to_string(),
            user_agent: http::USER_AGENT.to_string(),
            request_timeout_secs: http::DEFAULT_TIMEOUT.as_secs(),
            page_timeout_secs: http::PAGE_TIMEOUT.as_secs(),
            connect_timeout_secs: http::CONNECT_TIMEOUT.as_secs(),
            warm_up: true,
        }
    }
}

/// TOML-friendly listing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingConfigToml {
    /// Rows per page
    pub page_size: usize,
    /// Hard page cap
    pub max_pages: usize,
    /// Result cap passed to the endpoint
    pub result_cap: u32,
    /// Delay between pages in milliseconds
    pub page_delay_ms: u64,
}

impl Default for ListingConfigToml {
    fn default() -> Self {
        Self {
            page_size: listing::PAGE_SIZE,
            max_pages: listing::MAX_PAGES,
            result_cap: listing::RESULT_CAP,
            page_delay_ms: listing::PAGE_DELAY.as_millis() as u64,
        }
    }
}

/// TOML-friendly resolver configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfigToml {
    /// Delay after each cache or detail page attempt in milliseconds
    pub detail_delay_ms: u64,
    /// Progress line every N attempts (0 = never)
    pub progress_interval: usize,
    /// Ids the site uses for categories rather than places
    pub category_ids: Vec<u64>,
}

impl Default for ResolverConfigToml {
    fn default() -> Self {
        Self {
            detail_delay_ms: resolver::DETAIL_DELAY.as_millis() as u64,
            progress_interval: resolver::PROGRESS_INTERVAL,
            category_ids: booking::CATEGORY_IDS.to_vec(),
        }
    }
}

/// TOML-friendly availability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AvailabilityConfigToml {
    /// Delay before each bookings request in milliseconds
    pub check_delay_ms: u64,
}

impl Default for AvailabilityConfigToml {
    fn default() -> Self {
        Self {
            check_delay_ms: availability::CHECK_DELAY.as_millis() as u64,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level used when neither `-v` nor `RUST_LOG` says otherwise
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: logging::DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from an explicit file or the standard locations
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if an explicitly named file is missing, or if the
    /// file found cannot be read, parsed or validated
    pub async fn load(config_file_override: Option<PathBuf>) -> ConfigResult<Self> {
        let config_path = match config_file_override {
            Some(path) if !path.exists() => return Err(ConfigError::NotFound { path }),
            Some(path) => Some(path),
            None => Self::find_config_file(),
        };

        let config = match config_path {
            Some(path) => Self::load_from_file(&path).await?,
            None => {
                debug!("No config file found, using defaults");
                Self::default()
            }
        };

        config.validate()?;
        Ok(config)
    }

    /// Check values that would make the run meaningless
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` naming the offending field
    pub fn validate(&self) -> ConfigResult<()> {
        if self.listing.page_size == 0 {
            return Err(invalid("listing.page_size", "0", "Page size must be at least 1"));
        }
        if self.listing.max_pages == 0 {
            return Err(invalid("listing.max_pages", "0", "At least one page must be requested"));
        }
        if url::Url::parse(&self.client.base_url).is_err() {
            return Err(invalid(
                "client.base_url",
                &self.client.base_url,
                "Must be an absolute URL",
            ));
        }
        Ok(())
    }

    /// Runtime HTTP client configuration
    pub fn client_config(&self) -> ClientConfig {
        self.client.to_runtime_config()
    }

    /// Runtime listing configuration
    pub fn listing_config(&self) -> ListingConfig {
        self.listing.to_runtime_config()
    }

    /// Runtime resolver configuration
    pub fn resolver_config(&self) -> ResolverConfig {
        self.resolver.to_runtime_config()
    }

    /// Category ids to refuse as place ids
    pub fn category_ids(&self) -> CategoryIds {
        CategoryIds::new(self.resolver.category_ids.iter().copied())
    }

    /// Availability prober with the configured pacing
    pub fn availability_prober(&self) -> AvailabilityProber {
        AvailabilityProber::new(Duration::from_millis(self.availability.check_delay_ms))
    }

    /// Find configuration file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        let mut search_paths = vec![PathBuf::from(files::LOCAL_CONFIG_FILE)];
        if let Some(path) = Self::default_config_path() {
            search_paths.push(path);
        }

        let found = search_paths.into_iter().find(|path| path.exists());
        if let Some(path) = &found {
            debug!("Found config file: {}", path.display());
        }
        found
    }

    /// Default per-user config file path
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(files::CONFIG_DIR_NAME).join("config.toml"))
    }

    /// Load configuration from a TOML file
    async fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        let config: AppConfig = toml::from_str(&content)?;
        info!("Loaded configuration from: {}", path.display());
        Ok(config)
    }
}

impl ClientConfigToml {
    /// Convert to runtime ClientConfig
    pub fn to_runtime_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.base_url.clone(),
            user_agent: self.user_agent.clone(),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            page_timeout: Duration::from_secs(self.page_timeout_secs),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            warm_up: self.warm_up,
        }
    }
}

impl ListingConfigToml {
    /// Convert to runtime ListingConfig
    pub fn to_runtime_config(&self) -> ListingConfig {
        ListingConfig {
            page_size: self.page_size,
            max_pages: self.max_pages,
            result_cap: self.result_cap,
            page_delay: Duration::from_millis(self.page_delay_ms),
        }
    }
}

impl ResolverConfigToml {
    /// Convert to runtime ResolverConfig
    pub fn to_runtime_config(&self) -> ResolverConfig {
        ResolverConfig {
            detail_delay: Duration::from_millis(self.detail_delay_ms),
            progress_interval: self.progress_interval,
        }
    }
}

fn invalid(field: &str, value: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
