//! Error types for Shelter Finder
//!
//! One error enum per concern, collected under [`AppError`]. Only a missing
//! start date and configuration problems abort a run; fetch failures are
//! handled per shelter by the callers.

use std::path::PathBuf;
use thiserror::Error;

/// HTTP and remote endpoint errors
#[derive(Error, Debug)]
pub enum FetchError {
    /// HTTP request error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server returned a non-success status
    #[error("Server error: HTTP {status} for {url}")]
    ServerError { status: u16, url: String },

    /// Page not found, even after the trailing-slash retry
    #[error("Not found: {url}")]
    NotFound { url: String },

    /// Response body was not valid JSON
    #[error("Invalid JSON from {url}: {source}")]
    Json {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// Invalid URL provided or built
    #[error("Invalid URL: {url} - {error}")]
    InvalidUrl { url: String, error: String },
}

/// Place id cache errors
///
/// Loading never fails (a bad cache is an empty cache), so these only come
/// out of saving.
#[derive(Error, Debug)]
pub enum CacheError {
    /// I/O error writing the cache
    #[error("Cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization of the cache failed
    #[error("Cache serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    /// Atomic rename of the temporary file failed
    #[error("Atomic cache write failed: could not rename {temp_path} to {final_path}")]
    AtomicOperationFailed {
        temp_path: PathBuf,
        final_path: PathBuf,
    },
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    NotFound { path: PathBuf },

    /// Configuration file could not be read
    #[error("Failed to read configuration file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid configuration format
    #[error("Invalid configuration format: {0}")]
    InvalidFormat(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration value for {field}: {value}. {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// CSV report errors
#[derive(Error, Debug)]
pub enum ReportError {
    /// CSV encoding error
    #[error("CSV write failed: {0}")]
    Csv(#[from] csv::Error),

    /// I/O error writing the report
    #[error("Report I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Top-level application error that can represent any error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Remote fetch error
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Cache error
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Report error
    #[error(transparent)]
    Report(#[from] ReportError),

    /// Generic I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A search was requested without a start date
    #[error("--start is required (unless using --list-regions, --build-cache or --cache-info)")]
    MissingStartDate,

    /// Generic application error with context
    #[error("Application error: {message}")]
    Generic { message: String },
}

impl AppError {
    /// Create a generic application error with a message
    pub fn generic(message: impl Into<String>) -> Self {
        Self::Generic {
            message: message.into(),
        }
    }

    /// Check if the error only affects one unit of work
    pub fn is_recoverable(&self) -> bool {
        match self {
            AppError::Fetch(FetchError::Http(_))
            | AppError::Fetch(FetchError::ServerError { .. })
            | AppError::Fetch(FetchError::NotFound { .. })
            | AppError::Fetch(FetchError::Json { .. })
            | AppError::Cache(_) => true,

            AppError::MissingStartDate
            | AppError::Config(_)
            | AppError::Fetch(FetchError::InvalidUrl { .. }) => false,

            _ => false,
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            AppError::Fetch(_) => "fetch",
            AppError::Cache(_) => "cache",
            AppError::Config(_) => "config",
            AppError::Report(_) => "report",
            AppError::Io(_) => "io",
            AppError::MissingStartDate => "usage",
            AppError::Generic { .. } => "generic",
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;

/// Fetch result type alias
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Cache result type alias
pub type CacheResult<T> = std::result::Result<T, CacheError>;

/// Config result type alias
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Report result type alias
pub type ReportResult<T> = std::result::Result<T, ReportError>;
