//! HTTP client configuration and building logic
//!
//! This module handles the configuration and construction of the HTTP client
//! used against the booking site.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::redirect::Policy;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::constants::{booking, http};
use crate::errors::{FetchError, FetchResult};

/// Configuration for the booking site HTTP client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Booking site base URL (overridable for tests and mirrors)
    pub base_url: String,
    /// User agent sent with every request
    pub user_agent: String,
    /// Timeout for JSON endpoint requests
    pub request_timeout: Duration,
    /// Timeout for detail pages and session warm-up
    pub page_timeout: Duration,
    /// Connect timeout
    pub connect_timeout: Duration,
    /// Visit the front and search pages before the first API call
    pub warm_up: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: booking::BASE_URL.to_string(),
            user_agent: http::USER_AGENT.to_string(),
            request_timeout: http::DEFAULT_TIMEOUT,
            page_timeout: http::PAGE_TIMEOUT,
            connect_timeout: http::CONNECT_TIMEOUT,
            warm_up: true,
        }
    }
}

impl ClientConfig {
    /// Create a configuration pointing at a different base URL
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Enable or disable the session warm-up requests
    pub fn with_warm_up(mut self, enabled: bool) -> Self {
        self.warm_up = enabled;
        self
    }

    /// Builds the HTTP client with the specified configuration
    pub fn build_http_client(&self) -> FetchResult<Client> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(http::ACCEPT));
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_static(http::ACCEPT_LANGUAGE),
        );

        Client::builder()
            .cookie_store(true) // the site keys some responses on its session cookie
            .default_headers(headers)
            .user_agent(self.user_agent.as_str())
            .timeout(self.request_timeout)
            .connect_timeout(self.connect_timeout)
            .redirect(Policy::limited(http::MAX_REDIRECTS))
            .build()
            .map_err(FetchError::Http)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_config_default() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, booking::BASE_URL);
        assert_eq!(config.request_timeout, http::DEFAULT_TIMEOUT);
        assert!(config.warm_up);
        assert!(config.user_agent.starts_with("Mozilla/5.0"));
    }

    #[test]
    fn test_client_config_custom() {
        let config = ClientConfig::with_base_url("http://127.0.0.1:8080").with_warm_up(false);

        assert_eq!(config.base_url, "http://127.0.0.1:8080");
        assert!(!config.warm_up);
        assert_eq!(config.page_timeout, http::PAGE_TIMEOUT);
    }

    #[test]
    fn test_http_client_creation() {
        let config = ClientConfig {
            request_timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(2),
            ..Default::default()
        };
        assert!(config.build_http_client().is_ok());
    }
}
