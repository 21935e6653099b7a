//! HTTP client for the Naturstyrelsen booking site
//!
//! The module is organized into specialized components:
//! - `config`: HTTP client configuration and building
//! - `http`: core request handling (JSON endpoints, detail pages, warm-up)
//!
//! [`BookingClient`] is the only network surface of the crate. Every call is
//! awaited before the next one is issued.

use chrono::NaiveDate;
use serde_json::Value;

use crate::constants::{availability, booking};
use crate::errors::FetchResult;

pub mod config;
pub mod http;

pub use config::ClientConfig;

use http::HttpHandler;

/// Client for the listing, bookings and detail page endpoints
#[derive(Debug)]
pub struct BookingClient {
    http_handler: HttpHandler,
    warm_up: bool,
}

impl BookingClient {
    /// Creates a client for the public booking site
    ///
    /// # Errors
    ///
    /// Returns `FetchError` if HTTP client creation fails
    pub fn new() -> FetchResult<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Creates a client with custom configuration
    ///
    /// # Errors
    ///
    /// Returns `FetchError` if HTTP client creation fails or the base URL is invalid
    pub fn with_config(config: ClientConfig) -> FetchResult<Self> {
        let client = config.build_http_client()?;
        let http_handler = HttpHandler::new(
            client,
            &config.base_url,
            booking::SEARCH_PATH,
            config.page_timeout,
        )?;

        tracing::debug!("Created booking client for {}", http_handler.base());

        Ok(Self {
            http_handler,
            warm_up: config.warm_up,
        })
    }

    /// Visit the front page and the shelter search page to obtain session cookies
    ///
    /// Failures are ignored; the endpoints usually answer without a session.
    pub async fn warm_up(&self) {
        if !self.warm_up {
            return;
        }
        self.http_handler.touch("/").await;
        self.http_handler.touch(booking::SEARCH_PATH).await;
    }

    /// Fetch one page of the shelter listing
    ///
    /// # Arguments
    ///
    /// * `page` - 1-based page index
    /// * `page_size` - rows per page
    /// * `result_cap` - overall result cap passed to the endpoint
    ///
    /// # Errors
    ///
    /// Returns `FetchError` if the request or JSON decoding fails
    pub async fn places_page(
        &self,
        page: usize,
        page_size: usize,
        result_cap: u32,
    ) -> FetchResult<Value> {
        let query = [
            ("pid", "0".to_string()),
            ("p", page.to_string()),
            ("r", result_cap.to_string()),
            ("ps", page_size.to_string()),
            ("t", "1".to_string()),
        ];
        self.http_handler
            .get_json(booking::PLACES_PATH, &query)
            .await
    }

    /// Fetch the bookings document for a place, anchored at `anchor`
    ///
    /// # Errors
    ///
    /// Returns `FetchError` if the request or JSON decoding fails
    pub async fn bookings(&self, place_id: u64, anchor: NaiveDate) -> FetchResult<Value> {
        let query = [
            ("i", place_id.to_string()),
            (
                "d",
                anchor
                    .format(availability::ANCHOR_DATE_FORMAT)
                    .to_string(),
            ),
        ];
        self.http_handler
            .get_json(booking::BOOKINGS_PATH, &query)
            .await
    }

    /// Fetch the HTML of a shelter detail page
    ///
    /// # Errors
    ///
    /// Returns `FetchError` if the page cannot be fetched
    pub async fn detail_page(&self, url: &str) -> FetchResult<String> {
        self.http_handler.get_page(url).await
    }

    /// Canonical detail page URL for a listing slug
    pub fn shelter_url(&self, slug: &str) -> String {
        format!(
            "{}{}{}/",
            self.http_handler.base(),
            booking::DETAIL_PREFIX,
            slug
        )
    }
}
