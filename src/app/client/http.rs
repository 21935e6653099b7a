//! Core HTTP operations against the booking site
//!
//! Requests are sent one at a time and never retried; pacing is left to the
//! callers, which sleep a fixed delay between requests. The only second
//! attempt is the trailing-slash retry for detail pages that 404.

use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use serde_json::Value;
use url::Url;

use crate::errors::{FetchError, FetchResult};

/// HTTP operations handler bound to one base URL
#[derive(Debug)]
pub struct HttpHandler {
    client: Client,
    base_url: Url,
    referer: String,
    page_timeout: Duration,
}

impl HttpHandler {
    /// Creates a new HttpHandler for `base_url`
    ///
    /// # Arguments
    ///
    /// * `client` - The HTTP client to use for requests
    /// * `base_url` - Booking site base URL
    /// * `referer_path` - Path sent as `Referer` on JSON calls
    /// * `page_timeout` - Timeout for HTML page requests
    ///
    /// # Errors
    ///
    /// Returns `FetchError::InvalidUrl` if the base URL does not parse
    pub fn new(
        client: Client,
        base_url: &str,
        referer_path: &str,
        page_timeout: Duration,
    ) -> FetchResult<Self> {
        let base_url = parse_url(base_url)?;
        let referer = format!("{}{}", base_url.as_str().trim_end_matches('/'), referer_path);
        Ok(Self {
            client,
            base_url,
            referer,
            page_timeout,
        })
    }

    /// Base URL without a trailing slash, for building absolute page URLs
    pub fn base(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    /// Resolve a site-absolute path against the base URL
    pub fn endpoint(&self, path: &str) -> FetchResult<Url> {
        self.base_url.join(path).map_err(|e| FetchError::InvalidUrl {
            url: path.to_string(),
            error: e.to_string(),
        })
    }

    /// Calls a JSON endpoint and decodes the body
    ///
    /// The site sometimes labels JSON as `text/html`, so the body is decoded
    /// from text regardless of content type.
    ///
    /// # Errors
    ///
    /// Returns `FetchError` on transport failure, non-success status or an
    /// undecodable body
    pub async fn get_json(&self, path: &str, query: &[(&str, String)]) -> FetchResult<Value> {
        let url = self.endpoint(path)?;
        let response = self
            .client
            .get(url.clone())
            .query(query)
            .header("X-Requested-With", "XMLHttpRequest")
            .header(reqwest::header::REFERER, self.referer.as_str())
            .send()
            .await?;
        let response = check_status(response)?;
        let text = response.text().await?;

        serde_json::from_str(text.trim()).map_err(|source| FetchError::Json {
            url: url.to_string(),
            source,
        })
    }

    /// Fetches the HTML content of a shelter detail page
    ///
    /// Detail URLs under `/sted/` get a trailing slash before the first
    /// request, and any URL that 404s without one is retried once with one
    /// appended.
    ///
    /// # Errors
    ///
    /// Returns `FetchError` if the request fails or the page cannot be found
    pub async fn get_page(&self, url: &str) -> FetchResult<String> {
        let url = self.canonical_page_url(url);
        let mut response = self.send_page(&url).await?;

        if response.status() == StatusCode::NOT_FOUND && !url.ends_with('/') {
            tracing::debug!("404 for {}, retrying with trailing slash", url);
            response = self.send_page(&format!("{}/", url)).await?;
        }

        let response = check_status(response)?;
        let text = response.text().await?;
        tracing::debug!("Fetched page: {} ({} bytes)", url, text.len());
        Ok(text)
    }

    /// Best-effort GET used to pick up session cookies; errors are ignored
    pub async fn touch(&self, path: &str) {
        let Ok(url) = self.endpoint(path) else {
            return;
        };
        match self
            .client
            .get(url.clone())
            .timeout(self.page_timeout)
            .send()
            .await
        {
            Ok(response) => tracing::debug!("Warm-up {} -> {}", url, response.status()),
            Err(e) => tracing::debug!("Warm-up {} failed: {}", url, e),
        }
    }

    /// Apply the trailing-slash rule for detail pages on this site
    pub fn canonical_page_url(&self, url: &str) -> String {
        let detail_root = format!("{}{}", self.base(), crate::constants::booking::DETAIL_PREFIX);
        if url.starts_with(&detail_root) && !url.ends_with('/') {
            format!("{}/", url)
        } else {
            url.to_string()
        }
    }

    async fn send_page(&self, url: &str) -> FetchResult<Response> {
        let url = parse_url(url)?;
        Ok(self
            .client
            .get(url)
            .timeout(self.page_timeout)
            .send()
            .await?)
    }
}

fn parse_url(url: &str) -> FetchResult<Url> {
    Url::parse(url).map_err(|e| FetchError::InvalidUrl {
        url: url.to_string(),
        error: e.to_string(),
    })
}

fn check_status(response: Response) -> FetchResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let url = response.url().to_string();
    if status == StatusCode::NOT_FOUND {
        Err(FetchError::NotFound { url })
    } else {
        Err(FetchError::ServerError {
            status: status.as_u16(),
            url,
        })
    }
}
