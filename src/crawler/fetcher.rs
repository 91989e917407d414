//! HTTP fetcher for listing and detail pages
//!
//! This module handles all HTTP requests for the scraper, including:
//! - Building an HTTP client that presents itself as a desktop browser
//! - GET requests for one listing page (search term, region, page index)
//! - GET requests for a single vacancy's own page
//! - Error classification into a `FetchFailure`

use crate::config::{HttpConfig, ScraperConfig};
use crate::ConfigError;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::{Client, RequestBuilder};
use std::time::Duration;
use thiserror::Error;

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Why a page could not be fetched
///
/// Every variant is local to one request. The caller decides whether the cycle
/// carries on without that page.
#[derive(Debug, Error)]
pub enum FetchFailure {
    #[error("search term is empty")]
    EmptySearchTerm,

    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("could not connect to {url}")]
    Connect { url: String },

    #[error("{url} answered with HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("failed to read body of {url}: {message}")]
    Body { url: String, message: String },

    #[error("request to {url} failed: {message}")]
    Request { url: String, message: String },
}

/// Builds an HTTP client with browser-like identification
///
/// # Arguments
///
/// * `config` - The HTTP client configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(WatchError)` - A header value was not valid or the client failed to build
///
/// # Example
///
/// ```no_run
/// use vacancy_watch::config::HttpConfig;
/// use vacancy_watch::crawler::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig) -> crate::Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
    headers.insert(
        ACCEPT_LANGUAGE,
        HeaderValue::from_str(&config.accept_language).map_err(|e| {
            ConfigError::Validation(format!("accept_language is not a valid header: {}", e))
        })?,
    );

    let client = Client::builder()
        .user_agent(config.user_agent.clone())
        .default_headers(headers)
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()?;

    Ok(client)
}

/// Retrieves listing pages and vacancy pages
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Client,
    base_url: String,
    region: String,
}

impl PageFetcher {
    /// Creates a fetcher for the listings endpoint and region in `config`
    pub fn new(client: Client, config: &ScraperConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.clone(),
            region: config.region.clone(),
        }
    }

    /// The listings endpoint pages are requested from
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetches one listing page
    ///
    /// The request carries `text` (search term), `area` (region) and `page`
    /// (zero-based index) as query parameters.
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - The page markup
    /// * `Err(FetchFailure)` - Timeout, connection failure, non-success status
    ///   or an unreadable body
    pub async fn fetch(&self, search_term: &str, page_index: u32) -> Result<String, FetchFailure> {
        let search_term = search_term.trim();
        if search_term.is_empty() {
            return Err(FetchFailure::EmptySearchTerm);
        }

        let page = page_index.to_string();
        let request = self.client.get(&self.base_url).query(&[
            ("text", search_term),
            ("area", self.region.as_str()),
            ("page", page.as_str()),
        ]);

        let label = format!("{} (page {})", self.base_url, page_index);
        get_markup(request, &label).await
    }

    /// Fetches a vacancy's own page
    pub async fn fetch_detail(&self, link: &str) -> Result<String, FetchFailure> {
        get_markup(self.client.get(link), link).await
    }
}

/// Sends the request and reads the body as text
async fn get_markup(request: RequestBuilder, url: &str) -> Result<String, FetchFailure> {
    let response = request.send().await.map_err(|e| classify_error(url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchFailure::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    response.text().await.map_err(|e| FetchFailure::Body {
        url: url.to_string(),
        message: e.to_string(),
    })
}

fn classify_error(url: &str, error: reqwest::Error) -> FetchFailure {
    if error.is_timeout() {
        FetchFailure::Timeout {
            url: url.to_string(),
        }
    } else if error.is_connect() {
        FetchFailure::Connect {
            url: url.to_string(),
        }
    } else {
        FetchFailure::Request {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}
