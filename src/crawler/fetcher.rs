//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests made on behalf of the source
//! adapters, including:
//! - Building HTTP clients with the configured user agent and timeouts
//! - GET requests returning the raw response body
//! - Collapsing every failure into a single network error kind
//!
//! No retries are performed here; retry policy belongs to the caller.

use crate::config::HttpConfig;
use crate::{ArchiveError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// The raw transport used by the archive service
///
/// Implemented over `reqwest` by [`HttpFetcher`]; tests substitute
/// in-memory fetchers.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches `url` and returns the response body
    ///
    /// Timeouts, connection failures and non-2xx statuses all surface as
    /// `ArchiveError::Network`.
    async fn get(&self, url: &str) -> Result<Vec<u8>>;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The HTTP configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use archive_tree::config::HttpConfig;
/// use archive_tree::crawler::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig) -> std::result::Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(config.timeout())
        .connect_timeout(config.connect_timeout())
        .gzip(true)
        .brotli(true)
        .build()
}

/// `reqwest`-backed fetcher
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    timeout: Duration,
}

impl HttpFetcher {
    /// Creates a fetcher from the HTTP configuration
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let client = build_http_client(config).map_err(|e| ArchiveError::Network {
            url: String::new(),
            status: None,
            detail: format!("Failed to build HTTP client: {}", e),
        })?;

        Ok(Self {
            client,
            timeout: config.timeout(),
        })
    }

    /// Creates a fetcher over an existing client with a per-request timeout
    pub fn with_client(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn get(&self, url: &str) -> Result<Vec<u8>> {
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| classify_error(url, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ArchiveError::Network {
                url: url.to_string(),
                status: Some(status.as_u16()),
                detail: format!("HTTP {}", status),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| classify_error(url, &e))?;

        tracing::trace!("Fetched {} bytes from {}", body.len(), url);
        Ok(body.to_vec())
    }
}

/// Maps a transport error to a network error with a readable detail
fn classify_error(url: &str, e: &reqwest::Error) -> ArchiveError {
    let detail = if e.is_timeout() {
        "Request timeout".to_string()
    } else if e.is_connect() {
        "Connection refused".to_string()
    } else {
        e.to_string()
    };

    ArchiveError::Network {
        url: url.to_string(),
        status: e.status().map(|s| s.as_u16()),
        detail,
    }
}
