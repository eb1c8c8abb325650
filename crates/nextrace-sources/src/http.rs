//! Plain HTTP page fetching.
//!
//! Every adapter reads its pages through a [`PageFetcher`], which applies
//! the bounded per-call timeout and maps transport and status failures onto
//! [`SourceError`] codes.

use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use tracing::{debug, trace, warn};

use crate::error::{SourceError, SourceResult};

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Settings for outbound page requests.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Bound on each request, connection to last byte.
    pub timeout: Duration,
    /// The `User-Agent` header sent with every request.
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            user_agent: format!("nextrace/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl FetchConfig {
    /// Builder method to set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builder method to set the user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// Fetches source pages as untrusted text.
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Client,
    config: FetchConfig,
}

impl PageFetcher {
    /// Creates a fetcher with the given configuration.
    pub fn new(config: FetchConfig) -> SourceResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| {
                SourceError::configuration(format!("Failed to create HTTP client: {}", e))
                    .with_source(e)
            })?;

        Ok(Self { client, config })
    }

    /// Performs a GET request and returns the body text.
    pub async fn get(&self, url: &str) -> SourceResult<String> {
        trace!(url = %url, "Sending request");

        let response = self.client.get(url).send().await.map_err(|e| {
            let err = if e.is_timeout() {
                SourceError::timeout(format!(
                    "Request to {} exceeded {:?}",
                    url, self.config.timeout
                ))
            } else {
                SourceError::unavailable(format!("Request failed: {}", e))
            };
            err.with_source(e)
        })?;

        self.handle_response(url, response).await
    }

    /// Handles the HTTP response and extracts the body.
    async fn handle_response(&self, url: &str, response: Response) -> SourceResult<String> {
        let status = response.status();
        trace!(status = %status, "Received response");

        match status {
            s if s.is_success() => {
                let body = response.text().await.map_err(|e| {
                    SourceError::unavailable(format!("Failed to read response: {}", e))
                        .with_source(e)
                })?;
                debug!(url = %url, bytes = body.len(), "Fetched page");
                Ok(body)
            }
            StatusCode::NOT_FOUND | StatusCode::GONE => Err(SourceError::unavailable(format!(
                "Page not found ({}): {}",
                status, url
            ))),
            StatusCode::TOO_MANY_REQUESTS => Err(SourceError::unavailable(format!(
                "Rate limited by {}",
                url
            ))),
            s if s.is_server_error() => Err(SourceError::unavailable(format!(
                "Server error ({}) from {}",
                s, url
            ))),
            s => {
                warn!(status = %s, url = %url, "Unexpected response status");
                Err(SourceError::unavailable(format!(
                    "Unexpected status {} from {}",
                    s, url
                )))
            }
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Returns the underlying HTTP client, shared with the WebDriver adapter.
    pub fn client(&self) -> &Client {
        &self.client
    }
}
