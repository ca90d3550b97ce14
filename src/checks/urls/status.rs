/*!
 * HTTP status resolution for extracted URLs.
 *
 * The `StatusFetcher` trait is the network seam: `HttpStatusFetcher` talks to
 * real servers, tests plug in scripted fetchers. `UrlStatusChecker` adds the
 * retry policy and bounds the number of requests in flight.
 */

use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use log::{debug, error, info};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use reqwest::Client;

use crate::app_config::UrlCheckConfig;
use crate::errors::ConfigError;

use super::UrlRecord;

/// Browser-like agent; some hosts refuse unknown clients
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_11_3) AppleWebKit/537.36 (KHTML, like Gecko)Chrome/54.0.2806.0 Safari/537.36";

/// Status reported when a request fails before a response arrives
pub const TRANSPORT_FAILURE_STATUS: u16 = 500;

/// Resolves a URL to an HTTP status code
#[async_trait]
pub trait StatusFetcher: Send + Sync + Debug {
    /// Status of a GET request. Transport failures map to
    /// `TRANSPORT_FAILURE_STATUS`.
    async fn fetch_status(&self, url: &str) -> u16;
}

/// Fetcher backed by a shared reqwest client
#[derive(Debug, Clone)]
pub struct HttpStatusFetcher {
    client: Client,
}

impl HttpStatusFetcher {
    /// Build a client from the URL check settings.
    ///
    /// Configured headers override the defaults; the User-Agent is always
    /// present.
    pub fn new(config: &UrlCheckConfig) -> Result<Self, ConfigError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(DEFAULT_USER_AGENT));

        for (name, value) in &config.headers {
            let header_name =
                HeaderName::from_bytes(name.as_bytes()).map_err(|e| ConfigError::InvalidHeader {
                    name: name.clone(),
                    reason: e.to_string(),
                })?;
            let header_value =
                HeaderValue::from_str(value).map_err(|e| ConfigError::InvalidHeader {
                    name: name.clone(),
                    reason: e.to_string(),
                })?;
            headers.insert(header_name, header_value);
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ConfigError::InvalidSetting {
                name: "urls".to_string(),
                reason: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self { client })
    }
}

#[async_trait]
impl StatusFetcher for HttpStatusFetcher {
    async fn fetch_status(&self, url: &str) -> u16 {
        match self.client.get(url).send().await {
            Ok(response) => response.status().as_u16(),
            Err(e) => {
                error!("Request to {} failed: {}", url, e);
                TRANSPORT_FAILURE_STATUS
            }
        }
    }
}

/// Concurrent status resolution with retries
#[derive(Debug, Clone)]
pub struct UrlStatusChecker {
    fetcher: Arc<dyn StatusFetcher>,
    retry_max_count: u32,
    max_concurrent_requests: usize,
}

impl UrlStatusChecker {
    pub fn new(
        fetcher: Arc<dyn StatusFetcher>,
        retry_max_count: u32,
        max_concurrent_requests: usize,
    ) -> Self {
        Self {
            fetcher,
            retry_max_count: retry_max_count.max(1),
            max_concurrent_requests: max_concurrent_requests.max(1),
        }
    }

    /// Checker with a real HTTP client
    pub fn from_config(config: &UrlCheckConfig) -> Result<Self, ConfigError> {
        let fetcher = HttpStatusFetcher::new(config)?;
        Ok(Self::new(
            Arc::new(fetcher),
            config.retry_max_count,
            config.max_concurrent_requests,
        ))
    }

    pub fn retry_max_count(&self) -> u32 {
        self.retry_max_count
    }

    /// Status of one URL; a 500 is retried until `retry_max_count` attempts
    /// have been made
    pub async fn request_status(&self, url: &str) -> u16 {
        info!("checking {}", url);
        let mut attempts = 0;
        loop {
            let status = self.fetcher.fetch_status(url).await;
            attempts += 1;
            if status != TRANSPORT_FAILURE_STATUS || attempts >= self.retry_max_count {
                return status;
            }
            debug!("{} returned {}, retrying ({}/{})", url, status, attempts, self.retry_max_count);
        }
    }

    /// Fill in the status of every record, at most `max_concurrent_requests`
    /// at a time. Records come back in their original order.
    pub async fn check(&self, records: Vec<UrlRecord>) -> Vec<UrlRecord> {
        let mut checked: Vec<(usize, UrlRecord)> = stream::iter(records.into_iter().enumerate())
            .map(|(index, mut record)| async move {
                record.status_code = self.request_status(&record.url).await;
                (index, record)
            })
            .buffer_unordered(self.max_concurrent_requests)
            .collect()
            .await;

        checked.sort_by_key(|(index, _)| *index);
        checked.into_iter().map(|(_, record)| record).collect()
    }
}
