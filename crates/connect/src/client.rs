//! HTTP client for the remote record source.

use async_trait::async_trait;
use log::{debug, error};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use std::time::Duration;

use crate::error::{ConnectError, Result};
use crate::mapping::{map_payload, QuoteMapping};
use quotebook_core::quotes::Quote;
use quotebook_core::sync::RemoteQuoteSource;

/// Default endpoint serving the remote record set.
pub const DEFAULT_REMOTE_URL: &str = "https://jsonplaceholder.typicode.com/users";

/// Default timeout for remote requests.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Client fetching the remote record set over HTTP.
#[derive(Debug, Clone)]
pub struct RemoteQuoteClient {
    client: reqwest::Client,
    url: String,
    mapping: QuoteMapping,
}

impl RemoteQuoteClient {
    /// Create a new client.
    ///
    /// # Arguments
    ///
    /// * `url` - Endpoint returning the JSON array of remote records
    /// * `mapping` - How each record becomes a quote
    /// * `timeout` - Upper bound for the whole request
    pub fn new(url: &str, mapping: QuoteMapping, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            url: url.to_string(),
            mapping,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn mapping(&self) -> QuoteMapping {
        self.mapping
    }

    /// Fetch and map the remote record set.
    pub async fn fetch(&self) -> Result<Vec<Quote>> {
        debug!("Fetching remote quotes from {}", self.url);
        let response = self.client.get(&self.url).send().await?;
        let body = Self::read_body(response).await?;
        map_payload(&body, self.mapping).inspect_err(|e| {
            error!("Failed to decode remote payload: {}", e);
        })
    }

    /// Read a response body, turning non-success statuses into errors.
    async fn read_body(response: reqwest::Response) -> Result<String> {
        let status = response.status();
        let body = response.text().await?;
        debug!("Remote response ({}): {} bytes", status, body.len());

        if !status.is_success() {
            let message = if body.trim().is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("Request failed")
                    .to_string()
            } else {
                format!("Request failed: {}", body)
            };
            return Err(ConnectError::api(status.as_u16(), message));
        }

        Ok(body)
    }
}

#[async_trait]
impl RemoteQuoteSource for RemoteQuoteClient {
    async fn fetch_quotes(&self) -> quotebook_core::Result<Vec<Quote>> {
        Ok(self.fetch().await?)
    }
}
