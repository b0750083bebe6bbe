// # HTTP IP Source
//
// This crate provides the `IpSource` used to ask "what is my IP" services
// for the caller's public address.
//
// ## Protocol
//
// `GET {endpoint}` answered with HTTP 200 and the address as the whole body,
// e.g. `https://ipv4.icanhazip.com`. Any other status is a failure.
//
// ## Architecture
//
// One request per call, bounded by a 30 second timeout. No retries and no
// caching: the core resolver asks again on the next cycle.

use async_trait::async_trait;
use ddns_core::traits::IpSource;
use ddns_core::{Error, Result};

use std::time::Duration;

/// Timeout for a single echo request
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Reqwest-backed IP echo client
#[derive(Debug, Clone)]
pub struct HttpIpSource {
    /// HTTP client
    client: reqwest::Client,
}

impl HttpIpSource {
    /// Create a source with the default 30 second timeout
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Create a source with a custom request timeout
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl IpSource for HttpIpSource {
    async fn fetch(&self, endpoint: &str) -> Result<String> {
        tracing::debug!("Requesting public address from {}", endpoint);

        let response = self
            .client
            .get(endpoint)
            .send()
            .await
            .map_err(|e| Error::ip_source(format!("Request failed: {}", e)))?;

        if response.status() != reqwest::StatusCode::OK {
            return Err(Error::ip_source(format!("HTTP error: {}", response.status())));
        }

        response
            .text()
            .await
            .map_err(|e| Error::ip_source(format!("Failed to read response: {}", e)))
    }
}
