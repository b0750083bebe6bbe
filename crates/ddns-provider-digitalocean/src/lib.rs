// # DigitalOcean DNS Provider
//
// This crate provides the DigitalOcean implementation of `DnsProvider`.
//
// ## Behaviour
//
// - One HTTP request per trait call, bounded by a 30 second timeout
// - Every request carries `Authorization: Bearer <token>` and
//   `Content-Type: application/json`
// - HTTP statuses are returned to the engine as-is; only transport failures
//   and unreadable bodies become errors
// - No retries, no caching, no decisions about what to write
// - Dry-run mode performs the reads but only logs the writes
//
// ## Security Requirements
//
// - API token NEVER appears in logs or `Debug` output
// - An empty token is rejected at construction
//
// ## API Reference
//
// - DigitalOcean API v2: https://docs.digitalocean.com/reference/api/
// - List records: GET `/domains/:domain/records?name=:fqdn`
// - Create record: POST `/domains/:domain/records`
// - Update record: PATCH `/domains/:domain/records/:record_id`

use async_trait::async_trait;
use ddns_core::config::ProviderConfig;
use ddns_core::traits::{
    DnsProvider, DnsProviderFactory, DnsRecord, RecordListing, RecordPayload, RecordType,
};
use ddns_core::{Error, Result};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

/// DigitalOcean API base URL
const DIGITALOCEAN_API_BASE: &str = "https://api.digitalocean.com/v2";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Status reported for writes skipped in dry-run mode
const DRY_RUN_CREATED: u16 = 201;
const DRY_RUN_UPDATED: u16 = 200;

/// Body of a record listing
#[derive(Debug, Deserialize)]
struct DomainRecordsResponse {
    #[serde(default)]
    domain_records: Vec<DomainRecord>,
}

/// One record as returned by the API
#[derive(Debug, Deserialize)]
struct DomainRecord {
    id: Value,
    #[serde(rename = "type")]
    record_type: String,
    name: String,
    #[serde(default)]
    data: String,
    #[serde(default)]
    ttl: u32,
}

impl DomainRecord {
    /// Convert to a core record; types other than A/AAAA are dropped
    fn into_dns_record(self) -> Option<DnsRecord> {
        let record_type = RecordType::parse(&self.record_type)?;
        let id = match self.id {
            Value::String(id) => id,
            other => other.to_string(),
        };

        Some(DnsRecord {
            id,
            record_type,
            name: self.name,
            data: self.data,
            ttl: self.ttl,
        })
    }
}

fn records_from_response(response: DomainRecordsResponse) -> Vec<DnsRecord> {
    response
        .domain_records
        .into_iter()
        .filter_map(DomainRecord::into_dns_record)
        .collect()
}

/// Human-readable reason for an unsuccessful status
fn describe_status(status: StatusCode) -> &'static str {
    match status.as_u16() {
        401 | 403 => "authentication failed: invalid API token or insufficient permissions",
        404 => "domain or record not found",
        422 => "request rejected as invalid",
        429 => "rate limit exceeded",
        500..=599 => "DigitalOcean server error (transient)",
        _ => "unexpected response",
    }
}

/// DigitalOcean DNS provider
///
/// Built fresh for each cycle by [`DigitalOceanFactory`]. Holds no state
/// besides its HTTP client.
///
/// # Dry-Run Mode
///
/// When `dry_run` is true, the provider will:
/// - Perform all GET requests (record listings)
/// - Log the intended POST/PATCH payload
/// - **NOT** modify DNS records, and report the write as successful
pub struct DigitalOceanProvider {
    /// DigitalOcean API token
    /// ⚠️ NEVER log this value
    api_token: String,

    /// API base URL, without trailing slash
    base_url: String,

    /// HTTP client for API requests
    client: reqwest::Client,

    /// Dry-run mode: if true, perform GET requests but skip writes
    dry_run: bool,
}

// Custom Debug implementation that hides the API token
impl std::fmt::Debug for DigitalOceanProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DigitalOceanProvider")
            .field("api_token", &"<REDACTED>")
            .field("base_url", &self.base_url)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl DigitalOceanProvider {
    /// Create a new DigitalOcean provider
    ///
    /// # Parameters
    ///
    /// - `api_token`: DigitalOcean personal access token with domain write scope
    /// - `dry_run`: If true, perform reads but skip writes
    ///
    /// # Errors
    ///
    /// Fails if the token is empty or the HTTP client cannot be built.
    pub fn new(api_token: impl Into<String>, dry_run: bool) -> Result<Self> {
        let api_token = api_token.into();
        if api_token.is_empty() {
            return Err(Error::config("DigitalOcean API token cannot be empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_token,
            base_url: DIGITALOCEAN_API_BASE.to_string(),
            client,
            dry_run,
        })
    }

    /// Point the provider at another API root (e.g. a local mock)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn records_url(&self, domain: &str) -> String {
        format!("{}/domains/{}/records", self.base_url, domain)
    }

    fn record_url(&self, domain: &str, record_id: &str) -> String {
        format!("{}/{}", self.records_url(domain), record_id)
    }

    /// Start a request carrying authentication and content type
    ///
    /// Headers go on before any body so `json()` keeps the single
    /// `Content-Type` set here.
    fn request(&self, method: Method, url: String) -> RequestBuilder {
        self.client
            .request(method, url)
            .bearer_auth(&self.api_token)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
    }

    fn list_request(&self, domain: &str, name: &str) -> RequestBuilder {
        self.request(Method::GET, self.records_url(domain))
            .query(&[("name", name)])
    }

    fn create_request(&self, domain: &str, payload: &RecordPayload) -> RequestBuilder {
        self.request(Method::POST, self.records_url(domain)).json(payload)
    }

    fn update_request(&self, domain: &str, record_id: &str, payload: &RecordPayload) -> RequestBuilder {
        self.request(Method::PATCH, self.record_url(domain, record_id))
            .json(payload)
    }

    async fn send(&self, request: RequestBuilder) -> Result<reqwest::Response> {
        request
            .send()
            .await
            .map_err(|e| Error::provider("digitalocean", format!("HTTP request failed: {}", e)))
    }
}

#[async_trait]
impl DnsProvider for DigitalOceanProvider {
    /// List the A/AAAA records of `name`
    ///
    /// ```http
    /// GET /domains/example.com/records?name=www.example.com
    /// Authorization: Bearer <token>
    /// ```
    async fn list_records(&self, domain: &str, name: &str) -> Result<RecordListing> {
        tracing::debug!("Listing DigitalOcean records for {}", name);

        let response = self.send(self.list_request(domain, name)).await?;

        let status = response.status();
        if status != StatusCode::OK {
            tracing::warn!(
                "DigitalOcean listing for {} returned {}: {}",
                name,
                status,
                describe_status(status)
            );
            return Ok(RecordListing::Unavailable {
                status: status.as_u16(),
            });
        }

        let body: DomainRecordsResponse = response
            .json()
            .await
            .map_err(|e| Error::provider("digitalocean", format!("Failed to parse response: {}", e)))?;

        Ok(RecordListing::Found(records_from_response(body)))
    }

    /// Create a record
    ///
    /// ```http
    /// POST /domains/example.com/records
    /// {"name": "www", "data": "1.2.3.4", "type": "A", "ttl": 3600}
    /// ```
    async fn create_record(&self, domain: &str, payload: &RecordPayload) -> Result<u16> {
        if self.dry_run {
            tracing::info!(
                "[DRY-RUN] Would send POST request to {} with payload: {}",
                self.records_url(domain),
                serde_json::to_string(payload)?
            );
            return Ok(DRY_RUN_CREATED);
        }

        let response = self.send(self.create_request(domain, payload)).await?;
        let status = response.status();
        if status != StatusCode::CREATED {
            tracing::debug!("DigitalOcean create returned {}: {}", status, describe_status(status));
        }

        Ok(status.as_u16())
    }

    /// Update a record in place
    ///
    /// ```http
    /// PATCH /domains/example.com/records/12345
    /// {"name": "www", "data": "1.2.3.5", "type": "A", "ttl": 3600}
    /// ```
    async fn update_record(
        &self,
        domain: &str,
        record_id: &str,
        payload: &RecordPayload,
    ) -> Result<u16> {
        if self.dry_run {
            tracing::info!(
                "[DRY-RUN] Would send PATCH request to {} with payload: {}",
                self.record_url(domain, record_id),
                serde_json::to_string(payload)?
            );
            return Ok(DRY_RUN_UPDATED);
        }

        let response = self
            .send(self.update_request(domain, record_id, payload))
            .await?;
        let status = response.status();
        if status != StatusCode::OK {
            tracing::debug!("DigitalOcean update returned {}: {}", status, describe_status(status));
        }

        Ok(status.as_u16())
    }

    fn provider_name(&self) -> &'static str {
        "digitalocean"
    }
}

/// Factory for creating DigitalOcean providers
pub struct DigitalOceanFactory;

impl DnsProviderFactory for DigitalOceanFactory {
    fn create(&self, config: &ProviderConfig) -> Result<Box<dyn DnsProvider>> {
        if config.api_token.is_empty() {
            return Err(Error::config("DigitalOcean API token is required"));
        }

        if config.dry_run {
            tracing::warn!("DigitalOcean provider running in DRY-RUN mode - no changes will be made");
        }

        Ok(Box::new(DigitalOceanProvider::new(
            config.api_token.clone(),
            config.dry_run,
        )?))
    }
}
