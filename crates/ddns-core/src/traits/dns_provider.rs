// # DNS Provider Trait
//
// Defines the interface for reading and writing A/AAAA records through a
// hosting provider's API.
//
// ## Implementations
//
// - DigitalOcean: `ddns-provider-digitalocean` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::traits::{DnsProvider, RecordListing, RecordPayload, RecordType};
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let provider = /* DnsProvider implementation */;
//
//     if let RecordListing::Found(records) =
//         provider.list_records("example.com", "www.example.com").await?
//     {
//         println!("{} record(s)", records.len());
//     }
//
//     let payload = RecordPayload::new("example.com", "www.example.com", "1.2.3.4", RecordType::A, 3600);
//     let status = provider.create_record("example.com", &payload).await?;
//     println!("create returned {}", status);
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// DNS record type managed by the updater
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordType {
    /// IPv4 address record
    A,
    /// IPv6 address record
    #[serde(rename = "AAAA")]
    Aaaa,
}

impl RecordType {
    /// Both managed record types, in processing order
    pub const ALL: [RecordType; 2] = [RecordType::A, RecordType::Aaaa];

    /// Wire name of the record type
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
        }
    }

    /// Parse a wire name; other record types are not managed
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "A" => Some(RecordType::A),
            "AAAA" => Some(RecordType::Aaaa),
            _ => None,
        }
    }
}

impl std::fmt::Display for RecordType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A record as currently held by the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsRecord {
    /// Provider-assigned identifier (opaque)
    pub id: String,
    /// Record type
    pub record_type: RecordType,
    /// Record name as reported by the provider
    pub name: String,
    /// Record data (the IP address text)
    pub data: String,
    /// Time-to-live in seconds
    pub ttl: u32,
}

/// Body of a create or update call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordPayload {
    /// Record name relative to the domain
    pub name: String,
    /// Record data
    pub data: String,
    /// Record type
    #[serde(rename = "type")]
    pub record_type: RecordType,
    /// Time-to-live in seconds
    pub ttl: u32,
}

impl RecordPayload {
    /// Build a payload for `subdomain` under `domain`
    ///
    /// The name is the subdomain with the `.domain` suffix stripped; a name
    /// that does not carry the suffix is sent unchanged.
    pub fn new(
        domain: &str,
        subdomain: &str,
        data: impl Into<String>,
        record_type: RecordType,
        ttl: u32,
    ) -> Self {
        let suffix = format!(".{}", domain);
        let name = subdomain.strip_suffix(suffix.as_str()).unwrap_or(subdomain);

        Self {
            name: name.to_string(),
            data: data.into(),
            record_type,
            ttl,
        }
    }
}

/// Outcome of a record listing that reached the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordListing {
    /// HTTP 200 with the managed records for the name, in provider order
    Found(Vec<DnsRecord>),
    /// Any other HTTP status
    Unavailable {
        /// HTTP status code returned by the provider
        status: u16,
    },
}

/// Trait for DNS provider implementations
///
/// Providers are single-shot API clients. They do not decide whether a write
/// is needed, do not retry and do not cache between calls: the
/// [`DdnsEngine`](crate::engine::DdnsEngine) owns those decisions.
///
/// # Failure contract
///
/// - `Err(Error)` means the API itself could not be reached or answered with
///   something unreadable. The engine abandons the current domain.
/// - Any HTTP status, success or not, is returned as `Ok` so the engine can
///   treat it as a per-record outcome.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// List the A/AAAA records named `name` in `domain`
    ///
    /// Records of other types are dropped from the listing.
    async fn list_records(&self, domain: &str, name: &str) -> Result<RecordListing, crate::Error>;

    /// Create a record in `domain`
    ///
    /// # Returns
    ///
    /// The HTTP status code of the response (201 on success)
    async fn create_record(
        &self,
        domain: &str,
        payload: &RecordPayload,
    ) -> Result<u16, crate::Error>;

    /// Update record `record_id` in `domain`
    ///
    /// # Returns
    ///
    /// The HTTP status code of the response (200 on success)
    async fn update_record(
        &self,
        domain: &str,
        record_id: &str,
        payload: &RecordPayload,
    ) -> Result<u16, crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}

/// Helper trait for constructing DNS providers from configuration
///
/// The engine builds a provider at the start of each cycle, after it has
/// confirmed that credentials are present.
pub trait DnsProviderFactory: Send + Sync {
    /// Create a DnsProvider instance from configuration
    fn create(
        &self,
        config: &crate::config::ProviderConfig,
    ) -> Result<Box<dyn DnsProvider>, crate::Error>;
}
