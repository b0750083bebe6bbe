//! Public address resolution
//!
//! Wraps an [`IpSource`] so that every failure becomes an absent address. An
//! unreachable echo service must never stop a cycle: the family is simply
//! left alone until a later cycle resolves it.

use crate::config::DdnsConfig;
use crate::traits::{IpSource, IpVersion, RecordType};
use tracing::{debug, warn};

/// A resolved public address
///
/// The text is kept as the echo service returned it (trimmed). No parsing is
/// applied: the provider compares and stores record data as strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IpAddress(String);

impl IpAddress {
    /// Build an address from raw text; blank text is no address
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        (!trimmed.is_empty()).then(|| Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for IpAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Addresses resolved at the start of a cycle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedAddresses {
    pub ipv4: Option<IpAddress>,
    pub ipv6: Option<IpAddress>,
}

impl ResolvedAddresses {
    /// True when neither family resolved
    pub fn is_empty(&self) -> bool {
        self.ipv4.is_none() && self.ipv6.is_none()
    }

    /// Desired record data for a record type
    pub fn for_type(&self, record_type: RecordType) -> Option<&IpAddress> {
        match record_type {
            RecordType::A => self.ipv4.as_ref(),
            RecordType::Aaaa => self.ipv6.as_ref(),
        }
    }
}

/// Resolves the caller's public IPv4 and IPv6 addresses
pub struct IpResolver {
    source: Box<dyn IpSource>,
    ipv4_endpoint: Option<String>,
    ipv6_endpoint: Option<String>,
}

impl IpResolver {
    /// Create a resolver with explicit endpoints
    ///
    /// A `None` endpoint disables that family without any network call.
    pub fn new(
        source: Box<dyn IpSource>,
        ipv4_endpoint: Option<String>,
        ipv6_endpoint: Option<String>,
    ) -> Self {
        Self {
            source,
            ipv4_endpoint,
            ipv6_endpoint,
        }
    }

    /// Create a resolver using the configured echo services
    pub fn from_config(source: Box<dyn IpSource>, config: &DdnsConfig) -> Self {
        Self::new(
            source,
            config.ipv4_server.clone(),
            config.ipv6_server.clone(),
        )
    }

    /// Resolve one endpoint
    ///
    /// Transport errors, timeouts, non-200 responses and blank bodies all
    /// yield `None` with a warning naming the endpoint.
    pub async fn resolve(&self, endpoint: Option<&str>) -> Option<IpAddress> {
        let endpoint = endpoint?;

        match self.source.fetch(endpoint).await {
            Ok(body) => {
                let address = IpAddress::parse(&body);
                if address.is_none() {
                    warn!("Unable to get IP from server: {} (empty response)", endpoint);
                }
                address
            }
            Err(e) => {
                warn!("Unable to get IP from server: {} ({})", endpoint, e);
                None
            }
        }
    }

    /// Resolve the address of one family
    pub async fn resolve_version(&self, version: IpVersion) -> Option<IpAddress> {
        let endpoint = match version {
            IpVersion::V4 => self.ipv4_endpoint.as_deref(),
            IpVersion::V6 => self.ipv6_endpoint.as_deref(),
        };

        let address = self.resolve(endpoint).await;
        debug!("{} address: {:?}", version, address.as_ref().map(IpAddress::as_str));
        address
    }

    /// Resolve both families independently
    pub async fn resolve_all(&self) -> ResolvedAddresses {
        ResolvedAddresses {
            ipv4: self.resolve_version(IpVersion::V4).await,
            ipv6: self.resolve_version(IpVersion::V6).await,
        }
    }
}
