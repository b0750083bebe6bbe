// # IP Source Trait
//
// Defines the transport used to ask an external "what is my IP" service for
// the caller's public address.
//
// ## Implementations
//
// - HTTP: `ddns-ip-http` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::IpSource;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let source = /* IpSource implementation */;
//
//     let body = source.fetch("https://ipv4.icanhazip.com").await?;
//     println!("Public address: {}", body.trim());
//
//     Ok(())
// }
// ```

use async_trait::async_trait;

/// IP address family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IpVersion {
    V4,
    V6,
}

impl std::fmt::Display for IpVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IpVersion::V4 => f.write_str("IPv4"),
            IpVersion::V6 => f.write_str("IPv6"),
        }
    }
}

/// Trait for IP echo transports
///
/// An `IpSource` performs exactly one request per call and reports the raw
/// response body. It does not trim, validate or cache; the
/// [`IpResolver`](crate::resolver::IpResolver) owns those decisions and turns
/// every failure into an absent address.
///
/// # Failure contract
///
/// Implementations return `Err` for transport errors, timeouts and any status
/// other than 200. They never retry.
#[async_trait]
pub trait IpSource: Send + Sync {
    /// Fetch the response body of `endpoint`
    ///
    /// # Returns
    ///
    /// - `Ok(String)`: The body of a 200 response, untrimmed
    /// - `Err(Error)`: Transport failure, timeout or non-200 status
    async fn fetch(&self, endpoint: &str) -> Result<String, crate::Error>;
}
