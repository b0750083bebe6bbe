//! Core traits for the DDNS updater
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`IpSource`]: Ask an IP echo service for the public address
//! - [`DnsProvider`]: Read and write A/AAAA records via a provider API

pub mod ip_source;
pub mod dns_provider;

pub use ip_source::{IpSource, IpVersion};
pub use dns_provider::{
    DnsProvider, DnsProviderFactory, DnsRecord, RecordListing, RecordPayload, RecordType,
};
