// # ddns-core
//
// Core library for the DDNS updater.
//
// ## Architecture Overview
//
// Each cycle discovers the caller's public addresses and reconciles the A and
// AAAA records of a set of subdomains at a DNS provider:
//
// - **IpSource** / **IpResolver**: ask IP echo services for the public IPv4
//   and IPv6 addresses, turning every failure into "absent"
// - **DnsProvider**: read and write records through the provider API
// - **reconcile::decide**: the pure create / update / no-op decision
// - **records**: the reader and writer built on `DnsProvider`
// - **DdnsEngine**: runs cycles, once or on a fixed interval
//
// ## Design Principles
//
// 1. **Provider is the source of truth**: records are re-read every cycle,
//    nothing is cached between cycles
// 2. **Never regress**: an address family that failed to resolve leaves its
//    records alone
// 3. **Bounded failure**: a provider outage abandons the affected domain only
// 4. **Library-First**: the daemon is a thin wrapper over `DdnsEngine`

pub mod traits;
pub mod engine;
pub mod config;
pub mod error;
pub mod reconcile;
pub mod records;
pub mod resolver;

// Re-export core types for convenience
pub use traits::{IpSource, DnsProvider, DnsProviderFactory};
pub use engine::{CycleOutcome, CycleReport, DdnsEngine};
pub use config::{DdnsConfig, DomainConfig, ProviderConfig};
pub use error::{Error, Result};
pub use reconcile::{Action, decide};
pub use resolver::{IpAddress, IpResolver, ResolvedAddresses};
