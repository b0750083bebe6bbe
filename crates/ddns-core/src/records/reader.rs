//! Current record lookup

use std::collections::HashMap;

use tracing::{debug, warn};

use super::SubdomainState;
use crate::error::Result;
use crate::traits::{DnsProvider, RecordListing};

/// Read the current records of every subdomain in `domain`
///
/// Issues one listing per subdomain, in order. A subdomain whose listing came
/// back with a non-200 status is left out of the map; what that means is the
/// caller's decision.
///
/// # Errors
///
/// Transport-level provider failures are returned immediately. Subdomains
/// after the failing one are not queried.
pub async fn fetch_current_records(
    provider: &dyn DnsProvider,
    domain: &str,
    subdomains: &[String],
) -> Result<HashMap<String, SubdomainState>> {
    let mut current = HashMap::with_capacity(subdomains.len());

    for subdomain in subdomains {
        match provider.list_records(domain, subdomain).await? {
            RecordListing::Found(records) => {
                debug!("{} record(s) found for {}", records.len(), subdomain);
                current.insert(subdomain.clone(), SubdomainState::from_records(records));
            }
            RecordListing::Unavailable { status } => {
                warn!(
                    "Unable to read records for {} from {} (HTTP {})",
                    subdomain,
                    provider.provider_name(),
                    status
                );
            }
        }
    }

    Ok(current)
}
