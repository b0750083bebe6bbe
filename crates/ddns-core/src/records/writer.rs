//! Record create/update calls

use tracing::{error, info};

use crate::error::Result;
use crate::reconcile::Action;
use crate::traits::{DnsProvider, RecordPayload, RecordType};

/// Status the provider answers a successful create with
const STATUS_CREATED: u16 = 201;

/// Status the provider answers a successful update with
const STATUS_OK: u16 = 200;

/// Applies reconciliation actions to the provider
///
/// Every write is attempted once. A rejected write is logged and reported as
/// "unchanged"; the next cycle re-reads the provider and tries again.
#[derive(Debug, Clone, Copy)]
pub struct RecordWriter {
    ttl: u32,
}

impl RecordWriter {
    /// Create a writer stamping `ttl` on every record it writes
    pub fn new(ttl: u32) -> Self {
        Self { ttl }
    }

    /// Apply `action` to the `record_type` record of `subdomain`
    ///
    /// # Returns
    ///
    /// - `Ok(true)`: The provider accepted a create or update
    /// - `Ok(false)`: Nothing to do, or the provider rejected the write
    /// - `Err(Error)`: The provider could not be reached
    pub async fn apply(
        &self,
        provider: &dyn DnsProvider,
        domain: &str,
        subdomain: &str,
        action: &Action,
        record_type: RecordType,
    ) -> Result<bool> {
        match action {
            Action::NoOp => Ok(false),
            Action::Create { data } => {
                let payload = RecordPayload::new(domain, subdomain, data.as_str(), record_type, self.ttl);
                let status = provider.create_record(domain, &payload).await?;

                if status == STATUS_CREATED {
                    info!(
                        "Successfully created {} record for {} with ip {}",
                        record_type, subdomain, data
                    );
                    Ok(true)
                } else {
                    error!(
                        "Unable to create {} record for {} (HTTP {})",
                        record_type, subdomain, status
                    );
                    Ok(false)
                }
            }
            Action::Update { record_id, data } => {
                let payload = RecordPayload::new(domain, subdomain, data.as_str(), record_type, self.ttl);
                let status = provider.update_record(domain, record_id, &payload).await?;

                if status == STATUS_OK {
                    info!(
                        "Successfully updated {} record for {} to {}",
                        record_type, subdomain, data
                    );
                    Ok(true)
                } else {
                    error!(
                        "Unable to update {} record for {} (HTTP {})",
                        record_type, subdomain, status
                    );
                    Ok(false)
                }
            }
        }
    }
}
