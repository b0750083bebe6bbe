//! Record reconciliation
//!
//! [`decide`] compares what the provider holds with what the cycle resolved
//! and picks the single action needed to converge. It performs no I/O.
//!
//! | desired | current            | action                    |
//! |---------|--------------------|---------------------------|
//! | absent  | any                | `NoOp`                    |
//! | `X`     | absent             | `Create(X)`               |
//! | `X`     | data `X`           | `NoOp`                    |
//! | `Y`     | data `X`, id `i`   | `Update { id: i, data: Y }` |
//!
//! An address family that failed to resolve never touches its records.

use crate::resolver::IpAddress;
use crate::traits::DnsRecord;

/// What to do with one record this cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Leave the record as it is
    NoOp,
    /// Create a record holding `data`
    Create { data: String },
    /// Replace the data of record `record_id`
    Update { record_id: String, data: String },
}

impl Action {
    /// True when the action needs a provider call
    pub fn is_write(&self) -> bool {
        !matches!(self, Action::NoOp)
    }
}

/// Decide the action for one record type of one subdomain
pub fn decide(current: Option<&DnsRecord>, desired: Option<&IpAddress>) -> Action {
    let Some(desired) = desired else {
        return Action::NoOp;
    };

    match current {
        None => Action::Create {
            data: desired.as_str().to_string(),
        },
        Some(record) if record.data == desired.as_str() => Action::NoOp,
        Some(record) => Action::Update {
            record_id: record.id.clone(),
            data: desired.as_str().to_string(),
        },
    }
}
