//! Provider record access
//!
//! - [`reader`]: fetch the current A/AAAA records of each subdomain
//! - [`writer`]: carry out the create/update actions chosen by
//!   [`decide`](crate::reconcile::decide)

pub mod reader;
pub mod writer;

pub use reader::fetch_current_records;
pub use writer::RecordWriter;

use crate::traits::{DnsRecord, RecordType};

/// Current records of one subdomain, as read this cycle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubdomainState {
    pub a: Option<DnsRecord>,
    pub aaaa: Option<DnsRecord>,
}

impl SubdomainState {
    /// Partition a listing by type
    ///
    /// The first record of each type wins. Further records of the same type
    /// are ignored, not reported or cleaned up.
    pub fn from_records(records: impl IntoIterator<Item = DnsRecord>) -> Self {
        let mut state = Self::default();
        for record in records {
            let slot = match record.record_type {
                RecordType::A => &mut state.a,
                RecordType::Aaaa => &mut state.aaaa,
            };
            if slot.is_none() {
                *slot = Some(record);
            }
        }
        state
    }

    /// The managed record of `record_type`, if any
    pub fn record(&self, record_type: RecordType) -> Option<&DnsRecord> {
        match record_type {
            RecordType::A => self.a.as_ref(),
            RecordType::Aaaa => self.aaaa.as_ref(),
        }
    }
}
