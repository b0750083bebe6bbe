//! Contract Test: Reconciliation Decisions
//!
//! Verifies the create / update / no-op table over a spread of record states
//! and addresses, for both record types.
//!
//! Constraints verified:
//! - A missing record is created with the resolved address
//! - Unchanged data never produces a write
//! - Changed data updates the existing record in place
//! - An unresolved address never produces any action

use ddns_core::reconcile::{Action, decide};
use ddns_core::resolver::IpAddress;
use ddns_core::traits::{DnsRecord, RecordType};

const ADDRESSES: &[&str] = &[
    "1.2.3.4",
    "1.2.3.5",
    "10.0.0.1",
    "2001:0db8:85a3:0000:0000:8a2e:0370:7334",
    "2001:db8::1",
];

fn record(id: &str, record_type: RecordType, data: &str) -> DnsRecord {
    DnsRecord {
        id: id.to_string(),
        record_type,
        name: "www".to_string(),
        data: data.to_string(),
        ttl: 3600,
    }
}

fn ip(raw: &str) -> IpAddress {
    IpAddress::parse(raw).expect("test address is not blank")
}

#[test]
fn absent_record_is_always_created() {
    for desired in ADDRESSES {
        assert_eq!(
            decide(None, Some(&ip(desired))),
            Action::Create {
                data: desired.to_string()
            },
            "desired={}",
            desired
        );
    }
}

#[test]
fn same_data_is_always_a_noop() {
    for record_type in RecordType::ALL {
        for data in ADDRESSES {
            let current = record("1", record_type, data);
            assert_eq!(
                decide(Some(&current), Some(&ip(data))),
                Action::NoOp,
                "type={} data={}",
                record_type,
                data
            );
        }
    }
}

#[test]
fn different_data_is_always_an_update_of_the_same_record() {
    for (i, old) in ADDRESSES.iter().enumerate() {
        for new in ADDRESSES.iter().filter(|new| *new != old) {
            let id = format!("{}", i + 1);
            let current = record(&id, RecordType::A, old);
            assert_eq!(
                decide(Some(&current), Some(&ip(new))),
                Action::Update {
                    record_id: id.clone(),
                    data: new.to_string()
                },
                "old={} new={}",
                old,
                new
            );
        }
    }
}

#[test]
fn unresolved_address_never_acts() {
    assert_eq!(decide(None, None), Action::NoOp);
    for data in ADDRESSES {
        let current = record("1", RecordType::Aaaa, data);
        assert_eq!(decide(Some(&current), None), Action::NoOp, "data={}", data);
    }
}

#[test]
fn resolved_whitespace_does_not_cause_spurious_updates() {
    // Echo services end their body with a newline.
    let current = record("1", RecordType::A, "1.2.3.4");
    let desired = IpAddress::parse("1.2.3.4\n").unwrap();
    assert_eq!(decide(Some(&current), Some(&desired)), Action::NoOp);
}
