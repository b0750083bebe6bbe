//! Test doubles and common utilities for contract tests
//!
//! The doubles here stand in for the IP echo services and the provider API.
//! They answer from in-memory tables and count every call so tests can assert
//! on which network calls a cycle would have made.

#![allow(dead_code)]

use ddns_core::config::{DdnsConfig, DomainConfig, ProviderConfig};
use ddns_core::error::{Error, Result};
use ddns_core::traits::{
    DnsProvider, DnsProviderFactory, DnsRecord, IpSource, RecordListing, RecordPayload, RecordType,
};
use std::collections::{HashMap, HashSet};
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;

pub const IPV4_ENDPOINT: &str = "http://ipv4.test";
pub const IPV6_ENDPOINT: &str = "http://ipv6.test";

/// An IpSource answering from a fixed table
#[derive(Clone, Default)]
pub struct ScriptedIpSource {
    answers: Arc<Mutex<HashMap<String, Option<String>>>>,
    fetch_count: Arc<AtomicUsize>,
}

impl ScriptedIpSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `endpoint` with `body`
    pub fn answer(self, endpoint: &str, body: &str) -> Self {
        self.answers
            .lock()
            .unwrap()
            .insert(endpoint.to_string(), Some(body.to_string()));
        self
    }

    /// Fail every request to `endpoint`
    pub fn fail(self, endpoint: &str) -> Self {
        self.answers.lock().unwrap().insert(endpoint.to_string(), None);
        self
    }

    pub fn fetch_count(&self) -> usize {
        self.fetch_count.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl IpSource for ScriptedIpSource {
    async fn fetch(&self, endpoint: &str) -> Result<String> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);
        match self.answers.lock().unwrap().get(endpoint) {
            Some(Some(body)) => Ok(body.clone()),
            Some(None) => Err(Error::ip_source(format!("HTTP status 503 from {}", endpoint))),
            None => Err(Error::http(format!("connection refused: {}", endpoint))),
        }
    }
}

/// A provider call as observed by [`FakeProvider`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCall {
    List {
        domain: String,
        name: String,
    },
    Create {
        domain: String,
        payload: RecordPayload,
    },
    Update {
        domain: String,
        record_id: String,
        payload: RecordPayload,
    },
}

impl ProviderCall {
    pub fn is_write(&self) -> bool {
        !matches!(self, ProviderCall::List { .. })
    }

    pub fn domain(&self) -> &str {
        match self {
            ProviderCall::List { domain, .. }
            | ProviderCall::Create { domain, .. }
            | ProviderCall::Update { domain, .. } => domain,
        }
    }
}

#[derive(Default)]
struct FakeState {
    /// (domain, record) pairs; record names are relative to the domain
    records: Vec<(String, DnsRecord)>,
    next_id: u64,
    calls: Vec<ProviderCall>,
    unreachable_domains: HashSet<String>,
    unavailable_names: HashSet<String>,
    unreachable_writes: HashSet<String>,
    create_status: Option<u16>,
    update_status: Option<u16>,
}

/// An in-memory provider with call recording and failure injection
///
/// Clones share state, so a test can keep one handle while the engine owns
/// another.
#[derive(Clone, Default)]
pub struct FakeProvider {
    state: Arc<Mutex<FakeState>>,
}

impl FakeProvider {
    pub fn new() -> Self {
        let provider = Self::default();
        provider.state.lock().unwrap().next_id = 100;
        provider
    }

    /// Seed an existing record
    pub fn with_record(self, domain: &str, id: &str, record_type: RecordType, name: &str, data: &str) -> Self {
        self.state.lock().unwrap().records.push((
            domain.to_string(),
            DnsRecord {
                id: id.to_string(),
                record_type,
                name: name.to_string(),
                data: data.to_string(),
                ttl: 3600,
            },
        ));
        self
    }

    /// Every call for `domain` fails at the transport level
    pub fn unreachable_domain(self, domain: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .unreachable_domains
            .insert(domain.to_string());
        self
    }

    /// Listing `subdomain` answers 404
    pub fn unavailable_name(self, subdomain: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .unavailable_names
            .insert(subdomain.to_string());
        self
    }

    /// Writes to relative `name` fail at the transport level
    pub fn unreachable_write(self, name: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .unreachable_writes
            .insert(name.to_string());
        self
    }

    /// Answer creates with `status` instead of 201
    pub fn create_status(self, status: u16) -> Self {
        self.state.lock().unwrap().create_status = Some(status);
        self
    }

    /// Answer updates with `status` instead of 200
    pub fn update_status(self, status: u16) -> Self {
        self.state.lock().unwrap().update_status = Some(status);
        self
    }

    pub fn calls(&self) -> Vec<ProviderCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn writes(&self) -> Vec<ProviderCall> {
        self.calls().into_iter().filter(ProviderCall::is_write).collect()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    /// Records currently held for `domain`
    pub fn records(&self, domain: &str) -> Vec<DnsRecord> {
        self.state
            .lock()
            .unwrap()
            .records
            .iter()
            .filter(|(d, _)| d == domain)
            .map(|(_, r)| r.clone())
            .collect()
    }
}

fn relative_name(domain: &str, subdomain: &str) -> String {
    subdomain
        .strip_suffix(format!(".{}", domain).as_str())
        .unwrap_or(subdomain)
        .to_string()
}

#[async_trait::async_trait]
impl DnsProvider for FakeProvider {
    async fn list_records(&self, domain: &str, name: &str) -> Result<RecordListing> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(ProviderCall::List {
            domain: domain.to_string(),
            name: name.to_string(),
        });

        if state.unreachable_domains.contains(domain) {
            return Err(Error::http("connection reset by peer"));
        }
        if state.unavailable_names.contains(name) {
            return Ok(RecordListing::Unavailable { status: 404 });
        }

        let relative = relative_name(domain, name);
        let records = state
            .records
            .iter()
            .filter(|(d, r)| d == domain && r.name == relative)
            .map(|(_, r)| r.clone())
            .collect();
        Ok(RecordListing::Found(records))
    }

    async fn create_record(&self, domain: &str, payload: &RecordPayload) -> Result<u16> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(ProviderCall::Create {
            domain: domain.to_string(),
            payload: payload.clone(),
        });

        if state.unreachable_domains.contains(domain) || state.unreachable_writes.contains(&payload.name) {
            return Err(Error::http("connection reset by peer"));
        }
        if let Some(status) = state.create_status {
            return Ok(status);
        }

        state.next_id += 1;
        let record = DnsRecord {
            id: state.next_id.to_string(),
            record_type: payload.record_type,
            name: payload.name.clone(),
            data: payload.data.clone(),
            ttl: payload.ttl,
        };
        state.records.push((domain.to_string(), record));
        Ok(201)
    }

    async fn update_record(&self, domain: &str, record_id: &str, payload: &RecordPayload) -> Result<u16> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(ProviderCall::Update {
            domain: domain.to_string(),
            record_id: record_id.to_string(),
            payload: payload.clone(),
        });

        if state.unreachable_domains.contains(domain) || state.unreachable_writes.contains(&payload.name) {
            return Err(Error::http("connection reset by peer"));
        }
        if let Some(status) = state.update_status {
            return Ok(status);
        }

        match state
            .records
            .iter_mut()
            .find(|(d, r)| d == domain && r.id == record_id)
        {
            Some((_, record)) => {
                record.data = payload.data.clone();
                record.ttl = payload.ttl;
                Ok(200)
            }
            None => Ok(404),
        }
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }
}

/// A factory handing out clones of one [`FakeProvider`]
#[derive(Clone)]
pub struct FakeProviderFactory {
    provider: FakeProvider,
    created: Arc<AtomicUsize>,
    tokens: Arc<Mutex<Vec<String>>>,
}

impl FakeProviderFactory {
    pub fn new(provider: FakeProvider) -> Self {
        Self {
            provider,
            created: Arc::new(AtomicUsize::new(0)),
            tokens: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Number of providers built so far
    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    pub fn tokens(&self) -> Vec<String> {
        self.tokens.lock().unwrap().clone()
    }
}

impl DnsProviderFactory for FakeProviderFactory {
    fn create(&self, config: &ProviderConfig) -> Result<Box<dyn DnsProvider>> {
        self.created.fetch_add(1, Ordering::SeqCst);
        self.tokens.lock().unwrap().push(config.api_token.clone());
        Ok(Box::new(self.provider.clone()))
    }
}

/// Captures formatted log output of the current thread
#[derive(Clone, Default)]
pub struct LogCapture {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl LogCapture {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buffer.lock().unwrap()).into_owned()
    }

    /// Lines containing every one of `needles`
    pub fn lines_with(&self, needles: &[&str]) -> Vec<String> {
        self.contents()
            .lines()
            .filter(|line| needles.iter().all(|n| line.contains(n)))
            .map(str::to_string)
            .collect()
    }
}

impl Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = LogCapture;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Install a capturing subscriber for the current thread
///
/// `#[tokio::test]` runs on a current-thread runtime, so everything the test
/// awaits logs through this subscriber until the guard is dropped.
pub fn capture_logs() -> (LogCapture, tracing::subscriber::DefaultGuard) {
    let capture = LogCapture::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(capture.clone())
        .with_max_level(tracing::Level::TRACE)
        .with_ansi(false)
        .finish();
    let guard = tracing::subscriber::set_default(subscriber);
    (capture, guard)
}

/// A configuration managing `domains`, with both echo endpoints set
pub fn config_for(domains: Vec<DomainConfig>) -> DdnsConfig {
    DdnsConfig {
        api_key: Some("test_api_key".to_string()),
        domains,
        ipv4_server: Some(IPV4_ENDPOINT.to_string()),
        ipv6_server: Some(IPV6_ENDPOINT.to_string()),
        ttl: 3600,
        frequency_secs: 0,
        dry_run: false,
        log_level: "info".to_string(),
    }
}

/// The `test.com` domain used throughout the contract tests
pub fn test_domain() -> DomainConfig {
    DomainConfig::new("test.com", ["www.test.com", "mail.test.com"])
}
