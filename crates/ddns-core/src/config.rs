//! Configuration types for the DDNS updater
//!
//! Configuration is environment-style key/value data, loaded once at process
//! start and immutable afterwards:
//!
//! | Key           | Default                      | Meaning                                  |
//! |---------------|------------------------------|------------------------------------------|
//! | `API_KEY`     | none                         | Provider bearer token                    |
//! | `DOMAINS`     | `[]`                         | JSON array of `{domain, subdomains[]}`   |
//! | `IPV4_SERVER` | `https://ipv4.icanhazip.com` | IPv4 echo service                        |
//! | `IPV6_SERVER` | none                         | IPv6 echo service (IPv6 off when unset)  |
//! | `TTL`         | `3600`                       | TTL for created/updated records          |
//! | `FREQUENCY`   | `3600`                       | Seconds between cycles, `<= 0` runs once |
//! | `DRY_RUN`     | `false`                      | Log writes instead of sending them       |
//! | `LOG_LEVEL`   | `info`                       | Daemon log level                         |
//!
//! A missing `API_KEY` is not a load error: every cycle reports it instead.

use serde::Deserialize;
use std::time::Duration;

use crate::error::{Error, Result};

/// IPv4 echo service used when `IPV4_SERVER` is not set
pub const DEFAULT_IPV4_SERVER: &str = "https://ipv4.icanhazip.com";

/// TTL applied to written records when `TTL` is not set
pub const DEFAULT_TTL: u32 = 3600;

/// Smallest TTL the provider accepts
pub const MIN_TTL: u32 = 30;

/// Cycle interval when `FREQUENCY` is not set
pub const DEFAULT_FREQUENCY_SECS: i64 = 3600;

/// A domain and the subdomains managed under it
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DomainConfig {
    /// Zone name at the provider (e.g. "example.com")
    pub domain: String,

    /// Fully-qualified names to manage, in processing order
    #[serde(default)]
    pub subdomains: Vec<String>,
}

impl DomainConfig {
    /// Create a new domain configuration
    pub fn new<I, S>(domain: impl Into<String>, subdomains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            domain: domain.into(),
            subdomains: subdomains.into_iter().map(Into::into).collect(),
        }
    }
}

/// Credentials and switches handed to a provider factory each cycle
#[derive(Clone)]
pub struct ProviderConfig {
    /// Provider API token
    pub api_token: String,

    /// Perform reads but only log the writes
    pub dry_run: bool,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_token", &"<REDACTED>")
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

/// Main DDNS configuration
#[derive(Clone)]
pub struct DdnsConfig {
    /// Provider API key (`API_KEY`)
    pub api_key: Option<String>,

    /// Domains to manage (`DOMAINS`)
    pub domains: Vec<DomainConfig>,

    /// IPv4 echo endpoint (`IPV4_SERVER`)
    pub ipv4_server: Option<String>,

    /// IPv6 echo endpoint (`IPV6_SERVER`)
    pub ipv6_server: Option<String>,

    /// TTL for written records (`TTL`)
    pub ttl: u32,

    /// Seconds between cycles (`FREQUENCY`)
    pub frequency_secs: i64,

    /// Dry-run mode (`DRY_RUN`)
    pub dry_run: bool,

    /// Log level for the daemon (`LOG_LEVEL`)
    pub log_level: String,
}

// The API key never reaches logs.
impl std::fmt::Debug for DdnsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DdnsConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<REDACTED>"))
            .field("domains", &self.domains)
            .field("ipv4_server", &self.ipv4_server)
            .field("ipv6_server", &self.ipv6_server)
            .field("ttl", &self.ttl)
            .field("frequency_secs", &self.frequency_secs)
            .field("dry_run", &self.dry_run)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl DdnsConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self {
            api_key: None,
            domains: Vec::new(),
            ipv4_server: Some(DEFAULT_IPV4_SERVER.to_string()),
            ipv6_server: None,
            ttl: DEFAULT_TTL,
            frequency_secs: DEFAULT_FREQUENCY_SECS,
            dry_run: false,
            log_level: "info".to_string(),
        }
    }

    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from any key/value lookup
    ///
    /// Empty values are treated as unset. The result is validated before it
    /// is returned.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::new();
        config.api_key = get("API_KEY");

        if let Some(raw) = get("DOMAINS") {
            config.domains = serde_json::from_str(&raw)
                .map_err(|e| Error::config(format!("DOMAINS is not a valid domain list: {}", e)))?;
        }

        if let Some(server) = lookup("IPV4_SERVER") {
            let server = server.trim();
            config.ipv4_server = (!server.is_empty()).then(|| server.to_string());
        }
        config.ipv6_server = get("IPV6_SERVER");

        if let Some(raw) = get("TTL") {
            config.ttl = raw
                .parse()
                .map_err(|_| Error::config(format!("TTL must be a positive integer. Got: {}", raw)))?;
        }

        if let Some(raw) = get("FREQUENCY") {
            config.frequency_secs = raw
                .parse()
                .map_err(|_| Error::config(format!("FREQUENCY must be an integer. Got: {}", raw)))?;
        }

        if let Some(raw) = get("DRY_RUN") {
            config.dry_run = parse_flag(&raw)
                .ok_or_else(|| Error::config(format!("DRY_RUN must be true or false. Got: {}", raw)))?;
        }

        if let Some(level) = get("LOG_LEVEL") {
            config.log_level = level.to_lowercase();
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.ttl < MIN_TTL {
            return Err(Error::config(format!(
                "TTL must be at least {} seconds. Got: {}",
                MIN_TTL, self.ttl
            )));
        }

        for domain in &self.domains {
            if domain.domain.trim().is_empty() {
                return Err(Error::config("DOMAINS entry has an empty domain name"));
            }
            if domain.subdomains.iter().any(|s| s.trim().is_empty()) {
                return Err(Error::config(format!(
                    "DOMAINS entry for {} has an empty subdomain",
                    domain.domain
                )));
            }
            // Each name is read once per cycle; a repeat would write from a stale read.
            let mut seen = std::collections::HashSet::new();
            if let Some(repeat) = domain.subdomains.iter().find(|s| !seen.insert(s.as_str())) {
                return Err(Error::config(format!(
                    "DOMAINS entry for {} lists {} more than once",
                    domain.domain, repeat
                )));
            }
        }

        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => {
                return Err(Error::config(format!(
                    "LOG_LEVEL '{}' is not valid. Valid levels: trace, debug, info, warn, error",
                    other
                )));
            }
        }

        Ok(())
    }

    /// Interval between cycles, or `None` when only one cycle should run
    pub fn frequency(&self) -> Option<Duration> {
        u64::try_from(self.frequency_secs)
            .ok()
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    /// Provider settings for this cycle, or `None` without an API key
    pub fn provider_config(&self) -> Option<ProviderConfig> {
        self.api_key.as_ref().map(|key| ProviderConfig {
            api_token: key.clone(),
            dry_run: self.dry_run,
        })
    }
}

impl Default for DdnsConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
