//! Core DDNS engine
//!
//! The DdnsEngine runs update cycles. One cycle:
//!
//! ```text
//!  Idle ──► Resolving ──► Reading ──► Writing ──► Done
//!              │             │  ▲         │
//!              │             │  └─────────┘  (next subdomain / domain)
//!              ▼             ▼
//!       no address /    provider API error:
//!       no API key:     abandon this domain,
//!       end cycle       continue with the next
//! ```
//!
//! ## Cycle Flow
//!
//! 1. Resolve IPv4 and IPv6 through the [`IpResolver`]
//! 2. Build a provider for this cycle (requires an API key)
//! 3. Per domain, read the current records of every subdomain
//! 4. Per subdomain, [`decide`] the A and AAAA actions
//! 5. Apply non-trivial actions through the [`RecordWriter`]
//!
//! Nothing is carried from one cycle to the next: the provider is re-read
//! every time, so a failed write is retried simply by running again.

use std::future::Future;

use chrono::{DateTime, Utc};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::config::{DdnsConfig, DomainConfig};
use crate::error::Result;
use crate::reconcile::decide;
use crate::records::{RecordWriter, SubdomainState, fetch_current_records};
use crate::resolver::{IpResolver, ResolvedAddresses};
use crate::traits::{DnsProvider, DnsProviderFactory, IpSource, RecordType};

/// Phase of a running cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CyclePhase {
    /// Between cycles
    Idle,
    Resolving,
    Reading,
    Writing,
    Done,
}

/// How a cycle ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Every configured domain was visited (some may have failed)
    Completed,
    /// Neither address family resolved; no provider calls were made
    NoAddress,
    /// No API key configured; no provider calls were made
    MissingCredentials,
    /// The provider client could not be built; no provider calls were made
    ProviderUnavailable,
}

/// Summary of one cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    /// When the cycle started
    pub started_at: DateTime<Utc>,
    /// How the cycle ended
    pub outcome: CycleOutcome,
    /// Whether at least one record was created or updated
    pub updated: bool,
    /// Domains abandoned after a provider API error
    pub failed_domains: Vec<String>,
}

impl CycleReport {
    fn new(started_at: DateTime<Utc>, outcome: CycleOutcome) -> Self {
        Self {
            started_at,
            outcome,
            updated: false,
            failed_domains: Vec::new(),
        }
    }
}

/// Core DDNS engine
///
/// ## Lifecycle
///
/// 1. Create with [`DdnsEngine::new()`]
/// 2. Either call [`DdnsEngine::run_cycle()`] from your own scheduler, or
///    hand scheduling to [`DdnsEngine::run()`] / [`DdnsEngine::run_until()`]
///
/// ## Threading
///
/// Cycles never overlap: the run loop awaits each cycle before waiting for
/// the next tick, and a cycle processes domains and subdomains sequentially.
pub struct DdnsEngine {
    /// Public address resolution
    resolver: IpResolver,

    /// Builds the provider client at the start of each cycle
    provider_factory: Box<dyn DnsProviderFactory>,

    /// Record create/update calls
    writer: RecordWriter,

    /// Immutable process configuration
    config: DdnsConfig,
}

impl DdnsEngine {
    /// Create a new DDNS engine
    ///
    /// # Parameters
    ///
    /// - `ip_source`: Transport for the IP echo services
    /// - `provider_factory`: Builds the DNS provider client
    /// - `config`: DDNS configuration
    pub fn new(
        ip_source: Box<dyn IpSource>,
        provider_factory: Box<dyn DnsProviderFactory>,
        config: DdnsConfig,
    ) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            resolver: IpResolver::from_config(ip_source, &config),
            provider_factory,
            writer: RecordWriter::new(config.ttl),
            config,
        })
    }

    /// The configuration this engine runs with
    pub fn config(&self) -> &DdnsConfig {
        &self.config
    }

    /// Run cycles until Ctrl-C
    pub async fn run(&self) {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Unable to listen for Ctrl-C ({}), running until killed", e);
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Run one cycle now, then one per configured interval until `shutdown`
    /// resolves
    ///
    /// With a non-positive `FREQUENCY` only the first cycle runs. Shutdown is
    /// only observed between cycles; a cycle in progress always completes.
    pub async fn run_until<F>(&self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        info!("Starting DDNS cycle loop ({} domain(s))", self.config.domains.len());
        self.run_cycle().await;

        let Some(period) = self.config.frequency() else {
            info!("FREQUENCY is not positive, not scheduling further cycles");
            return;
        };

        debug!("Next cycles every {:?}", period);
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                biased;

                _ = &mut shutdown => {
                    info!("Shutdown signal received");
                    break;
                }

                _ = ticker.tick() => {
                    self.run_cycle().await;
                }
            }
        }
    }

    /// Run a single resolve → read → reconcile → write cycle
    ///
    /// Never fails: every error is logged and folded into the report.
    pub async fn run_cycle(&self) -> CycleReport {
        let started_at = Utc::now();
        enter(CyclePhase::Resolving);
        let addresses = self.resolver.resolve_all().await;
        if addresses.is_empty() {
            error!("Unable to get IP from any server");
            return self.finish(CycleReport::new(started_at, CycleOutcome::NoAddress));
        }

        let Some(provider_config) = self.config.provider_config() else {
            error!(severity = "critical", "API_KEY environment variable not set");
            return self.finish(CycleReport::new(started_at, CycleOutcome::MissingCredentials));
        };

        let provider = match self.provider_factory.create(&provider_config) {
            Ok(provider) => provider,
            Err(e) => {
                error!("Unable to create DNS provider: {}", e);
                return self.finish(CycleReport::new(started_at, CycleOutcome::ProviderUnavailable));
            }
        };

        let mut report = CycleReport::new(started_at, CycleOutcome::Completed);
        for domain in &self.config.domains {
            if let Err(e) = self
                .sync_domain(provider.as_ref(), domain, &addresses, &mut report.updated)
                .await
            {
                error!(
                    "{} API error while processing {}: {}",
                    provider.provider_name(),
                    domain.domain,
                    e
                );
                report.failed_domains.push(domain.domain.clone());
            }
        }

        self.finish(report)
    }

    /// Reconcile every subdomain of one domain
    ///
    /// Every accepted write sets `updated` as soon as it happens, so writes
    /// made before a provider API failure still count. An `Err` means the
    /// provider API failed; subdomains not yet written are left for the next
    /// cycle.
    async fn sync_domain(
        &self,
        provider: &dyn DnsProvider,
        domain: &DomainConfig,
        addresses: &ResolvedAddresses,
        updated: &mut bool,
    ) -> Result<()> {
        enter(CyclePhase::Reading);
        let current = fetch_current_records(provider, &domain.domain, &domain.subdomains).await?;

        for subdomain in &domain.subdomains {
            let Some(state) = current.get(subdomain) else {
                info!("Subdomain {} not found in current DNS data", subdomain);
                continue;
            };

            self.sync_subdomain(provider, &domain.domain, subdomain, state, addresses, updated)
                .await?;
        }

        Ok(())
    }

    async fn sync_subdomain(
        &self,
        provider: &dyn DnsProvider,
        domain: &str,
        subdomain: &str,
        state: &SubdomainState,
        addresses: &ResolvedAddresses,
        updated: &mut bool,
    ) -> Result<()> {
        for record_type in RecordType::ALL {
            let action = decide(state.record(record_type), addresses.for_type(record_type));
            if !action.is_write() {
                debug!("{} record for {} is up to date", record_type, subdomain);
                continue;
            }

            enter(CyclePhase::Writing);
            if self
                .writer
                .apply(provider, domain, subdomain, &action, record_type)
                .await?
            {
                *updated = true;
            }
        }

        Ok(())
    }

    fn finish(&self, report: CycleReport) -> CycleReport {
        enter(CyclePhase::Done);
        enter(CyclePhase::Idle);
        if report.outcome == CycleOutcome::Completed && !report.updated {
            info!("No records were updated");
        }
        report
    }
}

fn enter(phase: CyclePhase) {
    debug!(phase = ?phase, "DDNS cycle phase");
}
