// # ddnsd - DDNS Daemon
//
// Thin integration layer over `ddns-core`. The daemon is responsible for:
// 1. Reading configuration from environment variables
// 2. Initializing logging (once, for the process lifetime)
// 3. Wiring the HTTP IP source and the DigitalOcean provider
// 4. Running the engine: one cycle at startup, then every FREQUENCY seconds
//
// ## Configuration
//
// - `API_KEY`: DigitalOcean API token (cycles log a critical error without it)
// - `DOMAINS`: JSON list, e.g. `[{"domain": "example.com", "subdomains": ["www.example.com"]}]`
// - `IPV4_SERVER`: IPv4 echo service (default: https://ipv4.icanhazip.com)
// - `IPV6_SERVER`: IPv6 echo service (IPv6 records are left alone when unset)
// - `TTL`: TTL for written records (default: 3600)
// - `FREQUENCY`: Seconds between cycles (default: 3600; `<= 0` runs once)
// - `DRY_RUN`: Log writes instead of sending them (default: false)
// - `LOG_LEVEL`: trace, debug, info, warn, error (default: info)
//
// ## Example
//
// ```bash
// export API_KEY=your_token
// export DOMAINS='[{"domain": "example.com", "subdomains": ["www.example.com"]}]'
// export IPV6_SERVER=https://ipv6.icanhazip.com
//
// ddnsd
// ```

use anyhow::Result;
use ddns_core::{DdnsConfig, DdnsEngine};
use ddns_ip_http::HttpIpSource;
use ddns_provider_digitalocean::DigitalOceanFactory;
use std::process::ExitCode;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum DdnsExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<DdnsExitCode> for ExitCode {
    fn from(code: DdnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

fn log_level(name: &str) -> Level {
    match name {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

fn main() -> ExitCode {
    let config = match DdnsConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return DdnsExitCode::ConfigError.into();
        }
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level(&config.log_level))
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DdnsExitCode::ConfigError.into();
    }

    info!("Starting ddnsd daemon");
    info!("Configuration loaded: {} domain(s)", config.domains.len());

    // Cycles never overlap, so a single thread is all the daemon needs.
    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DdnsExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        match run_daemon(config).await {
            Ok(()) => DdnsExitCode::CleanShutdown,
            Err(e) => {
                error!("Daemon error: {}", e);
                DdnsExitCode::RuntimeError
            }
        }
    });

    result.into()
}

/// Run the daemon
async fn run_daemon(config: DdnsConfig) -> Result<()> {
    if config.api_key.is_none() {
        warn!("API_KEY is not set; every cycle will stop before contacting DigitalOcean");
    }
    if config.dry_run {
        warn!("DRY_RUN is enabled; records will not be modified");
    }

    for domain in &config.domains {
        for subdomain in &domain.subdomains {
            info!("Managing {} in {}", subdomain, domain.domain);
        }
    }
    match &config.ipv6_server {
        Some(server) => info!("IPv6 source: {}", server),
        None => info!("IPV6_SERVER not set, AAAA records are not managed"),
    }

    let engine = DdnsEngine::new(
        Box::new(HttpIpSource::new()?),
        Box::new(DigitalOceanFactory),
        config,
    )?;

    engine.run_until(wait_for_shutdown()).await;

    info!("Shutting down daemon");
    Ok(())
}

/// Wait for SIGTERM or SIGINT
///
/// If the handlers cannot be installed the daemon keeps running until killed.
#[cfg(unix)]
async fn wait_for_shutdown() {
    let (mut sigterm, mut sigint) = match (
        signal(SignalKind::terminate()),
        signal(SignalKind::interrupt()),
    ) {
        (Ok(sigterm), Ok(sigint)) => (sigterm, sigint),
        (Err(e), _) | (_, Err(e)) => {
            warn!("Failed to set up signal handlers: {}", e);
            return std::future::pending().await;
        }
    };

    let name = tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    };
    info!("Received shutdown signal: {}", name);
}

/// Wait for Ctrl-C
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn wait_for_shutdown() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received shutdown signal: SIGINT"),
        Err(e) => {
            warn!("Failed to wait for CTRL-C: {}", e);
            std::future::pending::<()>().await
        }
    }
}
