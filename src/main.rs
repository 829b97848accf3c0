//! Egress hub daemon (v1)
//!
//! Hosts the hub, its health monitor, and the admin API.
//!
//! # Architecture Overview
//!
//! ```text
//!   caller (download jobs, metadata lookups)
//!      │ dispatch(request)
//!      ▼
//!   ┌────────────┐  list_enabled   ┌──────────────┐
//!   │ Dispatcher │ ──────────────▶ │ PathRegistry │ ◀── admin API
//!   └─────┬──────┘ ◀── outcomes ── └──────▲───────┘     (snapshot, enable/disable)
//!         │ execute(path)                 │ probe / rehabilitate
//!         ▼                               │
//!   ┌──────────────┐               ┌──────┴────────┐
//!   │ PathExecutor │ ◀──────────── │ HealthMonitor │ (every 60s)
//!   └─────┬────────┘               └───────────────┘
//!         ├──▶ direct
//!         ├──▶ scraperapi  (api key exchange)
//!         ├──▶ brightdata  (proxy authorization)
//!         └──▶ relay       (bearer token + forwarded-for)
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use egress_hub::admin::setup_admin_router;
use egress_hub::config::{load_config, watcher::ConfigWatcher, HubConfig};
use egress_hub::observability::{logging, metrics};
use egress_hub::{Hub, Shutdown};

#[derive(Parser)]
#[command(name = "egress-hub")]
#[command(about = "Outbound request hub with health-ranked network paths", long_about = None)]
struct Args {
    /// Path to a TOML config file. Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => HubConfig::default(),
    };

    logging::init_logging(&config.observability.log_level);
    tracing::info!("egress-hub v{} starting", env!("CARGO_PKG_VERSION"));

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let hub = Hub::from_config(config.clone())?;
    for path in hub.snapshot() {
        tracing::info!(
            path = %path.name,
            kind = ?path.kind,
            priority = path.priority,
            enabled = path.enabled,
            "Path registered"
        );
    }

    let shutdown = Shutdown::new();
    shutdown.trigger_on_signal();

    let monitor = hub.monitor();
    let monitor_task = tokio::spawn(monitor.run(shutdown.subscribe()));

    // Keep the watcher alive for the lifetime of the process.
    let _watcher = match &args.config {
        Some(path) => {
            let (watcher, mut updates) = ConfigWatcher::new(path);
            let reload_hub = hub.clone();
            let mut reload_shutdown = shutdown.subscribe();
            tokio::spawn(async move {
                loop {
                    tokio::select! {
                        Some(new_config) = updates.recv() => reload_hub.apply_reload(&new_config),
                        _ = reload_shutdown.recv() => break,
                    }
                }
            });
            match watcher.run() {
                Ok(w) => Some(w),
                Err(e) => {
                    tracing::error!(
                        error = %e,
                        "Config watcher failed to start, hot reload disabled"
                    );
                    None
                }
            }
        }
        None => None,
    };

    if config.admin.enabled {
        let listener = TcpListener::bind(&config.admin.bind_address).await?;
        tracing::info!(address = %listener.local_addr()?, "Admin API listening");
        let app = setup_admin_router(hub.clone(), &config.admin.api_key);
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown.notified())
            .await?;
    } else {
        shutdown.notified().await;
    }

    let _ = monitor_task.await;
    tracing::info!("Shutdown complete");
    Ok(())
}
