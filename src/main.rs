//! pakserve: HTTP download server for game assets.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ───────▶ net listener ──▶ http server ──▶ delivery engine
//!                                                 │
//!                          ┌──────────────────────┤
//!                          ▼                      ▼
//!                 routing table (ArcSwap)   access gates
//!                          │
//!                          ▼
//!              backing stores: PAK / PKZ archives, directories
//!
//!     SIGHUP / directory watcher ──▶ reload loop ──▶ rescan ──▶ publish table
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderValue;
use clap::Parser;
use tokio::sync::mpsc;

use pakserve::config::{load_config, DirectoryWatcher};
use pakserve::http::{DeliveryEngine, HttpServer};
use pakserve::lifecycle::{
    forward_reload_signals, run_reload_loop, shutdown_signal, ReloadCoordinator, Shutdown,
};
use pakserve::net::ListenerSet;
use pakserve::observability::{logging, metrics};

#[derive(Debug, Parser)]
#[command(name = "pakserve", version, about = "Serve game assets from PAK/PKZ archives")]
struct Args {
    /// Configuration file (TOML, or JSON when it ends in .json).
    #[arg(short, long, default_value = "pakserve.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_config(&args.config)?;

    logging::init(&config.logging);
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %args.config.display(),
        "pakserve starting"
    );

    if config.metrics.enabled {
        let addr: SocketAddr = config.metrics.listen.parse()?;
        metrics::init_metrics(addr)?;
    }

    let specs = config.route_specs()?;
    let directory_rules = config.directory_rules();
    let coordinator = tokio::task::spawn_blocking(move || {
        ReloadCoordinator::new(specs, directory_rules)
    })
    .await??;
    let coordinator = Arc::new(coordinator);

    let shutdown = Shutdown::new();
    let (trigger_tx, trigger_rx) = mpsc::unbounded_channel();

    let reload_coordinator = Arc::clone(&coordinator);
    let debounce = Duration::from_millis(config.reload.debounce_ms);
    let reload_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        if let Err(e) = run_reload_loop(reload_coordinator, trigger_rx, debounce, reload_shutdown).await {
            tracing::error!(error = %e, "Search directory unavailable, exiting");
            std::process::exit(1);
        }
    });

    let signal_tx = trigger_tx.clone();
    let signal_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        if let Err(e) = forward_reload_signals(signal_tx, signal_shutdown).await {
            tracing::error!(error = %e, "Failed to listen for SIGHUP");
        }
    });

    let _watcher = if config.reload.watch_directories {
        let directories = config
            .search_paths
            .iter()
            .flat_map(|sp| sp.directories.iter().cloned());
        Some(DirectoryWatcher::new(directories, trigger_tx.clone()).run()?)
    } else {
        None
    };

    let engine = Arc::new(DeliveryEngine::new(
        Arc::clone(&coordinator),
        config.access_policy()?,
        config.referer_check()?,
        HeaderValue::from_str(&config.content_type)?,
    ));

    let listeners = ListenerSet::from_config(&config).await?;

    let stopper = shutdown.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        stopper.trigger();
    });

    HttpServer::new(engine).run(listeners, &shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
