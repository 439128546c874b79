//! OS signal handling.
//!
//! # Responsibilities
//! - SIGHUP → reload trigger
//! - SIGINT/SIGTERM → graceful shutdown
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - SIGHUP triggers a rescan, not shutdown

use tokio::sync::{broadcast, mpsc};

use super::reload::ReloadTrigger;

/// Forward SIGHUP to the reload loop until shutdown.
#[cfg(unix)]
pub async fn forward_reload_signals(
    triggers: mpsc::UnboundedSender<ReloadTrigger>,
    mut shutdown: broadcast::Receiver<()>,
) -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut hangup = signal(SignalKind::hangup())?;
    loop {
        tokio::select! {
            received = hangup.recv() => {
                if received.is_none() {
                    return Ok(());
                }
                tracing::info!("SIGHUP received");
                if triggers.send(ReloadTrigger::Signal).is_err() {
                    return Ok(());
                }
            }
            _ = shutdown.recv() => return Ok(()),
        }
    }
}

/// No reload signal exists on this platform.
#[cfg(not(unix))]
pub async fn forward_reload_signals(
    _triggers: mpsc::UnboundedSender<ReloadTrigger>,
    mut shutdown: broadcast::Receiver<()>,
) -> std::io::Result<()> {
    let _ = shutdown.recv().await;
    Ok(())
}

/// Resolve when SIGINT or SIGTERM arrives.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}
