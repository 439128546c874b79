//! Routing table publication and hot reload.
//!
//! # Responsibilities
//! - Build the initial routing table
//! - Rebuild it from scratch on demand and publish it atomically
//! - Serialize rebuilds and coalesce bursts of triggers
//!
//! # Design Decisions
//! - Readers load the current `Arc<RoutingTable>` without locking
//! - A failed rebuild never replaces the published table
//! - Old tables stay alive until the last in-flight request drops them

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use arc_swap::ArcSwap;
use tokio::sync::{broadcast, mpsc};

use crate::archive::ScanError;
use crate::observability::metrics;
use crate::routing::{Resolution, ResolveError, RouteSpec, RoutingTable};

/// Why a reload was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadTrigger {
    Signal,
    FilesystemChange,
}

/// Summary of one successful rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReloadStats {
    pub generation: u64,
    pub routes: usize,
    pub archives: usize,
    pub duration: Duration,
}

/// Owns the published routing table and rebuilds it on request.
#[derive(Debug)]
pub struct ReloadCoordinator {
    specs: Vec<RouteSpec>,
    directory_rules: bool,
    table: ArcSwap<RoutingTable>,
    generation: AtomicU64,
    reload_lock: Mutex<()>,
}

impl ReloadCoordinator {
    /// Scan everything once and publish the first table.
    pub fn new(specs: Vec<RouteSpec>, directory_rules: bool) -> Result<Self, ScanError> {
        let table = RoutingTable::build(&specs, directory_rules, 1)?;
        table.log_search_paths();
        metrics::set_archives_loaded(table.archive_count());

        Ok(Self {
            specs,
            directory_rules,
            table: ArcSwap::from_pointee(table),
            generation: AtomicU64::new(1),
            reload_lock: Mutex::new(()),
        })
    }

    /// Rebuild the table from scratch and publish it.
    ///
    /// Blocking: scans the filesystem. On error the previous table stays in place.
    pub fn reload(&self) -> Result<ReloadStats, ScanError> {
        let _guard = self
            .reload_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let start = Instant::now();
        let generation = self.generation.load(Ordering::Acquire) + 1;
        let table = RoutingTable::build(&self.specs, self.directory_rules, generation)?;
        table.log_search_paths();

        let stats = ReloadStats {
            generation,
            routes: table.routes().len(),
            archives: table.archive_count(),
            duration: start.elapsed(),
        };

        self.table.store(Arc::new(table));
        self.generation.store(generation, Ordering::Release);
        metrics::set_archives_loaded(stats.archives);

        Ok(stats)
    }

    /// Resolve against whatever table is current right now.
    pub fn resolve(&self, path: &str) -> Result<Resolution, ResolveError> {
        self.table.load().resolve(path)
    }

    /// The currently published table.
    pub fn snapshot(&self) -> Arc<RoutingTable> {
        self.table.load_full()
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }
}

/// Upper bound on a debounce window, in multiples of the quiet period.
pub const MAX_DEBOUNCE_FACTOR: u32 = 10;

/// Process reload triggers until shutdown or the trigger channel closes.
///
/// Triggers arriving within `debounce` of each other are folded into one
/// rebuild, but a steady stream of triggers delays it by at most
/// [`MAX_DEBOUNCE_FACTOR`] times `debounce`. A directory that cannot be
/// listed is fatal and ends the loop with the error.
pub async fn run_reload_loop(
    coordinator: Arc<ReloadCoordinator>,
    mut triggers: mpsc::UnboundedReceiver<ReloadTrigger>,
    debounce: Duration,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<(), ScanError> {
    loop {
        let trigger = tokio::select! {
            trigger = triggers.recv() => match trigger {
                Some(trigger) => trigger,
                None => return Ok(()),
            },
            _ = shutdown.recv() => return Ok(()),
        };

        // quiet period: keep absorbing triggers until none arrive for `debounce`
        let deadline = tokio::time::Instant::now() + debounce * MAX_DEBOUNCE_FACTOR;
        let mut coalesced = 1usize;
        loop {
            let quiet_until = (tokio::time::Instant::now() + debounce).min(deadline);
            match tokio::time::timeout_at(quiet_until, triggers.recv()).await {
                Ok(Some(_)) => coalesced += 1,
                Ok(None) | Err(_) => break,
            }
        }

        tracing::info!(trigger = ?trigger, coalesced, "Reloading search paths");

        let worker = Arc::clone(&coordinator);
        let result = match tokio::task::spawn_blocking(move || worker.reload()).await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(error = %e, "Reload task failed");
                metrics::record_reload(false, Duration::ZERO);
                continue;
            }
        };

        match result {
            Ok(stats) => {
                metrics::record_reload(true, stats.duration);
                tracing::info!(
                    generation = stats.generation,
                    routes = stats.routes,
                    archives = stats.archives,
                    duration_ms = stats.duration.as_millis() as u64,
                    "Reload complete"
                );
            }
            Err(e) if e.is_fatal() => {
                metrics::record_reload(false, Duration::ZERO);
                tracing::error!(error = %e, "Reload failed");
                return Err(e);
            }
            Err(e) => {
                metrics::record_reload(false, Duration::ZERO);
                tracing::warn!(error = %e, "Reload failed, keeping previous table");
            }
        }
    }
}
