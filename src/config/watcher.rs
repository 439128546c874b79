//! Search directory watcher for hot reload.

use std::path::PathBuf;
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::lifecycle::ReloadTrigger;

/// Watches every search directory and turns file changes into reload triggers.
pub struct DirectoryWatcher {
    directories: Vec<PathBuf>,
    trigger_tx: mpsc::UnboundedSender<ReloadTrigger>,
}

impl DirectoryWatcher {
    pub fn new(
        directories: impl IntoIterator<Item = PathBuf>,
        trigger_tx: mpsc::UnboundedSender<ReloadTrigger>,
    ) -> Self {
        let mut directories: Vec<PathBuf> = directories.into_iter().collect();
        directories.sort();
        directories.dedup();
        Self {
            directories,
            trigger_tx,
        }
    }

    /// Start watching. The returned watcher must be kept alive.
    ///
    /// Directories that cannot be watched are logged and skipped.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.trigger_tx;

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if event.kind.is_create() || event.kind.is_modify() || event.kind.is_remove() {
                        tracing::debug!(paths = ?event.paths, "Search directory changed");
                        let _ = tx.send(ReloadTrigger::FilesystemChange);
                    }
                }
                Err(e) => tracing::error!(error = %e, "Watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        for dir in &self.directories {
            match watcher.watch(dir, RecursiveMode::Recursive) {
                Ok(()) => tracing::info!(path = %dir.display(), "Watching search directory"),
                Err(e) => tracing::warn!(
                    path = %dir.display(),
                    error = %e,
                    "Cannot watch search directory"
                ),
            }
        }

        Ok(watcher)
    }
}
