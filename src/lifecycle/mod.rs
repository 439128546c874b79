//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Reload (reload.rs):
//!     trigger (SIGHUP / directory change) → debounce → rescan → atomic publish
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop accepting → Drain connections → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//!     SIGHUP → Trigger reload
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then the initial scan, then listeners
//! - Shutdown has timeout: forced exit after deadline

pub mod reload;
pub mod shutdown;
pub mod signals;

pub use reload::{run_reload_loop, ReloadCoordinator, ReloadStats, ReloadTrigger};
pub use shutdown::Shutdown;
pub use signals::{forward_reload_signals, shutdown_signal};
