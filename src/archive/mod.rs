//! Archive set scanning.
//!
//! # Data Flow
//! ```text
//! search directory
//!     → order.rs (list *.pak / *.pkz, numbered paks first)
//!     → scanner.rs (PAK via crate::pak, PKZ via zip.rs)
//!     → entry.rs (Archive: normalized name → ArchiveEntry)
//!     → Vec<BackingStore> (archives, then optional Directory sentinel)
//! ```
//!
//! # Design Decisions
//! - Archives are immutable once scanned; a rescan builds new ones
//! - A bad archive is logged and skipped; an unreadable directory is fatal
//! - Scan results are cached per directory for one routing table build only

pub mod entry;
pub mod order;
pub mod scanner;
pub mod zip;

pub use entry::{Archive, ArchiveEntry, ArchiveKind, BackingStore, Compression};
pub use order::{archive_order, sort_archive_names};
pub use scanner::{scan_archive, ArchiveScanner, ScanError};
