//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → request_guard.rs (path separator tampering, referer pattern) → 403
//!     → [routing resolves asset path]
//!     → access_control.rs (archive gate, directory gate) → 404 when both reject
//! ```
//!
//! # Design Decisions
//! - Only pattern checks; no authentication
//! - Gate rejections look exactly like missing assets

pub mod access_control;
pub mod request_guard;

pub use access_control::{AccessDecision, AccessPolicy, ArchiveGate, DirectoryGate, PatternSet};
pub use request_guard::{has_foreign_separator, RefererCheck};
