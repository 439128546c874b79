//! Search path resolution.
//!
//! # Data Flow
//! ```text
//! Request path
//!     → matcher.rs (clean + lowercase, anchored pattern match)
//!     → table.rs (longest match wins, strip prefix)
//!     → Resolution { backing stores, asset path } or NoRoute / EmptyAssetPath
//!
//! Table Compilation (startup and every reload):
//!     [search_paths] config
//!     → scan each directory (crate::archive)
//!     → CompiledRoute { pattern, backing stores }
//!     → Freeze as immutable RoutingTable
//! ```
//!
//! # Design Decisions
//! - Tables are immutable after construction and swapped whole on reload
//! - Longest match wins so a catch-all `^/` route can coexist with specific ones
//! - Ties go to the route registered first

pub mod matcher;
pub mod table;

pub use matcher::{clean_request_path, RoutePattern};
pub use table::{CompiledRoute, Resolution, ResolveError, RouteSpec, RoutingTable};
