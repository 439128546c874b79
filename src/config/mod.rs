//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, or JSON by extension)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ServeConfig (validated, immutable)
//!     → compiled into routes, gates, referer check
//!
//! While running:
//!     watcher.rs detects changes in search directories
//!     → reload trigger → lifecycle::reload rescans
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; reload only rescans directories
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, ConfigError};
pub use schema::{
    AccessConfig, LoggingConfig, MetricsConfig, ReloadConfig, SearchPathConfig, ServeConfig,
    TlsConfig,
};
pub use validation::{validate_config, ValidationError};
pub use watcher::DirectoryWatcher;
