//! Asset download server for PAK/PKZ archives and plain directories.

pub mod archive;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod pak;
pub mod routing;
pub mod security;

pub use config::ServeConfig;
pub use http::{DeliveryEngine, HttpServer};
pub use lifecycle::{ReloadCoordinator, Shutdown};
