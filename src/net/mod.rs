//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! ServeConfig
//!     → listener.rs (plain and TLS bind addresses)
//!     → tls.rs (PEM certificate and key)
//!     → axum-server accept loops sharing one shutdown handle
//!     → Hand off to HTTP layer
//! ```

pub mod listener;
pub mod tls;

pub use listener::{ListenerError, ListenerSet};
pub use tls::load_tls_config;
