//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID)
//!     → delivery.rs (guards, routing table lookup, access gates, store walk)
//!     → encoding.rs + strategy.rs (pick the body transform)
//!     → body.rs (stream archive bytes)
//!     → Send to client
//! ```

pub mod body;
pub mod delivery;
pub mod encoding;
pub mod request;
pub mod server;
pub mod strategy;

pub use delivery::{DeliveryEngine, DEFAULT_CONTENT_TYPE};
pub use encoding::AcceptEncoding;
pub use request::{MakeRequestUuid, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
pub use strategy::ResponseStrategy;
