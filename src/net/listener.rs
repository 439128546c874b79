//! Plain and TLS listeners.
//!
//! # Responsibilities
//! - Resolve configured bind addresses
//! - Load TLS material before anything starts accepting
//! - Run every listener on one shared shutdown handle

use std::net::SocketAddr;

use axum::Router;
use axum_server::tls_rustls::RustlsConfig;
use axum_server::Handle;
use thiserror::Error;
use tokio::task::JoinSet;

use crate::config::ServeConfig;
use crate::net::tls::load_tls_config;

/// Error type for listener operations.
#[derive(Debug, Error)]
pub enum ListenerError {
    #[error("invalid {field} address {value:?}: {source}")]
    Address {
        field: &'static str,
        value: String,
        source: std::net::AddrParseError,
    },
    #[error("failed to load TLS material: {0}")]
    Tls(std::io::Error),
    #[error("listener failed: {0}")]
    Serve(std::io::Error),
}

/// The set of listeners a configuration asks for.
pub struct ListenerSet {
    plain: Option<SocketAddr>,
    tls: Option<(SocketAddr, RustlsConfig)>,
}

impl ListenerSet {
    pub async fn from_config(config: &ServeConfig) -> Result<Self, ListenerError> {
        let plain = config
            .plain_listen()
            .map(|listen| parse_addr("listen", listen))
            .transpose()?;

        let tls = match &config.tls {
            Some(tls) => {
                let addr = parse_addr("tls.listen", &tls.listen)?;
                let rustls = load_tls_config(&tls.cert_path, &tls.key_path)
                    .await
                    .map_err(ListenerError::Tls)?;
                Some((addr, rustls))
            }
            None => None,
        };

        Ok(Self { plain, tls })
    }

    pub fn is_empty(&self) -> bool {
        self.plain.is_none() && self.tls.is_none()
    }

    /// Serve `app` on every listener; returns once all have stopped.
    pub async fn serve(self, app: Router, handle: Handle) -> Result<(), ListenerError> {
        let make_service = app.into_make_service_with_connect_info::<SocketAddr>();
        let mut servers = JoinSet::new();

        if let Some(addr) = self.plain {
            tracing::info!(address = %addr, "HTTP listener starting");
            let server = axum_server::bind(addr).handle(handle.clone());
            servers.spawn(server.serve(make_service.clone()));
        }

        if let Some((addr, rustls)) = self.tls {
            tracing::info!(address = %addr, "HTTPS listener starting");
            let server = axum_server::bind_rustls(addr, rustls).handle(handle.clone());
            servers.spawn(server.serve(make_service.clone()));
        }

        while let Some(joined) = servers.join_next().await {
            match joined {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    handle.shutdown();
                    return Err(ListenerError::Serve(e));
                }
                Err(e) => {
                    handle.shutdown();
                    return Err(ListenerError::Serve(std::io::Error::other(e)));
                }
            }
        }
        Ok(())
    }
}

fn parse_addr(field: &'static str, value: &str) -> Result<SocketAddr, ListenerError> {
    value.parse().map_err(|source| ListenerError::Address {
        field,
        value: value.to_string(),
        source,
    })
}
