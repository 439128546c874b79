//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with the catch-all asset handler
//! - Wire up middleware (tracing, request ID, access log)
//! - Hand the router to the configured listeners

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{rejection::PathRejection, Path, State},
    http::Request,
    middleware,
    response::Response,
    routing::any,
    Router,
};
use tower_http::trace::TraceLayer;

use crate::http::delivery::{self, DeliveryEngine};
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::lifecycle::Shutdown;
use crate::net::{ListenerError, ListenerSet};
use crate::observability::access_log::access_log;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<DeliveryEngine>,
}

/// HTTP front end of the asset server.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(engine: Arc<DeliveryEngine>) -> Self {
        Self {
            router: Self::build_router(AppState { engine }),
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/", any(root_handler))
            .route("/{*path}", any(asset_handler))
            .with_state(state)
            .layer(middleware::from_fn(access_log))
            .layer(propagate_request_id_layer())
            .layer(set_request_id_layer())
            .layer(TraceLayer::new_for_http())
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve on every configured listener until shutdown drains them.
    pub async fn run(self, listeners: ListenerSet, shutdown: &Shutdown) -> Result<(), ListenerError> {
        listeners.serve(self.router, shutdown.handle()).await?;
        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn root_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let (parts, _body) = request.into_parts();
    state.engine.resolve("/", &parts).await
}

/// Catch-all handler; `path` arrives percent-decoded.
async fn asset_handler(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    request: Request<Body>,
) -> Response {
    // a path that does not decode to UTF-8 cannot name any asset
    let Path(path) = match path {
        Ok(path) => path,
        Err(rejection) => {
            tracing::debug!(uri = %request.uri(), reason = %rejection, "Undecodable request path");
            return delivery::not_found();
        }
    };
    let (parts, _body) = request.into_parts();
    let path = if path.starts_with('/') {
        path
    } else {
        format!("/{path}")
    };
    state.engine.resolve(&path, &parts).await
}
