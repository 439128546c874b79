//! Request resolution and content delivery.
//!
//! # Responsibilities
//! - Reject tampered paths and foreign referers (403)
//! - Resolve the asset path against the published routing table
//! - Walk the route's backing stores in order and serve the first hit
//! - Negotiate content encoding for deflated archive entries
//!
//! # Design Decisions
//! - The table snapshot is only held for the lookup, never during file I/O
//! - Every archive hit opens its own file handle
//! - A store that cannot be read is skipped, never turned into an error status
//! - HEAD computes the same headers without opening the archive
//! - Methods other than HEAD get GET semantics

use std::path::Path;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, request::Parts, HeaderValue, Method, Request, Response, StatusCode};
use tower::ServiceExt;
use tower_http::services::ServeFile;

use super::body::{entry_reader, stream_body};
use super::encoding::AcceptEncoding;
use super::strategy::ResponseStrategy;
use crate::archive::{Archive, ArchiveEntry, BackingStore};
use crate::lifecycle::ReloadCoordinator;
use crate::observability::metrics;
use crate::security::{has_foreign_separator, AccessPolicy, RefererCheck};

/// Content type used when none is configured.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Resolves requests to asset bytes.
#[derive(Debug)]
pub struct DeliveryEngine {
    routes: Arc<ReloadCoordinator>,
    policy: AccessPolicy,
    referer: RefererCheck,
    content_type: HeaderValue,
}

impl DeliveryEngine {
    pub fn new(
        routes: Arc<ReloadCoordinator>,
        policy: AccessPolicy,
        referer: RefererCheck,
        content_type: HeaderValue,
    ) -> Self {
        Self {
            routes,
            policy,
            referer,
            content_type,
        }
    }

    /// Answer one request for `path` (already percent-decoded).
    /// Any method other than HEAD is answered like GET.
    pub async fn resolve(&self, path: &str, parts: &Parts) -> Response<Body> {
        if has_foreign_separator(path) || !self.referer.permits(&parts.headers) {
            tracing::debug!(path = %path, "Request forbidden");
            return finish(status_response(StatusCode::FORBIDDEN), "none");
        }

        // the snapshot guard is dropped before any store is touched
        let resolution = match self.routes.resolve(path) {
            Ok(resolution) => resolution,
            Err(e) => {
                tracing::debug!(path = %path, reason = %e, "No asset path");
                return not_found();
            }
        };
        let asset = resolution.asset_path.as_str();

        let decision = self.policy.evaluate(asset);
        if decision.is_rejected() {
            tracing::debug!(asset = %asset, "Asset rejected by access rules");
            return not_found();
        }

        let accepts = AcceptEncoding::from_headers(&parts.headers);
        let head = parts.method == Method::HEAD;

        for store in resolution.stores.iter() {
            match store {
                BackingStore::Directory(root) => {
                    if !decision.directory {
                        continue;
                    }
                    if let Some(response) = self.serve_directory(root, asset, parts).await {
                        return finish(response, "file");
                    }
                }
                BackingStore::Archive(archive) => {
                    if !decision.archive {
                        continue;
                    }
                    let Some(entry) = archive.get(asset) else {
                        continue;
                    };
                    match self.serve_entry(archive, *entry, accepts, head).await {
                        Ok((response, strategy)) => return finish(response, strategy.as_str()),
                        Err(e) => {
                            tracing::warn!(
                                archive = %archive.path().display(),
                                asset = %asset,
                                error = %e,
                                "Failed to open archive, trying next store"
                            );
                        }
                    }
                }
            }
        }

        not_found()
    }

    async fn serve_entry(
        &self,
        archive: &Arc<Archive>,
        entry: ArchiveEntry,
        accepts: AcceptEncoding,
        head: bool,
    ) -> std::io::Result<(Response<Body>, ResponseStrategy)> {
        let strategy = ResponseStrategy::choose(entry.compression, accepts);

        let body = if head {
            Body::empty()
        } else {
            let archive = Arc::clone(archive);
            let section = tokio::task::spawn_blocking(move || archive.open_entry(&entry))
                .await
                .map_err(std::io::Error::other)??;
            stream_body(entry_reader(strategy, &entry, section))
        };

        let mut response = Response::new(body);
        let headers = response.headers_mut();
        headers.insert(header::CONTENT_TYPE, self.content_type.clone());
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from(strategy.content_length(&entry)));
        if let Some(encoding) = strategy.content_encoding() {
            headers.insert(header::CONTENT_ENCODING, HeaderValue::from_static(encoding));
        }
        Ok((response, strategy))
    }

    /// Serve `root/asset` from disk. `None` means "try the next store".
    async fn serve_directory(&self, root: &Path, asset: &str, parts: &Parts) -> Option<Response<Body>> {
        // a leading slash would make join() discard the root
        let path = root.join(asset.trim_start_matches('/'));
        let metadata = tokio::fs::metadata(&path).await.ok()?;
        if !metadata.is_file() {
            return None;
        }
        // permission problems surface here rather than as a 500 from ServeFile
        tokio::fs::File::open(&path).await.ok()?;

        let mut request = Request::new(Body::empty());
        *request.method_mut() = if parts.method == Method::HEAD {
            Method::HEAD
        } else {
            Method::GET
        };
        *request.uri_mut() = parts.uri.clone();
        *request.headers_mut() = parts.headers.clone();

        let response = match ServeFile::new(&path).oneshot(request).await {
            Ok(response) => response,
            Err(never) => match never {},
        };
        if response.status() == StatusCode::NOT_FOUND {
            return None;
        }

        let mut response = response.map(Body::new);
        response
            .headers_mut()
            .insert(header::CONTENT_TYPE, self.content_type.clone());
        Some(response)
    }
}

fn status_response(status: StatusCode) -> Response<Body> {
    let text = format!(
        "{} {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or_default()
    );
    let mut response = Response::new(Body::from(text));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8"));
    response
}

/// Not-found answer for paths that cannot name an asset at all.
pub fn not_found() -> Response<Body> {
    finish(status_response(StatusCode::NOT_FOUND), "none")
}

fn finish(response: Response<Body>, source: &'static str) -> Response<Body> {
    metrics::record_request(response.status().as_u16(), source);
    response
}
