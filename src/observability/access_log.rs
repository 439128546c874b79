//! Per-request access log.

use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{header, HeaderMap, HeaderName, Request},
    middleware::Next,
    response::Response,
};

fn header_str<'a>(headers: &'a HeaderMap, name: &HeaderName, default: &'a str) -> &'a str {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or(default)
}

/// Emit one debug line per request once the response headers are known.
pub async fn access_log(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let remote = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_else(|| "-".to_string());
    let host = header_str(request.headers(), &header::HOST, "-").to_string();
    let referer = header_str(request.headers(), &header::REFERER, "-").to_string();
    let user_agent = header_str(request.headers(), &header::USER_AGENT, "-").to_string();
    let method = request.method().clone();
    let uri = request.uri().clone();
    let version = request.version();

    let response = next.run(request).await;

    let headers = response.headers();
    tracing::debug!(
        remote = %remote,
        host = %host,
        method = %method,
        uri = %uri,
        version = ?version,
        status = response.status().as_u16(),
        content_length = header_str(headers, &header::CONTENT_LENGTH, "0"),
        content_encoding = header_str(headers, &header::CONTENT_ENCODING, "-"),
        referer = %referer,
        user_agent = %user_agent,
        elapsed_us = start.elapsed().as_micros() as u64,
        "access"
    );

    response
}
