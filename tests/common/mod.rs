//! Shared fixtures for integration tests.
#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::body::Body;
use axum::http::{HeaderMap, HeaderValue, Request, StatusCode};
use axum::Router;
use tower::ServiceExt;
use zip::write::SimpleFileOptions;
use zip::CompressionMethod;

use pakserve::config::{SearchPathConfig, ServeConfig};
use pakserve::http::{DeliveryEngine, HttpServer};
use pakserve::lifecycle::ReloadCoordinator;
use pakserve::pak::PakWriter;

/// Write a PAK file containing `entries` in order.
pub fn write_pak(path: &Path, entries: &[(&str, &[u8])]) {
    let mut writer = PakWriter::create(path).unwrap();
    for (name, data) in entries {
        writer.start_file(name).unwrap();
        writer.write_all(data).unwrap();
    }
    writer.close().unwrap();
}

/// One member of a test PKZ.
pub struct ZipMember<'a> {
    pub name: &'a str,
    pub data: &'a [u8],
    pub deflate: bool,
}

impl<'a> ZipMember<'a> {
    pub fn stored(name: &'a str, data: &'a [u8]) -> Self {
        Self { name, data, deflate: false }
    }

    pub fn deflated(name: &'a str, data: &'a [u8]) -> Self {
        Self { name, data, deflate: true }
    }
}

/// 2001-02-03 04:05:06 UTC
pub const ZIP_MTIME: u32 = 981_173_106;

/// Write a PKZ with every member stamped at [`ZIP_MTIME`].
pub fn write_pkz(path: &Path, members: &[ZipMember<'_>]) {
    let mut zip = zip::ZipWriter::new(File::create(path).unwrap());
    let stamp = zip::DateTime::from_date_and_time(2001, 2, 3, 4, 5, 6).unwrap();
    for member in members {
        let method = if member.deflate {
            CompressionMethod::Deflated
        } else {
            CompressionMethod::Stored
        };
        let options = SimpleFileOptions::default()
            .compression_method(method)
            .last_modified_time(stamp);
        zip.start_file(member.name, options).unwrap();
        zip.write_all(member.data).unwrap();
    }
    zip.finish().unwrap();
}

/// Raw (still compressed) bytes of a PKZ member, as stored on disk.
pub fn raw_member(path: &Path, name: &str) -> Vec<u8> {
    let mut archive = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
    let index = archive.index_for_name(name).unwrap();
    let member = archive.by_index_raw(index).unwrap();
    let start = member.data_start() as usize;
    let len = member.compressed_size() as usize;
    let bytes = std::fs::read(path).unwrap();
    bytes[start..start + len].to_vec()
}

/// A config with one route per `(pattern, directories)` pair.
pub fn config(routes: &[(&str, &[&Path])]) -> ServeConfig {
    ServeConfig {
        search_paths: routes
            .iter()
            .map(|(pattern, dirs)| SearchPathConfig {
                pattern: pattern.to_string(),
                directories: dirs.iter().map(|d| d.to_path_buf()).collect::<Vec<PathBuf>>(),
            })
            .collect(),
        ..ServeConfig::default()
    }
}

pub fn coordinator(config: &ServeConfig) -> Arc<ReloadCoordinator> {
    Arc::new(
        ReloadCoordinator::new(config.route_specs().unwrap(), config.directory_rules()).unwrap(),
    )
}

pub fn engine(config: &ServeConfig, coordinator: Arc<ReloadCoordinator>) -> Arc<DeliveryEngine> {
    Arc::new(DeliveryEngine::new(
        coordinator,
        config.access_policy().unwrap(),
        config.referer_check().unwrap(),
        HeaderValue::from_str(&config.content_type).unwrap(),
    ))
}

/// Full router for `config`, scanned once.
pub fn router(config: &ServeConfig) -> Router {
    HttpServer::new(engine(config, coordinator(config))).router()
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

pub async fn send(router: &Router, request: Request<Body>) -> TestResponse {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec();
    TestResponse { status, headers, body }
}

pub async fn get(router: &Router, uri: &str) -> TestResponse {
    send(router, Request::get(uri).body(Body::empty()).unwrap()).await
}

pub async fn get_with(router: &Router, uri: &str, headers: &[(&str, &str)]) -> TestResponse {
    let mut builder = Request::get(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    send(router, builder.body(Body::empty()).unwrap()).await
}

pub async fn head_with(router: &Router, uri: &str, headers: &[(&str, &str)]) -> TestResponse {
    let mut builder = Request::head(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    send(router, builder.body(Body::empty()).unwrap()).await
}
