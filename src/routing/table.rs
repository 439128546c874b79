//! Routing table construction and lookup.
//!
//! # Responsibilities
//! - Build one backing store list per configured route
//! - Resolve a request path to (backing stores, asset path)
//! - Return explicit no-match conditions
//!
//! # Design Decisions
//! - Immutable after construction (shared without locks)
//! - O(n) pattern scan; route counts are small
//! - A build shares one directory scan cache across all routes

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use super::matcher::{clean_request_path, RoutePattern};
use crate::archive::{ArchiveScanner, BackingStore, ScanError};

/// A configured route before its directories are scanned.
#[derive(Debug, Clone)]
pub struct RouteSpec {
    pub pattern: RoutePattern,
    pub directories: Vec<PathBuf>,
}

/// A route pattern paired with its ordered backing stores.
#[derive(Debug, Clone)]
pub struct CompiledRoute {
    pattern: RoutePattern,
    stores: Arc<[BackingStore]>,
}

impl CompiledRoute {
    pub fn new(pattern: RoutePattern, stores: impl Into<Arc<[BackingStore]>>) -> Self {
        Self {
            pattern,
            stores: stores.into(),
        }
    }

    pub fn pattern(&self) -> &RoutePattern {
        &self.pattern
    }

    pub fn stores(&self) -> &Arc<[BackingStore]> {
        &self.stores
    }
}

/// Why a request path did not resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("no route matches the request path")]
    NoRoute,
    #[error("request path has nothing after the route prefix")]
    EmptyAssetPath,
}

/// Result of a successful lookup, detached from the table it came from.
#[derive(Debug, Clone)]
pub struct Resolution {
    /// Index of the matched route in registration order.
    pub route: usize,
    pub stores: Arc<[BackingStore]>,
    pub asset_path: String,
    /// Generation of the table that produced this resolution.
    pub generation: u64,
}

/// The ordered set of compiled routes served at one point in time.
#[derive(Debug, Default)]
pub struct RoutingTable {
    routes: Vec<CompiledRoute>,
    generation: u64,
}

impl RoutingTable {
    pub fn new(routes: Vec<CompiledRoute>, generation: u64) -> Self {
        Self { routes, generation }
    }

    /// Scan every route's directories and compile a new table.
    ///
    /// Archives that fail to scan are logged and left out. A directory that
    /// cannot be listed fails the whole build.
    pub fn build(specs: &[RouteSpec], directory_rules: bool, generation: u64) -> Result<Self, ScanError> {
        let mut scanner = ArchiveScanner::new(directory_rules);
        let mut routes = Vec::with_capacity(specs.len());

        for spec in specs {
            let mut stores = Vec::new();
            for dir in &spec.directories {
                stores.extend(scanner.scan_directory(dir)?.iter().cloned());
            }
            if stores.is_empty() {
                tracing::warn!(route = %spec.pattern, "Route has no backing stores");
            }
            routes.push(CompiledRoute::new(spec.pattern.clone(), stores));
        }

        Ok(Self::new(routes, generation))
    }

    /// Find the route with the longest anchored match and strip its prefix.
    pub fn resolve(&self, path: &str) -> Result<Resolution, ResolveError> {
        let path = clean_request_path(path);

        let mut best: Option<(usize, usize)> = None;
        for (index, route) in self.routes.iter().enumerate() {
            if let Some(end) = route.pattern.match_end(&path) {
                if best.map_or(true, |(_, longest)| end > longest) {
                    best = Some((index, end));
                }
            }
        }

        let (index, end) = best.ok_or(ResolveError::NoRoute)?;
        let asset_path = &path[end..];
        if asset_path.is_empty() {
            return Err(ResolveError::EmptyAssetPath);
        }

        Ok(Resolution {
            route: index,
            stores: Arc::clone(&self.routes[index].stores),
            asset_path: asset_path.to_string(),
            generation: self.generation,
        })
    }

    pub fn routes(&self) -> &[CompiledRoute] {
        &self.routes
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Number of archive stores across all routes (shared ones counted once per route).
    pub fn archive_count(&self) -> usize {
        self.routes
            .iter()
            .flat_map(|route| route.stores.iter())
            .filter(|store| matches!(store, BackingStore::Archive(_)))
            .count()
    }

    /// Log every route's search path at info level.
    pub fn log_search_paths(&self) {
        for route in &self.routes {
            tracing::info!(route = %route.pattern, stores = route.stores.len(), "Search path");
            for store in route.stores.iter() {
                tracing::info!(route = %route.pattern, store = %store, "  search entry");
            }
        }
    }
}
