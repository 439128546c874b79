//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the server.
//! All types derive Serde traits for deserialization from config files.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::routing::{RoutePattern, RouteSpec};
use crate::security::{AccessPolicy, ArchiveGate, DirectoryGate, PatternSet, RefererCheck};

/// Root configuration for the asset server.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServeConfig {
    /// Plain HTTP bind address. Empty disables the plain listener.
    pub listen: String,

    /// Optional TLS listener.
    pub tls: Option<TlsConfig>,

    /// Content-Type sent with every asset.
    pub content_type: String,

    /// Regex the Referer header must match. Empty matches everything.
    pub referer_check: String,

    /// Access gates.
    pub access: AccessConfig,

    /// Route pattern → ordered search directories.
    pub search_paths: Vec<SearchPathConfig>,

    pub logging: LoggingConfig,

    pub metrics: MetricsConfig,

    pub reload: ReloadConfig,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            listen: "0.0.0.0:8080".to_string(),
            tls: None,
            content_type: crate::http::DEFAULT_CONTENT_TYPE.to_string(),
            referer_check: String::new(),
            access: AccessConfig::default(),
            search_paths: Vec::new(),
            logging: LoggingConfig::default(),
            metrics: MetricsConfig::default(),
            reload: ReloadConfig::default(),
        }
    }
}

impl ServeConfig {
    /// Compile `search_paths` into route specs, in configuration order.
    pub fn route_specs(&self) -> Result<Vec<RouteSpec>, regex::Error> {
        self.search_paths
            .iter()
            .map(|sp| {
                Ok(RouteSpec {
                    pattern: RoutePattern::new(&sp.pattern)?,
                    directories: sp.directories.clone(),
                })
            })
            .collect()
    }

    /// Compile both access gates.
    pub fn access_policy(&self) -> Result<AccessPolicy, regex::Error> {
        let allow = match &self.access.archive_allow {
            Some(patterns) => Some(PatternSet::new(patterns)?),
            None => None,
        };
        let deny = PatternSet::new(&self.access.archive_deny)?;
        let directory = PatternSet::new(&self.access.directory_allow)?;
        Ok(AccessPolicy::new(
            ArchiveGate::new(allow, deny),
            DirectoryGate::new(directory),
        ))
    }

    pub fn referer_check(&self) -> Result<RefererCheck, regex::Error> {
        RefererCheck::new(&self.referer_check)
    }

    /// Raw directories are only served when at least one directory rule exists.
    pub fn directory_rules(&self) -> bool {
        !self.access.directory_allow.is_empty()
    }

    pub fn plain_listen(&self) -> Option<&str> {
        let listen = self.listen.trim();
        (!listen.is_empty()).then_some(listen)
    }
}

/// TLS configuration for the secondary listener.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TlsConfig {
    /// Bind address (e.g., "0.0.0.0:8443").
    pub listen: String,

    /// Path to certificate file (PEM).
    pub cert_path: PathBuf,

    /// Path to private key file (PEM).
    pub key_path: PathBuf,
}

/// Archive and directory access rules.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AccessConfig {
    /// When set, only archive assets matching one of these are served.
    pub archive_allow: Option<Vec<String>>,

    /// Archive assets matching any of these are never served.
    pub archive_deny: Vec<String>,

    /// Assets matching any of these may be read from raw directories.
    pub directory_allow: Vec<String>,
}

/// One route: a pattern and the directories searched for it.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchPathConfig {
    pub pattern: String,
    pub directories: Vec<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    pub level: String,

    /// Prefix log lines with a timestamp.
    pub timestamps: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            timestamps: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Enable the Prometheus endpoint.
    pub enabled: bool,

    /// Metrics endpoint bind address.
    pub listen: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            listen: "127.0.0.1:9090".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ReloadConfig {
    /// Rescan when files change under a search directory.
    pub watch_directories: bool,

    /// Quiet period before a burst of triggers becomes one rebuild.
    pub debounce_ms: u64,
}

impl Default for ReloadConfig {
    fn default() -> Self {
        Self {
            watch_directories: false,
            debounce_ms: 500,
        }
    }
}
