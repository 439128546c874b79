//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Compile every regex once to surface pattern errors at startup
//! - Validate listen addresses and TLS settings
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServeConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;
use std::net::SocketAddr;

use regex::Regex;

use crate::config::schema::ServeConfig;

const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    NoSearchPaths,
    NoDirectories { pattern: String },
    InvalidPattern { field: String, message: String },
    NoListener,
    InvalidAddress { field: &'static str, value: String },
    MissingTlsFile { field: &'static str },
    UnknownLogLevel(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::NoSearchPaths => write!(f, "no search_paths configured"),
            ValidationError::NoDirectories { pattern } => {
                write!(f, "search path {:?} has no directories", pattern)
            }
            ValidationError::InvalidPattern { field, message } => {
                write!(f, "invalid regex in {}: {}", field, message)
            }
            ValidationError::NoListener => {
                write!(f, "neither listen nor tls.listen is configured")
            }
            ValidationError::InvalidAddress { field, value } => {
                write!(f, "{} is not a socket address: {:?}", field, value)
            }
            ValidationError::MissingTlsFile { field } => write!(f, "{} is empty", field),
            ValidationError::UnknownLogLevel(level) => {
                write!(f, "unknown log level {:?}", level)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Check `config` and report every problem found.
pub fn validate_config(config: &ServeConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.search_paths.is_empty() {
        errors.push(ValidationError::NoSearchPaths);
    }
    for (i, sp) in config.search_paths.iter().enumerate() {
        check_pattern(&mut errors, format!("search_paths[{}].pattern", i), &sp.pattern);
        if sp.directories.is_empty() {
            errors.push(ValidationError::NoDirectories {
                pattern: sp.pattern.clone(),
            });
        }
    }

    if let Some(allow) = &config.access.archive_allow {
        for (i, p) in allow.iter().enumerate() {
            check_pattern(&mut errors, format!("access.archive_allow[{}]", i), p);
        }
    }
    for (i, p) in config.access.archive_deny.iter().enumerate() {
        check_pattern(&mut errors, format!("access.archive_deny[{}]", i), p);
    }
    for (i, p) in config.access.directory_allow.iter().enumerate() {
        check_pattern(&mut errors, format!("access.directory_allow[{}]", i), p);
    }
    check_pattern(&mut errors, "referer_check".to_string(), &config.referer_check);

    if let Some(listen) = config.plain_listen() {
        check_address(&mut errors, "listen", listen);
    }
    match &config.tls {
        Some(tls) => {
            check_address(&mut errors, "tls.listen", &tls.listen);
            if tls.cert_path.as_os_str().is_empty() {
                errors.push(ValidationError::MissingTlsFile {
                    field: "tls.cert_path",
                });
            }
            if tls.key_path.as_os_str().is_empty() {
                errors.push(ValidationError::MissingTlsFile {
                    field: "tls.key_path",
                });
            }
        }
        None if config.plain_listen().is_none() => errors.push(ValidationError::NoListener),
        None => {}
    }

    if config.metrics.enabled {
        check_address(&mut errors, "metrics.listen", &config.metrics.listen);
    }

    if !LOG_LEVELS.contains(&config.logging.level.to_ascii_lowercase().as_str()) {
        errors.push(ValidationError::UnknownLogLevel(config.logging.level.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_pattern(errors: &mut Vec<ValidationError>, field: String, pattern: &str) {
    if let Err(e) = Regex::new(pattern) {
        errors.push(ValidationError::InvalidPattern {
            field,
            message: e.to_string(),
        });
    }
}

fn check_address(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}
