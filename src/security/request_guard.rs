//! Request-level checks that answer 403.

use axum::http::{header, HeaderMap};
use regex::Regex;

/// True if the request path contains the platform path separator on a
/// platform where it is not `/`, which could smuggle a path past the resolver.
pub fn has_foreign_separator(path: &str) -> bool {
    std::path::MAIN_SEPARATOR != '/' && path.contains(std::path::MAIN_SEPARATOR)
}

/// Referer header pattern. A missing header is matched as the empty string.
/// The default check has no pattern and permits everything.
#[derive(Debug, Clone, Default)]
pub struct RefererCheck {
    pattern: Option<Regex>,
}

impl RefererCheck {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Some(Regex::new(pattern)?),
        })
    }

    pub fn permits(&self, headers: &HeaderMap) -> bool {
        let Some(pattern) = &self.pattern else {
            return true;
        };
        let referer = headers
            .get(header::REFERER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        pattern.is_match(referer)
    }
}
