//! Route pattern matching.
//!
//! # Responsibilities
//! - Normalize request paths (clean redundant segments, lowercase)
//! - Match route patterns anchored at the start of the path
//!
//! # Design Decisions
//! - Patterns are regular expressions; only matches starting at offset 0 count
//! - A match that consumes nothing is ignored

use regex::Regex;

use crate::pak::format::clean_segments;

/// Clean a request path the way the resolver sees it: rooted, no `.`/`..`
/// or duplicate slashes, no trailing slash, lowercased.
pub fn clean_request_path(path: &str) -> String {
    let mut cleaned = String::with_capacity(path.len() + 1);
    for segment in clean_segments(path) {
        cleaned.push('/');
        cleaned.push_str(segment);
    }
    if cleaned.is_empty() {
        cleaned.push('/');
    }
    cleaned.to_lowercase()
}

/// A compiled route pattern.
#[derive(Debug, Clone)]
pub struct RoutePattern {
    regex: Regex,
}

impl RoutePattern {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            regex: Regex::new(pattern)?,
        })
    }

    /// End offset of the leftmost match if it starts at the beginning of
    /// `path` and consumes at least one byte.
    pub fn match_end(&self, path: &str) -> Option<usize> {
        self.regex
            .find(path)
            .filter(|m| m.start() == 0 && m.end() > 0)
            .map(|m| m.end())
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

impl std::fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
